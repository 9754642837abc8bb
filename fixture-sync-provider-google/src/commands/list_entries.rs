use anyhow::{Context, Result};
use fixture_sync_core::RawEntry;
use fixture_sync_core::remote::protocol::ListEntries;
use google_calendar::types::OrderBy;

use super::authed_client;
use crate::convert::from_google;

pub async fn handle(params: serde_json::Value) -> Result<Vec<RawEntry>> {
    let cmd: ListEntries = serde_json::from_value(params).context("Invalid params")?;
    let client = authed_client(&cmd.remote_config).await?;

    // Every event in the calendar: legacy entries can sit anywhere in time.
    let response = client
        .events()
        .list_all(
            &cmd.container_id,
            "",
            0,
            OrderBy::default(),
            &[],
            "",
            &[],
            false,
            false,
            false,
            "",
            "",
            "",
            "",
        )
        .await
        .with_context(|| format!("Failed to list events in {}", cmd.container_id))?;

    Ok(response.body.into_iter().filter_map(from_google).collect())
}
