use anyhow::{Context, Result};
use fixture_sync_core::remote::protocol::CreateEntry;
use google_calendar::types::SendUpdates;

use super::authed_client;
use crate::convert::to_google;

/// Returns the id Google assigned to the new event.
pub async fn handle(params: serde_json::Value) -> Result<String> {
    let cmd: CreateEntry = serde_json::from_value(params).context("Invalid params")?;
    let client = authed_client(&cmd.remote_config).await?;

    let google_event = to_google(&cmd.body);

    let response = client
        .events()
        .insert(
            &cmd.container_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to create event: {}", google_event.summary))?;

    if response.body.id.is_empty() {
        anyhow::bail!("Google returned no id for {}", google_event.summary);
    }

    Ok(response.body.id)
}
