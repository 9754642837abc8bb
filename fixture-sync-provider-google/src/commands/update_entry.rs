use anyhow::{Context, Result};
use fixture_sync_core::remote::protocol::UpdateEntry;
use google_calendar::types::SendUpdates;

use super::authed_client;
use crate::convert::to_google;

pub async fn handle(params: serde_json::Value) -> Result<()> {
    let cmd: UpdateEntry = serde_json::from_value(params).context("Invalid params")?;
    let client = authed_client(&cmd.remote_config).await?;

    let mut google_event = to_google(&cmd.body);
    google_event.id = cmd.entry_id.clone();

    client
        .events()
        .update(
            &cmd.container_id,
            &cmd.entry_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to update event: {}", cmd.entry_id))?;

    Ok(())
}
