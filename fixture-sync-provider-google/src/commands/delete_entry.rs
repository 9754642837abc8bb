use anyhow::{Context, Result};
use fixture_sync_core::remote::protocol::DeleteEntry;
use google_calendar::types::SendUpdates;

use super::{authed_client, http_status};

pub async fn handle(params: serde_json::Value) -> Result<()> {
    let cmd: DeleteEntry = serde_json::from_value(params).context("Invalid params")?;
    let client = authed_client(&cmd.remote_config).await?;

    let result = client
        .events()
        .delete(&cmd.container_id, &cmd.entry_id, false, SendUpdates::None)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if already_gone(&e.to_string()) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to delete event: {}", cmd.entry_id)),
    }
}

/// Google answers 410 for events deleted earlier and 404 for unknown ids.
fn already_gone(error: &str) -> bool {
    matches!(http_status(error), Some(404 | 410))
}
