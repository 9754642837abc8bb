pub mod clean;
pub mod status;
pub mod sync;

use anyhow::Result;
use chrono::Utc;
use fixture_sync_core::config::AppConfig;
use fixture_sync_core::reconcile::{self, Cancellation, Snapshot};
use fixture_sync_core::remote::Remote;
use owo_colors::OwoColorize;
use tracing::warn;

use crate::feed;
use crate::utils::tui::create_spinner;

/// Read the feed and the calendar, showing a spinner meanwhile.
async fn load_snapshot(config: &AppConfig, season: Option<i32>) -> Result<Snapshot> {
    let filter = config.feed.filter()?;
    let season = season.unwrap_or_else(|| config.feed.season(Utc::now().date_naive()));
    let feed = feed::from_config(&config.feed)?;
    let store = Remote::from_config(&config.store);

    let spinner = create_spinner(format!(
        "Fetching {} fixtures for {} season {}",
        config.feed.format.name(),
        filter,
        season
    ));
    let snapshot = reconcile::snapshot(
        feed.as_ref(),
        &store,
        &filter,
        season,
        &config.store.container_id,
        &config.sync,
    )
    .await;
    spinner.finish_and_clear();

    Ok(snapshot?)
}

fn calendar_header(config: &AppConfig) -> String {
    let account = config
        .store
        .account()
        .map(|a| format!(" ({a})"))
        .unwrap_or_default();
    format!("📅 {}{}", config.store.container_id, account.dimmed())
}

/// Cancel the run on Ctrl-C. The operation in flight is allowed to finish.
fn cancel_on_ctrl_c() -> Cancellation {
    let cancellation = Cancellation::new();
    let handle = cancellation.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current operation");
            handle.cancel();
        }
    });

    cancellation
}
