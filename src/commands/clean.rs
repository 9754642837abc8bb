use anyhow::Result;
use fixture_sync_core::RunSummary;
use fixture_sync_core::config::AppConfig;
use fixture_sync_core::diff::purge_plan;
use fixture_sync_core::reconcile::{Cancellation, Reconciler};
use fixture_sync_core::remote::Remote;
use owo_colors::OwoColorize;

use super::{calendar_header, cancel_on_ctrl_c};
use crate::render::Render;
use crate::utils::tui::create_spinner;

/// Remove every entry fixture-sync created. Returns `None` for a dry run.
pub async fn run(config: &AppConfig, dry_run: bool) -> Result<Option<RunSummary>> {
    let store = Remote::from_config(&config.store);
    let container_id = &config.store.container_id;

    let spinner = create_spinner(format!("Listing {container_id}"));
    let listed = Reconciler::new(&store, container_id, &config.sync, Cancellation::new())
        .load_entries()
        .await;
    spinner.finish_and_clear();
    let (entries, malformed) = listed?;

    let plan = purge_plan(&entries, &config.sync);

    println!("{}", calendar_header(config));
    if plan.is_empty() {
        println!("   {}", "Nothing to clean".dimmed());
        return Ok(if dry_run { None } else { Some(RunSummary::default()) });
    }
    println!("{}", plan.render());

    if dry_run {
        println!("\n{}", "Dry run, nothing was deleted.".dimmed());
        return Ok(None);
    }

    let reconciler = Reconciler::new(&store, container_id, &config.sync, cancel_on_ctrl_c());
    let mut summary = reconciler.execute(&plan).await;
    summary.malformed += malformed;

    println!();
    println!("{}", summary.render());

    Ok(Some(summary))
}
