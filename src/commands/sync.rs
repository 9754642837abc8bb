use anyhow::Result;
use fixture_sync_core::RunSummary;
use fixture_sync_core::config::AppConfig;
use fixture_sync_core::reconcile::Reconciler;
use fixture_sync_core::remote::Remote;
use owo_colors::OwoColorize;

use super::{calendar_header, cancel_on_ctrl_c, load_snapshot};
use crate::render::Render;

/// Returns `None` for a dry run.
pub async fn run(config: &AppConfig, season: Option<i32>, dry_run: bool) -> Result<Option<RunSummary>> {
    let snapshot = load_snapshot(config, season).await?;
    let plan = snapshot.plan(&config.sync);

    println!("{}", calendar_header(config));
    println!("{}", plan.render());

    if dry_run {
        if !plan.is_empty() {
            println!("\n{}", "Dry run, nothing was written.".dimmed());
        }
        return Ok(None);
    }

    if plan.is_empty() {
        return Ok(Some(RunSummary {
            unchanged: plan.unchanged,
            malformed: snapshot.malformed,
            ..Default::default()
        }));
    }

    let store = Remote::from_config(&config.store);
    let reconciler = Reconciler::new(
        &store,
        &config.store.container_id,
        &config.sync,
        cancel_on_ctrl_c(),
    );

    let mut summary = reconciler.execute(&plan).await;
    summary.malformed += snapshot.malformed;

    println!();
    println!("{}", summary.render());

    Ok(Some(summary))
}
