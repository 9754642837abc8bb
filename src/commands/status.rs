use anyhow::Result;
use fixture_sync_core::config::AppConfig;
use owo_colors::OwoColorize;

use super::{calendar_header, load_snapshot};
use crate::render::Render;

pub async fn run(config: &AppConfig, season: Option<i32>) -> Result<()> {
    let snapshot = load_snapshot(config, season).await?;
    let plan = snapshot.plan(&config.sync);

    println!("{}", calendar_header(config));
    println!("{}", plan.render());

    let keyed = snapshot
        .entries
        .iter()
        .filter(|e| e.external_key.is_some())
        .count();
    let mut details = format!(
        "{} fixtures, {} entries ({} managed), {} unchanged",
        snapshot.records.len(),
        snapshot.entries.len(),
        keyed,
        plan.unchanged
    );
    if snapshot.malformed > 0 {
        details.push_str(&format!(", {} malformed", snapshot.malformed));
    }
    println!("\n{}", details.dimmed());

    Ok(())
}
