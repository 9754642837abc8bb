//! Configuration types for fixture-sync.

mod app_config;
mod sync_config;

pub use app_config::{AppConfig, FeedConfig, StoreConfig, current_season};
pub use sync_config::{Backoff, SyncConfig};
