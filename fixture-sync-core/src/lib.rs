//! Core of fixture-sync: keeps a calendar-like store mirroring a fixture feed.
//!
//! - `fixture` normalizes feed payloads into [`SourceRecord`]s
//! - `matcher` and `diff` decide which store writes are needed
//! - `reconcile` applies them with bounded retry
//! - `remote` talks to store provider binaries over the JSON protocol

pub mod config;
pub mod diff;
pub mod entry;
pub mod error;
pub mod fixture;
pub mod matcher;
pub mod reconcile;
pub mod remote;
pub mod store;

pub use entry::{EmbeddedKey, EntryBody, RawEntry, TargetEntry};
pub use error::{SyncError, SyncResult};
pub use fixture::{FeedFormat, FixtureStatus, SourceRecord};
pub use reconcile::{Cancellation, RunSummary, plan, purge, reconcile, sync_from_feed};
pub use store::{FixtureFeed, FixtureFilter, KeyedStore};
