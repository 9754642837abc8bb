//! Collaborators the reconciler consumes.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::entry::{EntryBody, RawEntry};
use crate::error::SyncResult;
use crate::fixture::FeedFormat;

/// Which fixtures to ask the feed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureFilter {
    Team(String),
    Competition(String),
}

impl fmt::Display for FixtureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureFilter::Team(id) => write!(f, "team {id}"),
            FixtureFilter::Competition(id) => write!(f, "competition {id}"),
        }
    }
}

/// Source of raw fixture payloads.
#[async_trait]
pub trait FixtureFeed: Send + Sync {
    /// Shape of the payloads returned by [`FixtureFeed::fetch_fixtures`].
    fn format(&self) -> FeedFormat;

    /// Fetch every fixture matching `filter` in `season`.
    ///
    /// Fails with `SyncError::FeedUnavailable`; retrying is the feed's business.
    async fn fetch_fixtures(&self, filter: &FixtureFilter, season: i32) -> SyncResult<Vec<Value>>;
}

/// A store of entries addressed by store-assigned ids.
///
/// Write calls fail with `SyncError::StoreTransient` when a retry may help
/// and `SyncError::StoreFatal` when it cannot.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Every entry in the container. Pagination is the store's concern.
    async fn list_entries(&self, container_id: &str) -> SyncResult<Vec<RawEntry>>;

    /// Returns the id the store assigned.
    async fn create_entry(&self, container_id: &str, body: &EntryBody) -> SyncResult<String>;

    async fn update_entry(
        &self,
        container_id: &str,
        entry_id: &str,
        body: &EntryBody,
    ) -> SyncResult<()>;

    async fn delete_entry(&self, container_id: &str, entry_id: &str) -> SyncResult<()>;
}
