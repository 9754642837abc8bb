//! Error types for fixture-sync.

use thiserror::Error;

/// Errors that can occur while syncing fixtures into a store.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Fixture feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Store error (retryable): {0}")]
    StoreTransient(String),

    #[error("Store error: {0}")]
    StoreFatal(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::StoreTransient(_) | SyncError::ProviderTimeout(_)
        )
    }
}

/// Result type alias for fixture-sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
