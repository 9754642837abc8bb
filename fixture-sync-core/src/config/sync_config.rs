//! Reconciliation settings.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

const DEFAULT_FIXTURE_HOURS: u64 = 2;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MARKER: &str = "7";
const DEFAULT_TIME_ZONE: &str = "Europe/London";

/// How the wait between retries grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Constant,
    /// Doubles the delay after every failed attempt.
    Exponential,
}

/// Knobs for a single reconciliation run.
///
/// Durations are written as humantime strings in config files (`"2h"`, `"3s"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Length of the calendar window created for each fixture.
    #[serde(with = "duration_str")]
    pub fixed_duration: Duration,

    /// Total attempts per store operation, including the first.
    pub max_retries: u32,

    #[serde(with = "duration_str")]
    pub retry_delay: Duration,

    pub retry_backoff: Backoff,

    /// Delete unkeyed entries that carry `marker` but match no fixture.
    pub enable_duplicate_cleanup: bool,

    /// Tag written on every entry (Google `colorId`).
    pub marker: Option<String>,

    pub time_zone: Option<String>,

    /// Upper bound for a single store call.
    #[serde(with = "duration_str")]
    pub operation_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            fixed_duration: Duration::from_secs(DEFAULT_FIXTURE_HOURS * 3600),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_backoff: Backoff::Constant,
            enable_duplicate_cleanup: false,
            marker: Some(DEFAULT_MARKER.to_string()),
            time_zone: Some(DEFAULT_TIME_ZONE.to_string()),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_retries == 0 {
            return Err(SyncError::Config(
                "sync.max_retries must be at least 1".into(),
            ));
        }
        if self.fixed_duration.is_zero() || TimeDelta::from_std(self.fixed_duration).is_err() {
            return Err(SyncError::Config(format!(
                "sync.fixed_duration out of range: {}",
                humantime::format_duration(self.fixed_duration)
            )));
        }
        if self.operation_timeout.is_zero() {
            return Err(SyncError::Config(
                "sync.operation_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The fixture window as a chrono delta.
    pub fn fixture_span(&self) -> TimeDelta {
        TimeDelta::from_std(self.fixed_duration)
            .unwrap_or_else(|_| TimeDelta::hours(DEFAULT_FIXTURE_HOURS as i64))
    }
}

/// (De)serialize a `Duration` as a humantime string.
pub(crate) mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.fixed_duration, Duration::from_secs(7200));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(3));
        assert!(!config.enable_duplicate_cleanup);
        assert_eq!(config.fixture_span(), TimeDelta::hours(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_humantime_fields() {
        let config: SyncConfig = toml::from_str(
            r#"
fixed_duration = "1h 45m"
retry_delay = "500ms"
retry_backoff = "exponential"
enable_duplicate_cleanup = true
"#,
        )
        .expect("Should parse");

        assert_eq!(config.fixed_duration, Duration::from_secs(105 * 60));
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.retry_backoff, Backoff::Exponential);
        assert!(config.enable_duplicate_cleanup);
        assert_eq!(config.max_retries, 3, "unset fields keep defaults");
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let config = SyncConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }
}
