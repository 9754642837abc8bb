//! Application configuration at ~/.config/fixture-sync/config.toml
//!
//! Every value can be overridden from the environment with the
//! `FIXTURE_SYNC_` prefix and `__` between sections, for example
//! `FIXTURE_SYNC_FEED__API_KEY`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::config::sync_config::{SyncConfig, duration_str};
use crate::error::{SyncError, SyncResult};
use crate::fixture::FeedFormat;
use crate::store::FixtureFilter;

const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_PROVIDER: &str = "google";
const DEFAULT_CONTAINER_ID: &str = "primary";
/// European seasons start in August.
const SEASON_START_MONTH: u32 = 8;

fn default_feed_timeout() -> Duration {
    DEFAULT_FEED_TIMEOUT
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_container_id() -> String {
    DEFAULT_CONTAINER_ID.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Where fixtures come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub format: FeedFormat,

    /// Overrides the format's public API root.
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: String,

    /// RapidAPI host header, for feeds served through RapidAPI.
    pub api_host: Option<String>,

    /// Team id in the feed's own numbering (65 is Manchester City on football-data.org).
    #[serde(default)]
    pub team: String,

    /// Competition code or league id, used when no team is set.
    pub competition: Option<String>,

    /// Season start year. Defaults to the season in progress.
    pub season: Option<i32>,

    #[serde(default = "default_feed_timeout", with = "duration_str")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            format: FeedFormat::default(),
            base_url: None,
            api_key: String::new(),
            api_host: None,
            team: String::new(),
            competition: None,
            season: None,
            timeout: DEFAULT_FEED_TIMEOUT,
        }
    }
}

impl FeedConfig {
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.format.default_base_url())
    }

    pub fn season(&self, today: NaiveDate) -> i32 {
        self.season.unwrap_or_else(|| current_season(today))
    }

    pub fn filter(&self) -> SyncResult<FixtureFilter> {
        let team = self.team.trim();
        if !team.is_empty() {
            return Ok(FixtureFilter::Team(team.to_string()));
        }
        match self.competition.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Ok(FixtureFilter::Competition(code.to_string())),
            _ => Err(SyncError::Config(
                "feed.team or feed.competition must be set".into(),
            )),
        }
    }
}

/// Which store provider to write to, plus provider-specific params
/// (e.g. `google_account`) that are forwarded to it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_container_id")]
    pub container_id: String,

    #[serde(flatten)]
    pub params: HashMap<String, toml::Value>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            provider: default_provider(),
            container_id: default_container_id(),
            params: HashMap::new(),
        }
    }
}

impl StoreConfig {
    /// The `{provider}_account` param, if the provider has an account concept.
    pub fn account(&self) -> Option<&str> {
        let key = format!("{}_account", self.provider);
        self.params.get(&key).and_then(|v| v.as_str())
    }
}

/// The season in progress on `today`: this year from August, otherwise last year.
pub fn current_season(today: NaiveDate) -> i32 {
    if today.month() >= SEASON_START_MONTH {
        today.year()
    } else {
        today.year() - 1
    }
}

impl AppConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("fixture-sync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path` (or the default location) with environment overrides.
    ///
    /// A commented default file is created when the default location has none.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()),
            None => {
                let p = Self::config_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                }
                p
            }
        };

        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("FIXTURE_SYNC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Reject configurations a run cannot start with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.feed.api_key.trim().is_empty() {
            return Err(SyncError::Config(
                "feed.api_key is not set (or export FIXTURE_SYNC_FEED__API_KEY)".into(),
            ));
        }
        self.feed.filter()?;
        if self.feed.base_url().is_none() {
            return Err(SyncError::Config(format!(
                "feed.base_url is required for the '{}' format",
                self.feed.format.name()
            )));
        }
        self.validate_store()
    }

    /// The subset of [`AppConfig::validate`] needed for store-only commands.
    pub fn validate_store(&self) -> SyncResult<()> {
        if self.store.container_id.trim().is_empty() {
            return Err(SyncError::Config("store.container_id is empty".into()));
        }
        if self.store.provider == DEFAULT_PROVIDER && self.store.account().is_none() {
            return Err(SyncError::Config(
                "store.google_account is not set".into(),
            ));
        }
        self.sync.validate()
    }

    /// Create a default config file with the optional settings commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = "\
# fixture-sync configuration

[feed]
# format = \"football-data\"   # \"api-football\" or \"canonical\"
# base_url = \"https://...\"  # required for \"canonical\"
# api_key = \"...\"            # or export FIXTURE_SYNC_FEED__API_KEY
# team = \"65\"
# competition = \"PL\"       # used when no team is set
# season = 2025              # defaults to the season in progress

[store]
# provider = \"google\"
# container_id = \"primary\"
# google_account = \"you@example.com\"

[sync]
# fixed_duration = \"2h\"
# max_retries = 3
# retry_delay = \"3s\"
# retry_backoff = \"constant\"  # or \"exponential\"
# enable_duplicate_cleanup = false
# marker = \"7\"
# time_zone = \"Europe/London\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
