//! App-level configuration for the Google provider.
//!
//! User-provided OAuth credentials stored at:
//!   ~/.config/fixture-sync/providers/google/app_config.toml

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("fixture-sync")
        .join("providers")
        .join("google"))
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("app_config.toml");

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Create {} with:\n\n\
                client_id = \"your-client-id.apps.googleusercontent.com\"\n\
                client_secret = \"your-client-secret\"\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.",
                path.display()
            );
        }

        Self::from_file(&path)
    }

    fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_credentials_file() {
        let path = std::env::temp_dir().join(format!(
            "fixture_sync_google_app_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "client_id = \"id.apps.googleusercontent.com\"\nclient_secret = \"shh\"\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.client_id, "id.apps.googleusercontent.com");
        assert_eq!(config.client_secret, "shh");
    }

    #[test]
    fn test_base_dir_is_namespaced() {
        let dir = base_dir().unwrap();
        assert!(dir.ends_with("fixture-sync/providers/google"));
    }
}
