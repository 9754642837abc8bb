//! Google-specific store params, forwarded from the `[store]` config section.

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleRemoteConfig {
    pub google_account: String,
}

impl TryFrom<&serde_json::Map<String, serde_json::Value>> for GoogleRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let google_account = map
            .get("google_account")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing required field: google_account"))?
            .to_string();

        Ok(Self { google_account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_account() {
        let map = json!({ "google_account": "me@example.com", "extra": 1 });
        let config = GoogleRemoteConfig::try_from(map.as_object().unwrap()).unwrap();
        assert_eq!(config.google_account, "me@example.com");

        let empty = json!({});
        assert!(GoogleRemoteConfig::try_from(empty.as_object().unwrap()).is_err());
    }
}
