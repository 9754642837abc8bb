pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::entry::{EntryBody, RawEntry};
use crate::error::SyncResult;
use crate::remote::protocol::{CreateEntry, DeleteEntry, ListEntries, UpdateEntry};
use crate::remote::provider::Provider;
use crate::store::KeyedStore;

/// A keyed store reached through a provider binary.
#[derive(Debug, Clone)]
pub struct Remote {
    pub provider: Provider,
    params: HashMap<String, toml::Value>,
}

impl Remote {
    pub fn new(provider: Provider, params: HashMap<String, toml::Value>) -> Self {
        Remote { provider, params }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(Provider::from_name(&config.provider), config.params.clone())
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        self.params
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

#[async_trait]
impl KeyedStore for Remote {
    async fn list_entries(&self, container_id: &str) -> SyncResult<Vec<RawEntry>> {
        self.provider
            .call(ListEntries {
                remote_config: self.remote_config(),
                container_id: container_id.to_string(),
            })
            .await
    }

    async fn create_entry(&self, container_id: &str, body: &EntryBody) -> SyncResult<String> {
        self.provider
            .call(CreateEntry {
                remote_config: self.remote_config(),
                container_id: container_id.to_string(),
                body: body.clone(),
            })
            .await
    }

    async fn update_entry(
        &self,
        container_id: &str,
        entry_id: &str,
        body: &EntryBody,
    ) -> SyncResult<()> {
        self.provider
            .call(UpdateEntry {
                remote_config: self.remote_config(),
                container_id: container_id.to_string(),
                entry_id: entry_id.to_string(),
                body: body.clone(),
            })
            .await
    }

    async fn delete_entry(&self, container_id: &str, entry_id: &str) -> SyncResult<()> {
        self.provider
            .call(DeleteEntry {
                remote_config: self.remote_config(),
                container_id: container_id.to_string(),
                entry_id: entry_id.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_converts_params() {
        let mut config = StoreConfig::default();
        config
            .params
            .insert("google_account".into(), toml::Value::String("me@example.com".into()));

        let remote = Remote::from_config(&config);
        let params = remote.remote_config();

        assert_eq!(remote.provider.name(), "google");
        assert_eq!(params["google_account"], "me@example.com");
    }
}
