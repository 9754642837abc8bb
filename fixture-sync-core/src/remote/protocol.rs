//! Defines the JSON protocol used between fixture-sync and store provider
//! binaries over stdin/stdout.
//!
//! One request per process: the provider reads a single [`Request`] line
//! and writes a single [`Response`] line.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::entry::{EntryBody, RawEntry};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListEntries,
    CreateEntry,
    UpdateEntry,
    DeleteEntry,
}

/// Request sent from fixture-sync to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to fixture-sync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        /// Set when the same request may succeed later (rate limits, 5xx, timeouts).
        #[serde(default)]
        retryable: bool,
    },
}

const UNSERIALIZABLE: &str = r#"{"status":"error","error":"response could not be serialized","retryable":false}"#;

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|_| UNSERIALIZABLE.to_string())
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        Self::failure(msg, false)
    }

    pub fn error_retryable(msg: &str) -> String {
        Self::failure(msg, true)
    }

    fn failure(msg: &str, retryable: bool) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
            retryable,
        })
        .unwrap_or_else(|_| UNSERIALIZABLE.to_string())
    }
}

/// List every entry in a container.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEntries {
    /// Provider-specific params (e.g. google_account)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub container_id: String,
}

impl ProviderCommand for ListEntries {
    type Response = Vec<RawEntry>;
    fn command() -> Command {
        Command::ListEntries
    }
}

/// Create an entry. Responds with the id the store assigned.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEntry {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub container_id: String,
    pub body: EntryBody,
}

impl ProviderCommand for CreateEntry {
    type Response = String;
    fn command() -> Command {
        Command::CreateEntry
    }
}

/// Overwrite an existing entry's content.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEntry {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub container_id: String,
    pub entry_id: String,
    pub body: EntryBody,
}

impl ProviderCommand for UpdateEntry {
    type Response = ();
    fn command() -> Command {
        Command::UpdateEntry
    }
}

/// Delete an entry by id. Deleting an entry that is already gone succeeds.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEntry {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub container_id: String,
    pub entry_id: String,
}

impl ProviderCommand for DeleteEntry {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEntry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_params_flatten_remote_config() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_account".into(), json!("me@example.com"));

        let params = serde_json::to_value(DeleteEntry {
            remote_config,
            container_id: "primary".into(),
            entry_id: "evt1".into(),
        })
        .unwrap();

        assert_eq!(
            params,
            json!({
                "google_account": "me@example.com",
                "container_id": "primary",
                "entry_id": "evt1",
            })
        );

        let parsed: DeleteEntry = serde_json::from_value(params).unwrap();
        assert_eq!(parsed.entry_id, "evt1");
        assert_eq!(parsed.remote_config.len(), 1);
    }

    #[test]
    fn test_error_responses_carry_retryable_flag() {
        let transient: Response<()> =
            serde_json::from_str(&Response::error_retryable("HTTP 503")).unwrap();
        assert!(matches!(
            transient,
            Response::Error { retryable: true, .. }
        ));

        // Older providers omit the flag.
        let fatal: Response<()> =
            serde_json::from_str(r#"{"status":"error","error":"not found"}"#).unwrap();
        assert!(matches!(fatal, Response::Error { retryable: false, .. }));
    }

    #[test]
    fn test_success_response() {
        let response: Response<String> =
            serde_json::from_str(&Response::success("evt42")).unwrap();
        assert!(matches!(response, Response::Success { data } if data == "evt42"));
    }
}
