pub mod create_entry;
pub mod delete_entry;
pub mod list_entries;
pub mod update_entry;

use anyhow::Result;
use google_calendar::Client;

use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

/// Statuses worth retrying: rate limits and server errors.
const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Retryable failures that carry no status, or carry it in the reason.
const RETRYABLE_MARKERS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "backendError",
    "timed out",
    "error sending request",
];

/// The HTTP status a client error reports in its `Code: <status>` segment.
///
/// Digits elsewhere in the message (response bodies, event ids in URLs)
/// are ignored.
pub fn http_status(message: &str) -> Option<u16> {
    let lower = message.to_ascii_lowercase();
    let at = lower.find("code")? + "code".len();
    let digits: String = lower[at..]
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits
        .parse()
        .ok()
        .filter(|status| (100..600).contains(status))
}

/// Whether the root cause of `error` is transient.
///
/// Only the root cause is inspected: context lines carry event ids.
pub fn is_retryable(error: &anyhow::Error) -> bool {
    let cause = error.root_cause().to_string();
    http_status(&cause).is_some_and(|status| RETRYABLE_STATUSES.contains(&status))
        || RETRYABLE_MARKERS.iter().any(|marker| cause.contains(marker))
}

async fn authed_client(remote_config: &serde_json::Map<String, serde_json::Value>) -> Result<Client> {
    let config = GoogleRemoteConfig::try_from(remote_config)?;
    Session::load_valid(&config.google_account).await?.client()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn error(cause: &str, context: &str) -> anyhow::Error {
        Err::<(), _>(anyhow::anyhow!(cause.to_string()))
            .context(context.to_string())
            .unwrap_err()
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable(&error(
            "code: 503 Service Unavailable",
            "Failed to create entry"
        )));
        assert!(is_retryable(&error(
            "code: 403, reason: rateLimitExceeded",
            "Failed to update entry"
        )));
        assert!(!is_retryable(&error(
            "code: 401 Unauthorized",
            "Failed to list entries"
        )));
        assert!(!is_retryable(&error(
            "code: 404 Not Found",
            "Failed to update entry 5030abc"
        )));
        assert!(!is_retryable(&error(
            "HTTP Error. Code: 400 Bad Request, message: colorId 503 is invalid",
            "Failed to create entry"
        )));
    }

    #[test]
    fn test_http_status_reads_only_the_code_segment() {
        assert_eq!(
            http_status("HTTP Error. Code: 410 Gone, message: Resource has been deleted"),
            Some(410)
        );
        assert_eq!(http_status("code: 403, reason: rateLimitExceeded"), Some(403));
        assert_eq!(
            http_status("error sending request for url (https://x/events/abc404)"),
            None
        );
        assert_eq!(http_status("Code: 42"), None);
    }
}
