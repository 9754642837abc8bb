//! HTTP clients for the fixture feeds.

mod api_football;
mod canonical;
mod football_data;

use std::time::Duration;

use anyhow::{Context, Result};
use fixture_sync_core::config::FeedConfig;
use fixture_sync_core::{FeedFormat, FixtureFeed, SyncError, SyncResult};
use serde_json::Value;
use url::Url;

pub use api_football::ApiFootballFeed;
pub use canonical::CanonicalFeed;
pub use football_data::FootballDataFeed;

/// Build the feed client the config asks for.
pub fn from_config(config: &FeedConfig) -> Result<Box<dyn FixtureFeed>> {
    let raw = config.base_url().context("feed.base_url is not set")?;
    let base_url =
        Url::parse(raw).with_context(|| format!("feed.base_url is not a valid URL: {raw}"))?;
    if base_url.cannot_be_a_base() {
        anyhow::bail!("feed.base_url cannot carry a path: {raw}");
    }
    let http = http_client(config.timeout)?;
    let api_key = config.api_key.clone();

    let feed: Box<dyn FixtureFeed> = match config.format {
        FeedFormat::FootballData => Box::new(FootballDataFeed::new(http, base_url, api_key)),
        FeedFormat::ApiFootball => {
            let host = match &config.api_host {
                Some(host) => host.clone(),
                None => base_url
                    .host_str()
                    .context("feed.base_url has no host")?
                    .to_string(),
            };
            Box::new(ApiFootballFeed::new(http, base_url, api_key, host))
        }
        FeedFormat::Canonical => Box::new(CanonicalFeed::new(http, base_url, api_key)),
    };
    Ok(feed)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(format!("fixture-sync/{}", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// `base` with `segments` appended to its path, each one percent-encoded.
fn endpoint(base: &Url, segments: &[&str]) -> SyncResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SyncError::Config(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send `request` and decode the JSON body.
async fn fetch_json(request: reqwest::RequestBuilder) -> SyncResult<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| SyncError::FeedUnavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::FeedUnavailable(format!("HTTP {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| SyncError::FeedUnavailable(e.to_string()))?;

    serde_json::from_slice(&body)
        .map_err(|e| SyncError::FeedUnavailable(format!("invalid JSON: {e}")))
}

/// The fixture list under `field`, or the body itself when it is a bare array.
fn take_list(value: Value, field: &str) -> SyncResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SyncError::FeedUnavailable(format!(
                "response has no '{field}' list"
            ))),
        },
        _ => Err(SyncError::FeedUnavailable(
            "response is not a JSON object".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_take_list() {
        let items = take_list(json!({ "matches": [{ "id": 1 }], "count": 1 }), "matches").unwrap();
        assert_eq!(items.len(), 1);

        let bare = take_list(json!([{ "id": 1 }, { "id": 2 }]), "matches").unwrap();
        assert_eq!(bare.len(), 2);

        let missing = take_list(json!({ "message": "rate limited" }), "matches");
        assert!(matches!(missing, Err(SyncError::FeedUnavailable(_))));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://feeds.example.com/api/").unwrap();

        let url = endpoint(&base, &["v4", "competitions", "A/B Cup", "matches"]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://feeds.example.com/api/v4/competitions/A%2FB%20Cup/matches"
        );
    }

    #[test]
    fn test_from_config_picks_format() {
        let mut config = FeedConfig::default();
        config.api_key = "k".into();
        let feed = from_config(&config).unwrap();
        assert_eq!(feed.format(), FeedFormat::FootballData);

        config.format = FeedFormat::Canonical;
        assert!(from_config(&config).is_err());

        config.base_url = Some("http://localhost:8080/".into());
        assert_eq!(from_config(&config).unwrap().format(), FeedFormat::Canonical);

        config.base_url = Some("not a url".into());
        assert!(from_config(&config).is_err());
    }
}
