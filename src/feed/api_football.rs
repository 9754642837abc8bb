//! API-Football v3, served through RapidAPI.

use async_trait::async_trait;
use fixture_sync_core::{FeedFormat, FixtureFeed, FixtureFilter, SyncError, SyncResult};
use serde_json::Value;
use url::Url;

use super::{endpoint, fetch_json, take_list};

pub struct ApiFootballFeed {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    host: String,
}

impl ApiFootballFeed {
    pub fn new(http: reqwest::Client, base_url: Url, api_key: String, host: String) -> Self {
        ApiFootballFeed {
            http,
            base_url,
            api_key,
            host,
        }
    }
}

/// API-Football answers 200 with an `errors` object for quota and auth problems.
fn check_errors(body: &Value) -> SyncResult<()> {
    let reported = match body.get("errors") {
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        _ => false,
    };
    if reported {
        return Err(SyncError::FeedUnavailable(format!(
            "API-Football errors: {}",
            body["errors"]
        )));
    }
    Ok(())
}

#[async_trait]
impl FixtureFeed for ApiFootballFeed {
    fn format(&self) -> FeedFormat {
        FeedFormat::ApiFootball
    }

    async fn fetch_fixtures(&self, filter: &FixtureFilter, season: i32) -> SyncResult<Vec<Value>> {
        let (param, id) = match filter {
            FixtureFilter::Team(id) => ("team", id.as_str()),
            FixtureFilter::Competition(id) => ("league", id.as_str()),
        };
        let season = season.to_string();

        let request = self
            .http
            .get(endpoint(&self.base_url, &["v3", "fixtures"])?)
            .query(&[(param, id), ("season", season.as_str())])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host);

        let body = fetch_json(request).await?;
        check_errors(&body)?;
        take_list(body, "response")
    }
}
