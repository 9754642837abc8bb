//! football-data.org v4.

use async_trait::async_trait;
use fixture_sync_core::{FeedFormat, FixtureFeed, FixtureFilter, SyncResult};
use serde_json::Value;
use url::Url;

use super::{endpoint, fetch_json, take_list};

pub struct FootballDataFeed {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl FootballDataFeed {
    pub fn new(http: reqwest::Client, base_url: Url, api_key: String) -> Self {
        FootballDataFeed {
            http,
            base_url,
            api_key,
        }
    }

    fn url(&self, filter: &FixtureFilter) -> SyncResult<Url> {
        match filter {
            FixtureFilter::Team(id) => {
                endpoint(&self.base_url, &["v4", "teams", id.as_str(), "matches"])
            }
            FixtureFilter::Competition(code) => {
                endpoint(&self.base_url, &["v4", "competitions", code.as_str(), "matches"])
            }
        }
    }
}

#[async_trait]
impl FixtureFeed for FootballDataFeed {
    fn format(&self) -> FeedFormat {
        FeedFormat::FootballData
    }

    async fn fetch_fixtures(&self, filter: &FixtureFilter, season: i32) -> SyncResult<Vec<Value>> {
        let request = self
            .http
            .get(self.url(filter)?)
            .query(&[("season", season)])
            .header("X-Auth-Token", &self.api_key);

        take_list(fetch_json(request).await?, "matches")
    }
}
