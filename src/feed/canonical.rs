//! A self-hosted feed already serving canonical fixtures.
//!
//! `GET {base}/fixtures?team=..&season=..` (or `competition=`), answering
//! either a bare array or `{ "fixtures": [...] }`.

use async_trait::async_trait;
use fixture_sync_core::{FeedFormat, FixtureFeed, FixtureFilter, SyncResult};
use serde_json::Value;
use url::Url;

use super::{endpoint, fetch_json, take_list};

pub struct CanonicalFeed {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl CanonicalFeed {
    pub fn new(http: reqwest::Client, base_url: Url, api_key: String) -> Self {
        CanonicalFeed {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl FixtureFeed for CanonicalFeed {
    fn format(&self) -> FeedFormat {
        FeedFormat::Canonical
    }

    async fn fetch_fixtures(&self, filter: &FixtureFilter, season: i32) -> SyncResult<Vec<Value>> {
        let (param, id) = match filter {
            FixtureFilter::Team(id) => ("team", id.as_str()),
            FixtureFilter::Competition(id) => ("competition", id.as_str()),
        };
        let season = season.to_string();

        let mut request = self
            .http
            .get(endpoint(&self.base_url, &["fixtures"])?)
            .query(&[(param, id), ("season", season.as_str())]);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        take_list(fetch_json(request).await?, "fixtures")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_fetches_bare_array() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("team".into(), "city".into()))
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_body(
                r#"[{ "id": "42", "home": "A", "away": "B", "startTime": "2025-03-01T15:00Z", "status": "SCHEDULED" }]"#,
            )
            .create_async()
            .await;

        let feed = CanonicalFeed::new(
            reqwest::Client::new(),
            Url::parse(&server.url()).unwrap(),
            "token".into(),
        );
        let payloads = feed
            .fetch_fixtures(&FixtureFilter::Team("city".into()), 2024)
            .await
            .unwrap();

        mock.assert_async().await;
        let record = FeedFormat::Canonical.parse_fixture(&payloads[0]).unwrap();
        assert_eq!(record.matchup(), "A vs B");
    }

    #[tokio::test]
    async fn test_filter_values_are_percent_encoded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/fixtures")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("competition".into(), "Brighton & Hove Cup".into()),
                Matcher::UrlEncoded("season".into(), "2025".into()),
            ]))
            .with_status(200)
            .with_body(r#"{ "fixtures": [] }"#)
            .create_async()
            .await;

        let feed = CanonicalFeed::new(
            reqwest::Client::new(),
            Url::parse(&server.url()).unwrap(),
            String::new(),
        );
        let payloads = feed
            .fetch_fixtures(&FixtureFilter::Competition("Brighton & Hove Cup".into()), 2025)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(payloads.is_empty());
    }
}
