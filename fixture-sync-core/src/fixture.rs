//! Feed-neutral fixture types.
//!
//! Every fixture feed delivers matches in its own JSON shape. Feeds hand
//! their raw payloads to [`FeedFormat::parse_fixture`], and everything
//! downstream (matching, diffing, reconciling) works on [`SourceRecord`].

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{SyncError, SyncResult};

/// Upstream fixture status, collapsed to what the reconciler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixtureStatus {
    Scheduled,
    Postponed,
    Cancelled,
    Other,
}

/// One upstream fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Stable feed identifier, unique within a run.
    pub id: String,
    pub home: String,
    pub away: String,
    pub competition: Option<String>,
    pub start_time: DateTime<Utc>,
    pub status: FixtureStatus,
}

impl SourceRecord {
    /// The `"{home} vs {away}"` string legacy entries are matched on.
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

impl fmt::Display for SourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.matchup(), self.id)
    }
}

/// The JSON shape a feed delivers fixtures in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedFormat {
    /// football-data.org v4 `matches` entries.
    #[default]
    FootballData,
    /// API-Football v3 `response` entries.
    ApiFootball,
    /// Already-normalized `{id, home, away, competition, startTime, status}`.
    Canonical,
}

impl FeedFormat {
    pub fn name(&self) -> &'static str {
        match self {
            FeedFormat::FootballData => "football-data",
            FeedFormat::ApiFootball => "api-football",
            FeedFormat::Canonical => "canonical",
        }
    }

    /// Public API root for formats that have one.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            FeedFormat::FootballData => Some("https://api.football-data.org"),
            FeedFormat::ApiFootball => Some("https://api-football-v1.p.rapidapi.com"),
            FeedFormat::Canonical => None,
        }
    }

    /// Normalize one raw payload.
    ///
    /// Fails with [`SyncError::MalformedRecord`] when the id, either team name,
    /// or the kickoff time is missing, since a record without them can be
    /// neither identified nor scheduled.
    pub fn parse_fixture(&self, payload: &Value) -> SyncResult<SourceRecord> {
        match self {
            FeedFormat::FootballData => parse_football_data(payload),
            FeedFormat::ApiFootball => parse_api_football(payload),
            FeedFormat::Canonical => parse_canonical(payload),
        }
    }

    /// The fixture id of a payload, readable even when the rest is not.
    pub fn fixture_id(&self, payload: &Value) -> Option<String> {
        let pointer = match self {
            FeedFormat::ApiFootball => "/fixture/id",
            FeedFormat::FootballData | FeedFormat::Canonical => "/id",
        };
        required_id(payload.pointer(pointer)).ok()
    }
}

/// Result of normalizing a whole feed response.
#[derive(Debug, Default)]
pub struct NormalizedFixtures {
    pub records: Vec<SourceRecord>,
    pub rejected: Vec<SyncError>,
    /// Ids of rejected payloads. These fixtures are still upstream.
    pub rejected_ids: Vec<String>,
}

/// Normalize a batch of payloads, skipping the malformed ones.
pub fn normalize_fixtures(format: FeedFormat, payloads: &[Value]) -> NormalizedFixtures {
    let mut normalized = NormalizedFixtures::default();

    for payload in payloads {
        match format.parse_fixture(payload) {
            Ok(record) => normalized.records.push(record),
            Err(e) => {
                warn!(format = format.name(), "Skipping fixture: {}", e);
                normalized.rejected.push(e);
                normalized.rejected_ids.extend(format.fixture_id(payload));
            }
        }
    }

    normalized
}

fn parse_football_data(payload: &Value) -> SyncResult<SourceRecord> {
    let id = required_id(payload.get("id"))?;

    let status = match payload.get("status").and_then(Value::as_str) {
        Some("SCHEDULED") | Some("TIMED") => FixtureStatus::Scheduled,
        Some("POSTPONED") => FixtureStatus::Postponed,
        Some("CANCELLED") => FixtureStatus::Cancelled,
        _ => FixtureStatus::Other,
    };

    Ok(SourceRecord {
        home: required_str(payload.pointer("/homeTeam/name"), &id, "homeTeam.name")?,
        away: required_str(payload.pointer("/awayTeam/name"), &id, "awayTeam.name")?,
        competition: optional_str(payload.pointer("/competition/name")),
        start_time: required_time(payload.get("utcDate"), &id, "utcDate")?,
        status,
        id,
    })
}

fn parse_api_football(payload: &Value) -> SyncResult<SourceRecord> {
    let id = required_id(payload.pointer("/fixture/id"))?;

    let status = match payload.pointer("/fixture/status/short").and_then(Value::as_str) {
        Some("NS") | Some("TBD") => FixtureStatus::Scheduled,
        Some("PST") => FixtureStatus::Postponed,
        Some("CANC") => FixtureStatus::Cancelled,
        _ => FixtureStatus::Other,
    };

    Ok(SourceRecord {
        home: required_str(payload.pointer("/teams/home/name"), &id, "teams.home.name")?,
        away: required_str(payload.pointer("/teams/away/name"), &id, "teams.away.name")?,
        competition: optional_str(payload.pointer("/league/name")),
        start_time: required_time(payload.pointer("/fixture/date"), &id, "fixture.date")?,
        status,
        id,
    })
}

fn parse_canonical(payload: &Value) -> SyncResult<SourceRecord> {
    let id = required_id(payload.get("id"))?;

    let status = match payload.get("status").and_then(Value::as_str) {
        Some("SCHEDULED") => FixtureStatus::Scheduled,
        Some("POSTPONED") => FixtureStatus::Postponed,
        Some("CANCELLED") => FixtureStatus::Cancelled,
        _ => FixtureStatus::Other,
    };

    Ok(SourceRecord {
        home: required_str(payload.get("home"), &id, "home")?,
        away: required_str(payload.get("away"), &id, "away")?,
        competition: optional_str(payload.get("competition")),
        start_time: required_time(payload.get("startTime"), &id, "startTime")?,
        status,
        id,
    })
}

fn required_id(value: Option<&Value>) -> SyncResult<String> {
    match value {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(SyncError::MalformedRecord("fixture has no id".into())),
    }
}

fn required_str(value: Option<&Value>, id: &str, field: &str) -> SyncResult<String> {
    optional_str(value)
        .ok_or_else(|| SyncError::MalformedRecord(format!("fixture {id} has no {field}")))
}

fn optional_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_time(value: Option<&Value>, id: &str, field: &str) -> SyncResult<DateTime<Utc>> {
    let raw = value.and_then(Value::as_str).ok_or_else(|| {
        SyncError::MalformedRecord(format!("fixture {id} has no {field}"))
    })?;

    parse_timestamp(raw).ok_or_else(|| {
        SyncError::MalformedRecord(format!("fixture {id} has an invalid {field}: {raw}"))
    })
}

/// Parse an RFC 3339 timestamp, or the short `YYYY-MM-DDTHH:MMZ` form.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}
