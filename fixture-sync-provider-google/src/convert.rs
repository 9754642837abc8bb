//! Mapping between fixture-sync entries and Google Calendar events.
//!
//! The embedded key lives on its own line of the event description so it
//! survives edits in the Google Calendar UI. The marker maps to `colorId`.

use chrono::{DateTime, Utc};
use fixture_sync_core::{EntryBody, RawEntry};
use google_calendar::types::{Event, EventDateTime};

pub const KEY_PREFIX: &str = "X-FIXTURE-SYNC-KEY:";

pub fn to_google(body: &EntryBody) -> Event {
    let time_zone = body.time_zone.clone().unwrap_or_default();

    Event {
        summary: body.title.clone(),
        description: format!("Added by fixture-sync\n{}{}", KEY_PREFIX, body.key),
        start: Some(date_time(body.start, &time_zone)),
        end: Some(date_time(body.end, &time_zone)),
        color_id: body.marker.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn date_time(at: DateTime<Utc>, time_zone: &str) -> EventDateTime {
    EventDateTime {
        date: None,
        date_time: Some(at),
        time_zone: time_zone.to_string(),
    }
}

/// `None` for events Google reports as cancelled.
pub fn from_google(event: Event) -> Option<RawEntry> {
    if event.status == "cancelled" {
        return None;
    }

    Some(RawEntry {
        key: extract_key(&event.description).map(str::to_string),
        start: event_time(event.start.as_ref()),
        end: event_time(event.end.as_ref()),
        id: non_empty(event.id),
        title: non_empty(event.summary),
        marker: non_empty(event.color_id),
    })
}

pub fn extract_key(description: &str) -> Option<&str> {
    description
        .lines()
        .find_map(|line| line.trim().strip_prefix(KEY_PREFIX))
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// All-day events start at midnight UTC.
fn event_time(time: Option<&EventDateTime>) -> Option<DateTime<Utc>> {
    let time = time?;
    time.date_time.or_else(|| {
        time.date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
