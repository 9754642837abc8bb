//! Store-neutral entry types.
//!
//! Providers list entries as [`RawEntry`] and receive [`EntryBody`] values
//! to write. The reconciler only ever looks at [`TargetEntry`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// An entry as listed by a store provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Opaque key payload the store keeps for us (see [`EmbeddedKey`]).
    pub key: Option<String>,
    pub marker: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// One entry currently in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEntry {
    /// Store-assigned id, used for update and delete.
    pub entry_id: String,
    pub title: String,
    /// Source record id, present only for entries this system created.
    pub external_key: Option<String>,
    pub marker: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TargetEntry {
    /// Normalize a listed entry. An entry without an id cannot be updated
    /// or deleted, so it is rejected.
    pub fn from_raw(raw: RawEntry) -> SyncResult<Self> {
        let entry_id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                SyncError::MalformedRecord(format!(
                    "store entry '{}' has no id",
                    raw.title.as_deref().unwrap_or_default()
                ))
            })?;

        Ok(TargetEntry {
            entry_id,
            title: raw.title.unwrap_or_default(),
            external_key: raw
                .key
                .as_deref()
                .and_then(EmbeddedKey::decode)
                .map(str::to_string),
            marker: raw.marker.filter(|m| !m.is_empty()),
            start: raw.start,
            end: raw.end,
        })
    }

    /// Whether writing `body` would change anything about this entry.
    pub fn differs_from(&self, body: &EntryBody) -> bool {
        self.title != body.title
            || self.start != Some(body.start)
            || self.end != Some(body.end)
            || self.marker != body.marker
            || self.external_key.as_deref() != EmbeddedKey::decode(&body.key)
    }
}

impl fmt::Display for TargetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(untitled {})", self.entry_id)
        } else {
            write!(f, "{}", self.title)
        }
    }
}

/// Identity token stored inside an entry so later runs can re-match it exactly.
///
/// Encoded as `fixture:<record id>`. Keys written by anything else decode to
/// `None` and the entry is treated as unkeyed.
pub struct EmbeddedKey;

impl EmbeddedKey {
    const TAG: &'static str = "fixture:";

    pub fn encode(record_id: &str) -> String {
        format!("{}{}", Self::TAG, record_id)
    }

    pub fn decode(payload: &str) -> Option<&str> {
        payload
            .trim()
            .strip_prefix(Self::TAG)
            .filter(|id| !id.is_empty())
    }
}

/// The content this system writes for a fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryBody {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub marker: Option<String>,
    /// Encoded [`EmbeddedKey`].
    pub key: String,
    /// IANA zone the store should display the entry in.
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(id: Option<&str>, key: Option<&str>) -> RawEntry {
        RawEntry {
            id: id.map(str::to_string),
            title: Some("A vs B".into()),
            key: key.map(str::to_string),
            marker: Some("7".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_embedded_key_roundtrip() {
        let key = EmbeddedKey::encode("537785");
        assert_eq!(key, "fixture:537785");
        assert_eq!(EmbeddedKey::decode(&key), Some("537785"));
        assert_eq!(EmbeddedKey::decode("other:537785"), None);
        assert_eq!(EmbeddedKey::decode("fixture:"), None);
    }

    #[test]
    fn test_from_raw_requires_id() {
        let err = TargetEntry::from_raw(raw(None, None)).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord(_)));

        let err = TargetEntry::from_raw(raw(Some(" "), None)).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord(_)));
    }

    #[test]
    fn test_from_raw_decodes_key_and_defaults() {
        let entry = TargetEntry::from_raw(raw(Some("evt1"), Some("fixture:42"))).unwrap();
        assert_eq!(entry.external_key.as_deref(), Some("42"));

        let foreign = TargetEntry::from_raw(raw(Some("evt2"), Some("uid-123"))).unwrap();
        assert_eq!(foreign.external_key, None);

        let bare = TargetEntry::from_raw(RawEntry {
            id: Some("evt3".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(bare.title, "");
        assert_eq!(bare.marker, None);
    }

    #[test]
    fn test_differs_from_body() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 17, 0, 0).unwrap();
        let body = EntryBody {
            title: "A vs B".into(),
            start,
            end,
            marker: Some("7".into()),
            key: EmbeddedKey::encode("42"),
            time_zone: None,
        };

        let mut entry = TargetEntry {
            entry_id: "evt1".into(),
            title: "A vs B".into(),
            external_key: Some("42".into()),
            marker: Some("7".into()),
            start: Some(start),
            end: Some(end),
        };
        assert!(!entry.differs_from(&body));

        entry.external_key = None;
        assert!(entry.differs_from(&body), "legacy entries get their key embedded");

        entry.external_key = Some("42".into());
        entry.title = "[POSTPONED] A vs B".into();
        assert!(entry.differs_from(&body));
    }
}
