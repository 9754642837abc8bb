//! Identity matching between store entries and source records.
//!
//! Entries this system created carry an embedded key and are matched by map
//! lookup. Older entries predate the key and are matched on their title
//! containing `"{home} vs {away}"`.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::entry::TargetEntry;
use crate::fixture::SourceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Key,
    Title,
}

/// A confirmed record ↔ entry pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Index into the entry slice given to [`match_entries`].
    pub entry: usize,
    pub kind: MatchKind,
}

/// A title match where several unmatched records share the same matchup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousMatch {
    pub entry_id: String,
    /// Bound record first, then the records that could also have claimed it.
    pub record_ids: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Matches {
    by_record: HashMap<String, Binding>,
    bound_entries: HashSet<usize>,
    /// Entries carrying a key that an earlier entry already claimed.
    pub keyed_duplicates: Vec<usize>,
    pub ambiguous: Vec<AmbiguousMatch>,
}

impl Matches {
    pub fn for_record(&self, record_id: &str) -> Option<Binding> {
        self.by_record.get(record_id).copied()
    }

    pub fn is_entry_bound(&self, entry: usize) -> bool {
        self.bound_entries.contains(&entry)
    }

    pub fn len(&self) -> usize {
        self.by_record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_record.is_empty()
    }

    fn bind(&mut self, record_id: &str, entry: usize, kind: MatchKind) {
        self.by_record
            .insert(record_id.to_string(), Binding { entry, kind });
        self.bound_entries.insert(entry);
    }
}

/// Pair every entry with at most one record, and every record with at most
/// one entry.
pub fn match_entries(records: &[SourceRecord], entries: &[TargetEntry]) -> Matches {
    let record_ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let mut matches = Matches::default();

    // Exact key lookup
    for (index, entry) in entries.iter().enumerate() {
        let Some(key) = entry.external_key.as_deref() else {
            continue;
        };
        if !record_ids.contains(key) {
            continue;
        }
        if matches.by_record.contains_key(key) {
            matches.keyed_duplicates.push(index);
            continue;
        }
        matches.bind(key, index, MatchKind::Key);
    }

    // Title fallback for unkeyed entries, earliest record id first
    let mut unmatched: Vec<&SourceRecord> = records
        .iter()
        .filter(|r| !matches.by_record.contains_key(&r.id))
        .collect();
    unmatched.sort_by(|a, b| compare_ids(&a.id, &b.id));
    let candidates: Vec<(&SourceRecord, String)> =
        unmatched.into_iter().map(|r| (r, r.matchup())).collect();

    for (index, entry) in entries.iter().enumerate() {
        if entry.external_key.is_some() {
            continue;
        }

        let mut hits = candidates.iter().filter(|(record, matchup)| {
            !matches.by_record.contains_key(&record.id) && entry.title.contains(matchup.as_str())
        });
        let Some((first, first_matchup)) = hits.next() else {
            continue;
        };
        let twins: Vec<String> = hits
            .filter(|(_, matchup)| matchup == first_matchup)
            .map(|(record, _)| record.id.clone())
            .collect();

        if !twins.is_empty() {
            warn!(
                entry = %entry.entry_id,
                "'{}' matches {} fixtures, binding #{}",
                entry.title,
                twins.len() + 1,
                first.id
            );
            let mut record_ids = vec![first.id.clone()];
            record_ids.extend(twins);
            matches.ambiguous.push(AmbiguousMatch {
                entry_id: entry.entry_id.clone(),
                record_ids,
            });
        }

        matches.bind(&first.id, index, MatchKind::Title);
    }

    matches
}

/// Numeric ids compare numerically, anything else lexicographically.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureStatus;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, home: &str, away: &str) -> SourceRecord {
        SourceRecord {
            id: id.into(),
            home: home.into(),
            away: away.into(),
            competition: None,
            start_time: Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap(),
            status: FixtureStatus::Scheduled,
        }
    }

    fn entry(id: &str, title: &str, key: Option<&str>) -> TargetEntry {
        TargetEntry {
            entry_id: id.into(),
            title: title.into(),
            external_key: key.map(str::to_string),
            marker: None,
            start: None,
            end: None,
        }
    }

    #[test]
    fn test_key_match_wins_over_title() {
        let records = vec![record("1", "A", "B")];
        let entries = vec![
            entry("legacy", "A vs B", None),
            entry("keyed", "Renamed by hand", Some("1")),
        ];

        let matches = match_entries(&records, &entries);

        assert_eq!(
            matches.for_record("1"),
            Some(Binding { entry: 1, kind: MatchKind::Key })
        );
        assert!(!matches.is_entry_bound(0));
    }

    #[test]
    fn test_title_fallback_uses_substring() {
        let records = vec![record("1", "A", "B"), record("2", "C", "D")];
        let entries = vec![entry("evt", "Premier League: C vs D", None)];

        let matches = match_entries(&records, &entries);

        assert_eq!(matches.for_record("1"), None);
        assert_eq!(
            matches.for_record("2"),
            Some(Binding { entry: 0, kind: MatchKind::Title })
        );
    }

    #[test]
    fn test_each_record_binds_at_most_one_entry() {
        let records = vec![record("1", "A", "B")];
        let entries = vec![entry("first", "A vs B", None), entry("second", "A vs B", None)];

        let matches = match_entries(&records, &entries);

        assert_eq!(matches.len(), 1);
        assert!(matches.is_entry_bound(0));
        assert!(!matches.is_entry_bound(1));
    }

    #[test]
    fn test_duplicate_matchups_prefer_earliest_id_and_are_flagged() {
        // Same pairing in league and cup; feed order puts the later id first
        let records = vec![record("900", "A", "B"), record("12", "A", "B")];
        let entries = vec![entry("evt", "A vs B", None)];

        let matches = match_entries(&records, &entries);

        assert_eq!(matches.for_record("12").map(|b| b.entry), Some(0));
        assert_eq!(matches.for_record("900"), None);
        assert_eq!(
            matches.ambiguous,
            vec![AmbiguousMatch {
                entry_id: "evt".into(),
                record_ids: vec!["12".into(), "900".into()],
            }]
        );
    }

    #[test]
    fn test_keyed_entries_are_never_title_matched() {
        let records = vec![record("2", "A", "B")];
        let entries = vec![entry("stale", "A vs B", Some("1"))];

        let matches = match_entries(&records, &entries);

        assert!(matches.is_empty());
        assert!(!matches.is_entry_bound(0));
    }

    #[test]
    fn test_second_entry_with_same_key_is_duplicate() {
        let records = vec![record("1", "A", "B")];
        let entries = vec![entry("a", "A vs B", Some("1")), entry("b", "A vs B", Some("1"))];

        let matches = match_entries(&records, &entries);

        assert_eq!(matches.for_record("1").map(|b| b.entry), Some(0));
        assert_eq!(matches.keyed_duplicates, vec![1]);
    }

    #[test]
    fn test_compare_ids() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("b", "a"), Ordering::Greater);
        assert_eq!(compare_ids("10", "9a"), Ordering::Less);
    }
}
