//! Plan computation.

use std::collections::HashSet;

use tracing::warn;

use crate::config::SyncConfig;
use crate::diff::{DeleteReason, PlanStep, ReconciliationPlan};
use crate::entry::{EmbeddedKey, EntryBody, TargetEntry};
use crate::fixture::{FixtureStatus, SourceRecord};
use crate::matcher::match_entries;

pub const POSTPONED_PREFIX: &str = "[POSTPONED] ";

/// Compute the writes that converge `entries` on `records`.
///
/// Steps come out in execution order: cancellation deletes first, then
/// creates and updates in feed order, then stale and duplicate deletes.
/// Deleting cancelled fixtures before writing means a fixture reinstated
/// under the same matchup never briefly exists twice.
pub fn compute_plan(
    records: &[SourceRecord],
    entries: &[TargetEntry],
    config: &SyncConfig,
) -> ReconciliationPlan {
    compute_plan_with_unreadable(records, &[], entries, config)
}

/// [`compute_plan`] for a feed that also listed fixtures it could not be
/// read back from. Entries keyed to `unreadable_ids` are left alone.
pub fn compute_plan_with_unreadable(
    records: &[SourceRecord],
    unreadable_ids: &[String],
    entries: &[TargetEntry],
    config: &SyncConfig,
) -> ReconciliationPlan {
    let records = dedupe_records(records);
    let matches = match_entries(&records, entries);
    let current_ids: HashSet<&str> = records
        .iter()
        .map(|r| r.id.as_str())
        .chain(unreadable_ids.iter().map(String::as_str))
        .collect();

    let mut cancelled = Vec::new();
    let mut writes = Vec::new();
    let mut unchanged = 0;

    for record in &records {
        let binding = matches.for_record(&record.id);

        if record.status == FixtureStatus::Cancelled {
            if let Some(binding) = binding {
                cancelled.push(delete_step(&entries[binding.entry], DeleteReason::Cancelled));
            }
            continue;
        }

        let body = render_body(record, config);

        match binding {
            Some(binding) => {
                let entry = &entries[binding.entry];
                if entry.differs_from(&body) {
                    writes.push(PlanStep::Update {
                        entry_id: entry.entry_id.clone(),
                        previous_title: entry.title.clone(),
                        record: record.clone(),
                        body,
                    });
                } else {
                    unchanged += 1;
                }
            }
            None => writes.push(PlanStep::Create {
                record: record.clone(),
                body,
            }),
        }
    }

    let stale = entries
        .iter()
        .filter(|e| {
            e.external_key
                .as_deref()
                .is_some_and(|key| !current_ids.contains(key))
        })
        .map(|e| delete_step(e, DeleteReason::Stale));

    let mut duplicates: Vec<PlanStep> = matches
        .keyed_duplicates
        .iter()
        .map(|&i| delete_step(&entries[i], DeleteReason::Duplicate))
        .collect();

    if config.enable_duplicate_cleanup {
        match config.marker.as_deref() {
            Some(marker) => duplicates.extend(
                entries
                    .iter()
                    .enumerate()
                    .filter(|(i, e)| {
                        e.external_key.is_none()
                            && !matches.is_entry_bound(*i)
                            && e.marker.as_deref() == Some(marker)
                    })
                    .map(|(_, e)| delete_step(e, DeleteReason::Duplicate)),
            ),
            None => warn!("Duplicate cleanup is enabled but no marker is configured, skipping"),
        }
    }

    let mut steps = cancelled;
    steps.extend(writes);
    steps.extend(stale);
    steps.extend(duplicates);

    ReconciliationPlan {
        steps,
        unchanged,
        ambiguous: matches.ambiguous,
    }
}

/// Delete everything this system created: keyed entries, plus entries
/// bearing the marker when `enable_duplicate_cleanup` is set.
pub fn purge_plan(entries: &[TargetEntry], config: &SyncConfig) -> ReconciliationPlan {
    let marker = config
        .marker
        .as_deref()
        .filter(|_| config.enable_duplicate_cleanup);

    let steps = entries
        .iter()
        .filter(|e| {
            e.external_key.is_some() || (marker.is_some() && e.marker.as_deref() == marker)
        })
        .map(|e| delete_step(e, DeleteReason::Purge))
        .collect();

    ReconciliationPlan {
        steps,
        ..Default::default()
    }
}

/// The entry content for a fixture.
pub fn render_body(record: &SourceRecord, config: &SyncConfig) -> EntryBody {
    let mut title = match &record.competition {
        Some(competition) => format!("{}: {}", competition, record.matchup()),
        None => record.matchup(),
    };
    if record.status == FixtureStatus::Postponed {
        title.insert_str(0, POSTPONED_PREFIX);
    }

    EntryBody {
        title,
        start: record.start_time,
        end: record.start_time + config.fixture_span(),
        marker: config.marker.clone(),
        key: EmbeddedKey::encode(&record.id),
        time_zone: config.time_zone.clone(),
    }
}

fn delete_step(entry: &TargetEntry, reason: DeleteReason) -> PlanStep {
    PlanStep::Delete {
        entry_id: entry.entry_id.clone(),
        title: entry.title.clone(),
        reason,
    }
}

/// Keep the first record for each id.
fn dedupe_records(records: &[SourceRecord]) -> Vec<SourceRecord> {
    let mut seen = HashSet::new();

    records
        .iter()
        .filter(|r| {
            let first = seen.insert(r.id.as_str());
            if !first {
                warn!("Fixture #{} appears more than once in the feed, keeping the first", r.id);
            }
            first
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffKind;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, home: &str, away: &str, status: FixtureStatus) -> SourceRecord {
        SourceRecord {
            id: id.into(),
            home: home.into(),
            away: away.into(),
            competition: None,
            start_time: Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap(),
            status,
        }
    }

    fn synced(entry_id: &str, record: &SourceRecord, config: &SyncConfig) -> TargetEntry {
        let body = render_body(record, config);
        TargetEntry {
            entry_id: entry_id.into(),
            title: body.title,
            external_key: Some(record.id.clone()),
            marker: body.marker,
            start: Some(body.start),
            end: Some(body.end),
        }
    }

    fn legacy(entry_id: &str, title: &str, marker: Option<&str>) -> TargetEntry {
        TargetEntry {
            entry_id: entry_id.into(),
            title: title.into(),
            external_key: None,
            marker: marker.map(str::to_string),
            start: None,
            end: None,
        }
    }

    fn kinds(plan: &ReconciliationPlan) -> Vec<(DiffKind, &str)> {
        plan.steps.iter().map(|s| (s.kind(), s.title())).collect()
    }

    #[test]
    fn test_single_scheduled_record_into_empty_store() {
        let config = SyncConfig::default();
        let records = vec![record("42", "A", "B", FixtureStatus::Scheduled)];

        let plan = compute_plan(&records, &[], &config);

        assert_eq!(plan.steps.len(), 1);
        let PlanStep::Create { body, .. } = &plan.steps[0] else {
            panic!("Expected create, got {:?}", plan.steps[0]);
        };
        assert_eq!(body.title, "A vs B");
        assert_eq!(body.start, Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap());
        assert_eq!(body.end, Utc.with_ymd_and_hms(2025, 3, 1, 17, 0, 0).unwrap());
        assert_eq!(body.key, "fixture:42");
    }

    #[test]
    fn test_titles_carry_competition_and_postponed_prefix() {
        let config = SyncConfig::default();

        let postponed = record("1", "A", "B", FixtureStatus::Postponed);
        assert_eq!(render_body(&postponed, &config).title, "[POSTPONED] A vs B");

        let mut cup = record("2", "A", "B", FixtureStatus::Postponed);
        cup.competition = Some("FA Cup".into());
        assert_eq!(render_body(&cup, &config).title, "[POSTPONED] FA Cup: A vs B");
    }

    #[test]
    fn test_unchanged_entries_produce_no_steps() {
        let config = SyncConfig::default();
        let records = vec![record("1", "A", "B", FixtureStatus::Scheduled)];
        let entries = vec![synced("evt1", &records[0], &config)];

        let plan = compute_plan(&records, &entries, &config);

        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_rescheduled_fixture_is_updated_in_place() {
        let config = SyncConfig::default();
        let original = record("1", "A", "B", FixtureStatus::Scheduled);
        let entries = vec![synced("evt1", &original, &config)];

        let mut moved = original.clone();
        moved.start_time = Utc.with_ymd_and_hms(2025, 3, 2, 12, 30, 0).unwrap();

        let plan = compute_plan(&[moved], &entries, &config);

        assert_eq!(plan.steps.len(), 1);
        let PlanStep::Update { entry_id, body, .. } = &plan.steps[0] else {
            panic!("Expected update");
        };
        assert_eq!(entry_id, "evt1");
        assert_eq!(body.end, Utc.with_ymd_and_hms(2025, 3, 2, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_legacy_entry_gets_key_embedded() {
        let config = SyncConfig::default();
        let records = vec![record("1", "A", "B", FixtureStatus::Scheduled)];
        let entries = vec![legacy("old", "A vs B", Some("7"))];

        let plan = compute_plan(&records, &entries, &config);

        assert!(matches!(
            &plan.steps[..],
            [PlanStep::Update { entry_id, .. }] if entry_id == "old"
        ));
    }

    #[test]
    fn test_cancelled_fixture_deletes_matched_entry() {
        let config = SyncConfig::default();
        let scheduled = record("1", "A", "B", FixtureStatus::Scheduled);
        let entries = vec![synced("evt1", &scheduled, &config)];
        let cancelled = record("1", "A", "B", FixtureStatus::Cancelled);

        let plan = compute_plan(&[cancelled], &entries, &config);

        assert_eq!(
            plan.steps,
            vec![PlanStep::Delete {
                entry_id: "evt1".into(),
                title: "A vs B".into(),
                reason: DeleteReason::Cancelled,
            }]
        );
    }

    #[test]
    fn test_cancelled_fixture_without_entry_is_noop() {
        let config = SyncConfig::default();
        let plan = compute_plan(&[record("1", "A", "B", FixtureStatus::Cancelled)], &[], &config);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_entry_for_vanished_fixture_is_stale() {
        let config = SyncConfig::default();
        let gone = record("9", "X", "Y", FixtureStatus::Scheduled);
        let entries = vec![synced("evt9", &gone, &config)];

        let plan = compute_plan(&[], &entries, &config);

        assert_eq!(plan.counts().delete.get(&DeleteReason::Stale), Some(&1));
    }

    #[test]
    fn test_entry_for_unreadable_fixture_is_kept() {
        let config = SyncConfig::default();
        let garbled = record("9", "X", "Y", FixtureStatus::Scheduled);
        let entries = vec![synced("evt9", &garbled, &config)];

        let plan = compute_plan_with_unreadable(&[], &["9".to_string()], &entries, &config);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_steps_are_ordered_cancel_write_stale() {
        let config = SyncConfig::default();
        let gone = record("9", "X", "Y", FixtureStatus::Scheduled);
        let cancelled = record("2", "C", "D", FixtureStatus::Scheduled);
        let entries = vec![synced("evt9", &gone, &config), synced("evt2", &cancelled, &config)];
        let records = vec![
            record("1", "A", "B", FixtureStatus::Scheduled),
            record("2", "C", "D", FixtureStatus::Cancelled),
        ];

        let plan = compute_plan(&records, &entries, &config);

        assert_eq!(
            kinds(&plan),
            vec![
                (DiffKind::Delete, "C vs D"),
                (DiffKind::Create, "A vs B"),
                (DiffKind::Delete, "X vs Y"),
            ]
        );
    }

    #[test]
    fn test_marker_orphans_only_removed_with_cleanup_enabled() {
        let records = vec![record("1", "A", "B", FixtureStatus::Scheduled)];
        let entries = vec![
            legacy("orphan", "Old friendly", Some("7")),
            legacy("dentist", "Dentist", Some("3")),
        ];

        let default = SyncConfig::default();
        let plan = compute_plan(&records, &entries, &default);
        assert_eq!(plan.counts().deleted(), 0);

        let deep = SyncConfig {
            enable_duplicate_cleanup: true,
            ..Default::default()
        };
        let plan = compute_plan(&records, &entries, &deep);
        let deleted: Vec<_> = plan
            .steps
            .iter()
            .filter_map(|s| match s {
                PlanStep::Delete { entry_id, reason, .. } => Some((entry_id.as_str(), *reason)),
                _ => None,
            })
            .collect();
        assert_eq!(deleted, vec![("orphan", DeleteReason::Duplicate)]);
    }

    #[test]
    fn test_second_keyed_entry_is_duplicate() {
        let config = SyncConfig::default();
        let fixture = record("1", "A", "B", FixtureStatus::Scheduled);
        let entries = vec![synced("a", &fixture, &config), synced("b", &fixture, &config)];

        let plan = compute_plan(&[fixture], &entries, &config);

        assert_eq!(
            plan.steps,
            vec![PlanStep::Delete {
                entry_id: "b".into(),
                title: "A vs B".into(),
                reason: DeleteReason::Duplicate,
            }]
        );
    }

    #[test]
    fn test_duplicate_record_ids_keep_first() {
        let config = SyncConfig::default();
        let records = vec![
            record("1", "A", "B", FixtureStatus::Scheduled),
            record("1", "A", "B", FixtureStatus::Postponed),
        ];

        let plan = compute_plan(&records, &[], &config);

        assert_eq!(kinds(&plan), vec![(DiffKind::Create, "A vs B")]);
    }

    #[test]
    fn test_purge_targets_keyed_entries() {
        let config = SyncConfig::default();
        let fixture = record("1", "A", "B", FixtureStatus::Scheduled);
        let entries = vec![
            synced("ours", &fixture, &config),
            legacy("tagged", "Old friendly", Some("7")),
            legacy("dentist", "Dentist", None),
        ];

        let plan = purge_plan(&entries, &config);
        assert_eq!(plan.counts().delete.get(&DeleteReason::Purge), Some(&1));

        let deep = SyncConfig {
            enable_duplicate_cleanup: true,
            ..Default::default()
        };
        let plan = purge_plan(&entries, &deep);
        assert_eq!(plan.counts().deleted(), 2);
    }
}
