use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffKind;
use crate::entry::EntryBody;
use crate::fixture::SourceRecord;
use crate::matcher::AmbiguousMatch;

/// Why an entry is being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    /// The fixture was cancelled upstream.
    Cancelled,
    /// The fixture no longer appears in the feed.
    Stale,
    /// A second entry for a fixture, or a marker-tagged orphan during a deep clean.
    Duplicate,
    /// Explicit clean-up of everything this system created.
    Purge,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteReason::Cancelled => write!(f, "cancelled"),
            DeleteReason::Stale => write!(f, "stale"),
            DeleteReason::Duplicate => write!(f, "duplicate"),
            DeleteReason::Purge => write!(f, "purge"),
        }
    }
}

/// One store write.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    Create {
        record: SourceRecord,
        body: EntryBody,
    },
    Update {
        entry_id: String,
        previous_title: String,
        record: SourceRecord,
        body: EntryBody,
    },
    Delete {
        entry_id: String,
        title: String,
        reason: DeleteReason,
    },
}

impl PlanStep {
    pub fn kind(&self) -> DiffKind {
        match self {
            PlanStep::Create { .. } => DiffKind::Create,
            PlanStep::Update { .. } => DiffKind::Update,
            PlanStep::Delete { .. } => DiffKind::Delete,
        }
    }

    /// Title the step leaves behind (or removes, for deletes).
    pub fn title(&self) -> &str {
        match self {
            PlanStep::Create { body, .. } | PlanStep::Update { body, .. } => &body.title,
            PlanStep::Delete { title, .. } => title,
        }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStep::Delete { reason, .. } => {
                write!(f, "{}: {} ({})", self.kind(), self.title(), reason)
            }
            _ => write!(f, "{}: {}", self.kind(), self.title()),
        }
    }
}

/// Ordered writes for one run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub steps: Vec<PlanStep>,
    /// Matched entries that already look exactly like their fixture.
    pub unchanged: usize,
    pub ambiguous: Vec<AmbiguousMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub create: usize,
    pub update: usize,
    pub delete: BTreeMap<DeleteReason, usize>,
}

impl PlanCounts {
    pub fn deleted(&self) -> usize {
        self.delete.values().sum()
    }
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn counts(&self) -> PlanCounts {
        let mut counts = PlanCounts::default();

        for step in &self.steps {
            match step {
                PlanStep::Create { .. } => counts.create += 1,
                PlanStep::Update { .. } => counts.update += 1,
                PlanStep::Delete { reason, .. } => *counts.delete.entry(*reason).or_default() += 1,
            }
        }

        counts
    }
}
