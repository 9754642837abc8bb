use std::collections::BTreeMap;
use std::fmt;

use crate::diff::DeleteReason;

/// A store write that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// The plan step as displayed, e.g. `+: PL: Arsenal vs Chelsea`.
    pub operation: String,
    pub attempts: u32,
    pub cause: String,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.attempts == 1 { "" } else { "s" };
        write!(
            f,
            "{} failed after {} attempt{}: {}",
            self.operation, self.attempts, plural, self.cause
        )
    }
}

/// What one run did to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: BTreeMap<DeleteReason, usize>,
    /// Matched entries that needed no write.
    pub unchanged: usize,
    /// Feed records and store entries skipped as malformed.
    pub malformed: usize,
    /// Steps never started because the run was cancelled.
    pub not_attempted: usize,
    pub cancelled: bool,
    pub failures: Vec<OperationFailure>,
}

impl RunSummary {
    pub fn deleted_total(&self) -> usize {
        self.deleted.values().sum()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every planned write was applied.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub(crate) fn record_delete(&mut self, reason: DeleteReason) {
        *self.deleted.entry(reason).or_default() += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted, {} unchanged",
            self.created,
            self.updated,
            self.deleted_total(),
            self.unchanged
        )?;
        if self.failed() > 0 {
            write!(f, ", {} failed", self.failed())?;
        }
        if self.malformed > 0 {
            write!(f, ", {} malformed", self.malformed)?;
        }
        if self.cancelled {
            write!(f, " (cancelled, {} not attempted)", self.not_attempted)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display() {
        let mut summary = RunSummary {
            created: 2,
            unchanged: 5,
            ..Default::default()
        };
        summary.record_delete(DeleteReason::Stale);
        summary.record_delete(DeleteReason::Cancelled);
        assert_eq!(summary.to_string(), "2 created, 0 updated, 2 deleted, 5 unchanged");
        assert!(summary.is_clean());

        summary.failures.push(OperationFailure {
            operation: "+: A vs B".into(),
            attempts: 3,
            cause: "503".into(),
        });
        summary.cancelled = true;
        summary.not_attempted = 4;
        assert_eq!(
            summary.to_string(),
            "2 created, 0 updated, 2 deleted, 5 unchanged, 1 failed (cancelled, 4 not attempted)"
        );
        assert!(!summary.is_clean());
    }
}
