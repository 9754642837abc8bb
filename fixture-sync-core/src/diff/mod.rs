//! Reconciliation planning: what has to change in the store so it mirrors the feed.

mod diff_kind;
mod engine;
mod plan;

pub use diff_kind::DiffKind;
pub use engine::{
    POSTPONED_PREFIX, compute_plan, compute_plan_with_unreadable, purge_plan, render_body,
};
pub use plan::{DeleteReason, PlanCounts, PlanStep, ReconciliationPlan};
