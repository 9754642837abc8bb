//! Applying plans to a store.
//!
//! Steps run one at a time in plan order. Each one is retried on its own;
//! a step that exhausts its attempts is recorded and the run moves on.

mod retry;
mod summary;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::diff::{
    PlanStep, ReconciliationPlan, compute_plan, compute_plan_with_unreadable, purge_plan,
};
use crate::entry::TargetEntry;
use crate::error::SyncResult;
use crate::fixture::{SourceRecord, normalize_fixtures};
use crate::store::{FixtureFeed, FixtureFilter, KeyedStore};

pub use retry::{Attempted, OperationState, RetryPolicy};
pub use summary::{OperationFailure, RunSummary};

/// Shared stop flag. Steps already in flight finish; nothing new starts.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Both sides of a run, read before anything is written.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<SourceRecord>,
    pub entries: Vec<TargetEntry>,
    /// Ids of fixtures the feed listed but that could not be normalized.
    /// Their entries are neither updated nor treated as stale.
    pub unreadable_ids: Vec<String>,
    /// Feed payloads and store entries that could not be normalized.
    pub malformed: usize,
}

impl Snapshot {
    pub fn plan(&self, config: &SyncConfig) -> ReconciliationPlan {
        compute_plan_with_unreadable(&self.records, &self.unreadable_ids, &self.entries, config)
    }
}

/// Executes plans against one container of a store.
pub struct Reconciler<'a, S: KeyedStore + ?Sized> {
    store: &'a S,
    container_id: &'a str,
    policy: RetryPolicy,
    cancellation: Cancellation,
}

impl<'a, S: KeyedStore + ?Sized> Reconciler<'a, S> {
    pub fn new(
        store: &'a S,
        container_id: &'a str,
        config: &SyncConfig,
        cancellation: Cancellation,
    ) -> Self {
        Reconciler {
            store,
            container_id,
            policy: RetryPolicy::from_config(config),
            cancellation,
        }
    }

    /// List and normalize the container's entries, retrying transient
    /// failures. Entries that cannot be normalized are skipped and counted.
    pub async fn load_entries(&self) -> SyncResult<(Vec<TargetEntry>, usize)> {
        let raw = self
            .policy
            .run("list entries", || self.store.list_entries(self.container_id))
            .await
            .result?;

        let mut entries = Vec::with_capacity(raw.len());
        let mut malformed = 0;
        for raw_entry in raw {
            match TargetEntry::from_raw(raw_entry) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(container = self.container_id, "Skipping entry: {}", e);
                    malformed += 1;
                }
            }
        }

        debug!(
            container = self.container_id,
            "Listed {} entries ({} keyed)",
            entries.len(),
            entries.iter().filter(|e| e.external_key.is_some()).count()
        );

        Ok((entries, malformed))
    }

    /// Apply every step of `plan`, in order.
    pub async fn execute(&self, plan: &ReconciliationPlan) -> RunSummary {
        let mut summary = RunSummary {
            unchanged: plan.unchanged,
            ..Default::default()
        };

        for (index, step) in plan.steps.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                summary.cancelled = true;
                summary.not_attempted = plan.steps.len() - index;
                warn!(
                    "Cancelled, {} operations not attempted",
                    summary.not_attempted
                );
                break;
            }

            let operation = step.to_string();
            let attempted = self.policy.run(&operation, || self.apply(step)).await;

            match attempted.result {
                Ok(()) => {
                    info!("{}", operation);
                    match step {
                        PlanStep::Create { .. } => summary.created += 1,
                        PlanStep::Update { .. } => summary.updated += 1,
                        PlanStep::Delete { reason, .. } => summary.record_delete(*reason),
                    }
                }
                Err(e) => {
                    error!(
                        attempts = attempted.attempts,
                        "{} failed: {}", operation, e
                    );
                    summary.failures.push(OperationFailure {
                        operation,
                        attempts: attempted.attempts,
                        cause: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    async fn apply(&self, step: &PlanStep) -> SyncResult<()> {
        match step {
            PlanStep::Create { record, body } => {
                let entry_id = self.store.create_entry(self.container_id, body).await?;
                debug!(%entry_id, record = %record, "Entry created");
            }
            PlanStep::Update { entry_id, body, .. } => {
                self.store
                    .update_entry(self.container_id, entry_id, body)
                    .await?;
            }
            PlanStep::Delete { entry_id, .. } => {
                self.store.delete_entry(self.container_id, entry_id).await?;
            }
        }
        Ok(())
    }
}

/// Read the feed and the store concurrently and normalize both.
pub async fn snapshot<F, S>(
    feed: &F,
    store: &S,
    filter: &FixtureFilter,
    season: i32,
    container_id: &str,
    config: &SyncConfig,
) -> SyncResult<Snapshot>
where
    F: FixtureFeed + ?Sized,
    S: KeyedStore + ?Sized,
{
    let reconciler = Reconciler::new(store, container_id, config, Cancellation::new());

    let (payloads, listed) = tokio::join!(
        feed.fetch_fixtures(filter, season),
        reconciler.load_entries()
    );
    let payloads = payloads?;
    let (entries, malformed_entries) = listed?;

    let normalized = normalize_fixtures(feed.format(), &payloads);
    info!(
        "Fetched {} fixtures for {} ({}), {} entries in store",
        normalized.records.len(),
        filter,
        season,
        entries.len()
    );

    Ok(Snapshot {
        records: normalized.records,
        entries,
        unreadable_ids: normalized.rejected_ids,
        malformed: normalized.rejected.len() + malformed_entries,
    })
}

/// Compute what a run would do without writing anything.
///
/// Returns the plan and the number of store entries skipped as malformed.
pub async fn plan<S: KeyedStore + ?Sized>(
    store: &S,
    container_id: &str,
    records: &[SourceRecord],
    config: &SyncConfig,
) -> SyncResult<(ReconciliationPlan, usize)> {
    let reconciler = Reconciler::new(store, container_id, config, Cancellation::new());
    let (entries, malformed) = reconciler.load_entries().await?;
    Ok((compute_plan(records, &entries, config), malformed))
}

/// Make the container mirror `records`.
///
/// Fails only if the container cannot be listed. Individual write failures
/// are reported in the summary.
pub async fn reconcile<S: KeyedStore + ?Sized>(
    store: &S,
    container_id: &str,
    records: &[SourceRecord],
    config: &SyncConfig,
    cancellation: &Cancellation,
) -> SyncResult<RunSummary> {
    let reconciler = Reconciler::new(store, container_id, config, cancellation.clone());
    let (entries, malformed) = reconciler.load_entries().await?;

    let plan = compute_plan(records, &entries, config);
    let mut summary = reconciler.execute(&plan).await;
    summary.malformed += malformed;

    Ok(summary)
}

/// Fetch the feed and reconcile the container against it.
pub async fn sync_from_feed<F, S>(
    feed: &F,
    store: &S,
    filter: &FixtureFilter,
    season: i32,
    container_id: &str,
    config: &SyncConfig,
    cancellation: &Cancellation,
) -> SyncResult<RunSummary>
where
    F: FixtureFeed + ?Sized,
    S: KeyedStore + ?Sized,
{
    let snapshot = snapshot(feed, store, filter, season, container_id, config).await?;
    let plan = snapshot.plan(config);

    let reconciler = Reconciler::new(store, container_id, config, cancellation.clone());
    let mut summary = reconciler.execute(&plan).await;
    summary.malformed += snapshot.malformed;

    Ok(summary)
}

/// Delete every entry this system created from the container.
pub async fn purge<S: KeyedStore + ?Sized>(
    store: &S,
    container_id: &str,
    config: &SyncConfig,
    cancellation: &Cancellation,
) -> SyncResult<RunSummary> {
    let reconciler = Reconciler::new(store, container_id, config, cancellation.clone());
    let (entries, malformed) = reconciler.load_entries().await?;

    let plan = purge_plan(&entries, config);
    let mut summary = reconciler.execute(&plan).await;
    summary.malformed += malformed;

    Ok(summary)
}
