//! Bounded retry for single store calls.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::{Backoff, SyncConfig};
use crate::error::{SyncError, SyncResult};

/// Lifecycle of one store operation.
///
/// `Pending → (Attempting → Success | TransientFailure)* → Success | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Attempting(u32),
    TransientFailure(u32),
    Success,
    Failed,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Success | OperationState::Failed)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Pending => write!(f, "pending"),
            OperationState::Attempting(n) => write!(f, "attempting #{n}"),
            OperationState::TransientFailure(n) => write!(f, "transient failure #{n}"),
            OperationState::Success => write!(f, "success"),
            OperationState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: SyncResult<T>,
    pub attempts: u32,
    pub state: OperationState,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    backoff: Backoff,
    call_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration, backoff: Backoff, call_timeout: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay,
            backoff,
            call_timeout,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.max_retries,
            config.retry_delay,
            config.retry_backoff,
            config.operation_timeout,
        )
    }

    /// Wait after the `failed_attempt`-th attempt failed.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Constant => self.delay,
            Backoff::Exponential => {
                let exponent = failed_attempt.saturating_sub(1).min(16);
                self.delay.saturating_mul(1 << exponent)
            }
        }
    }

    /// Run `call` until it succeeds, fails fatally, or runs out of attempts.
    ///
    /// Each attempt is bounded by the call timeout; an elapsed timeout counts
    /// as a transient failure.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Attempted<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SyncResult<T>>,
    {
        let mut state = OperationState::Pending;
        let mut attempt = 0;

        loop {
            attempt += 1;
            state = transition(operation, state, OperationState::Attempting(attempt));

            let result = match timeout(self.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(SyncError::StoreTransient(format!(
                    "timed out after {}",
                    humantime::format_duration(self.call_timeout)
                ))),
            };

            match result {
                Ok(value) => {
                    state = transition(operation, state, OperationState::Success);
                    return Attempted {
                        result: Ok(value),
                        attempts: attempt,
                        state,
                    };
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    state = transition(operation, state, OperationState::TransientFailure(attempt));
                    let wait = self.delay_after(attempt);
                    warn!(
                        "{} failed ({}), retrying in {} ({}/{})",
                        operation,
                        e,
                        humantime::format_duration(wait),
                        attempt,
                        self.max_attempts
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    state = transition(operation, state, OperationState::Failed);
                    return Attempted {
                        result: Err(e),
                        attempts: attempt,
                        state,
                    };
                }
            }
        }
    }
}

fn transition(operation: &str, from: OperationState, to: OperationState) -> OperationState {
    debug!(operation, "{} -> {}", from, to);
    to
}
