//! Retry policy, per-call budget, and the shared retry loop.
//!
//! [`RetryPolicy`] is independent of any HTTP client: it decides which
//! methods and statuses are retryable and how long to back off.
//! [`RetryBudget`] tracks how many retries one call has left, with
//! separate sub-budgets for connect-phase and read-phase failures so a
//! flaky read does not drain the connect allowance.
//!
//! [`with_retry`] drives an attempt closure against a policy. Each attempt
//! reports an [`AttemptOutcome`]; transient outcomes carry the value to
//! return if the budget runs out, so an exhausted status retry hands back
//! the last upstream response rather than a synthetic error.

use std::future::Future;
use std::time::Duration;

use reqwest::Method;
use tracing::warn;

use crate::Result;
use crate::telemetry;

/// Configuration for retry behaviour on transient failures.
///
/// ```rust
/// # use termsum::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .max_retries(5)
///     .backoff_base(Duration::from_millis(200));
/// assert!(policy.is_retryable_status(503));
/// assert!(!policy.is_retryable_status(404));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt, across all failure kinds.
    /// 0 = no retry. Default: 3.
    pub max_retries: u32,
    /// Retries allowed for connection-phase failures. Default: 3.
    pub connect_retries: u32,
    /// Retries allowed for read-phase failures. Default: 3.
    pub read_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    /// Default: 1s.
    pub backoff_base: Duration,
    /// Cap on any single delay. Default: 30s.
    pub max_backoff: Duration,
    /// Response statuses that trigger a retry. Default: 500, 502, 503, 504.
    pub retry_statuses: Vec<u16>,
    /// Methods eligible for retry at all. Default: POST.
    pub retry_methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            connect_retries: 3,
            read_retries: 3,
            backoff_base: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            retry_statuses: vec![500, 502, 503, 504],
            retry_methods: vec![Method::POST],
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the total retry budget.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the connect-phase retry budget.
    pub fn connect_retries(mut self, n: u32) -> Self {
        self.connect_retries = n;
        self
    }

    /// Set the read-phase retry budget.
    pub fn read_retries(mut self, n: u32) -> Self {
        self.read_retries = n;
        self
    }

    /// Set the base backoff delay.
    pub fn backoff_base(mut self, delay: Duration) -> Self {
        self.backoff_base = delay;
        self
    }

    /// Set the maximum backoff delay.
    pub fn max_backoff(mut self, delay: Duration) -> Self {
        self.max_backoff = delay;
        self
    }

    /// Replace the set of retryable statuses.
    pub fn retry_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.retry_statuses = statuses.into();
        self
    }

    /// Replace the set of retryable methods.
    pub fn retry_methods(mut self, methods: impl Into<Vec<Method>>) -> Self {
        self.retry_methods = methods.into();
        self
    }

    pub fn is_retryable_method(&self, method: &Method) -> bool {
        self.retry_methods.contains(method)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before retry number `retry` (0-indexed).
    ///
    /// `backoff_base * 2^retry`, capped at `max_backoff`: 1s, 2s, 4s with
    /// the defaults.
    pub fn backoff(&self, retry: u32) -> Duration {
        let delay = self
            .backoff_base
            .saturating_mul(2u32.saturating_pow(retry));
        delay.min(self.max_backoff)
    }

    /// Delay honouring an upstream `Retry-After` hint, still capped at
    /// `max_backoff`.
    pub fn effective_delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.max_backoff),
            None => self.backoff(retry),
        }
    }

    /// Fresh budget for one call.
    pub fn budget(&self) -> RetryBudget {
        RetryBudget {
            total: self.max_retries,
            connect: self.connect_retries,
            read: self.read_retries,
            used: 0,
        }
    }
}

/// What went wrong in a transient attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No connection could be established.
    Connect,
    /// The connection failed while sending or reading.
    Read,
    /// Upstream answered with a retryable status.
    Status(u16),
}

impl FailureKind {
    /// Label used in logs and the `reason` metric label.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Connect => "connect",
            FailureKind::Read => "read",
            FailureKind::Status(_) => "status",
        }
    }
}

/// Remaining retries for one call.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    total: u32,
    connect: u32,
    read: u32,
    used: u32,
}

impl RetryBudget {
    /// Spend one retry on a failure of `kind`.
    ///
    /// Returns the 0-indexed retry number when allowed, `None` once the
    /// total or the matching sub-budget is spent. Status failures draw on
    /// the total only.
    pub fn try_consume(&mut self, kind: FailureKind) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        match kind {
            FailureKind::Connect => {
                if self.connect == 0 {
                    return None;
                }
                self.connect -= 1;
            }
            FailureKind::Read => {
                if self.read == 0 {
                    return None;
                }
                self.read -= 1;
            }
            FailureKind::Status(_) => {}
        }
        self.total -= 1;
        let retry = self.used;
        self.used += 1;
        Some(retry)
    }

    /// Retries spent so far.
    pub fn used(&self) -> u32 {
        self.used
    }
}

/// Result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// Final: success or a permanent failure. Returned as is.
    Complete(Result<T>),
    /// Transient failure. `fallback` is returned if no retry is allowed.
    Transient {
        kind: FailureKind,
        retry_after: Option<Duration>,
        fallback: Result<T>,
    },
}

/// Run `attempt` until it completes or the policy's budget is exhausted.
///
/// Methods outside the policy's retryable set get exactly one attempt.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, method: &Method, attempt: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let retryable = policy.is_retryable_method(method);
    let mut budget = policy.budget();
    loop {
        let (kind, retry_after, fallback) = match attempt().await {
            AttemptOutcome::Complete(result) => return result,
            AttemptOutcome::Transient {
                kind,
                retry_after,
                fallback,
            } => (kind, retry_after, fallback),
        };
        if !retryable {
            return fallback;
        }
        let Some(retry) = budget.try_consume(kind) else {
            return fallback;
        };
        metrics::counter!(telemetry::RETRIES_TOTAL, "reason" => kind.label()).increment(1);
        let delay = policy.effective_delay(retry, retry_after);
        warn!(
            reason = kind.label(),
            status = match kind {
                FailureKind::Status(s) => Some(s),
                _ => None,
            },
            retry = retry + 1,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            "retrying after transient failure"
        );
        tokio::time::sleep(delay).await;
    }
}
