//! Status polling with a fixed delay and attempt budget.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::error::{DeployError, DeployResult};

/// How long to keep polling a resource.
///
/// The first check happens immediately; `interval` is slept between checks.
/// Dropping the polling future cancels the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between two checks.
    pub interval: Duration,
    /// Maximum number of checks.
    pub max_attempts: u32,
    /// Optional overall deadline, independent of the attempt budget.
    pub timeout: Option<Duration>,
}

impl WaitPolicy {
    /// 30 s x 60 attempts, used for endpoints.
    pub const ENDPOINT: Self = Self::new(Duration::from_secs(30), 60);

    /// 30 s x 120 attempts, used for batch transform jobs.
    pub const TRANSFORM_JOB: Self = Self::new(Duration::from_secs(30), 120);

    /// A policy without an overall deadline.
    #[must_use]
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            timeout: None,
        }
    }

    /// Add an overall deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Outcome of one status check.
#[derive(Debug)]
pub(crate) enum Probe<T> {
    /// The awaited state was reached.
    Done(T),
    /// Not there yet; carries the current status for logging.
    Pending(String),
}

/// Check `probe` until it reports [`Probe::Done`], an error, or the policy runs out.
pub(crate) async fn poll_until<T, F, Fut>(
    resource: &str,
    policy: WaitPolicy,
    mut probe: F,
) -> DeployResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DeployResult<Probe<T>>>,
{
    let attempts = policy.max_attempts.max(1);
    let made = AtomicU32::new(0);
    let poll = async {
        for attempt in 1..=attempts {
            made.store(attempt, Ordering::Relaxed);
            match probe().await? {
                Probe::Done(value) => return Ok(value),
                Probe::Pending(status) => {
                    debug!(resource, attempt, status = %status, "still waiting");
                }
            }
            if attempt < attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }
        Err(DeployError::WaitTimedOut {
            resource: resource.to_owned(),
            attempts,
        })
    };

    match policy.timeout {
        Some(deadline) => tokio::time::timeout(deadline, poll)
            .await
            .unwrap_or_else(|_| {
                Err(DeployError::WaitTimedOut {
                    resource: resource.to_owned(),
                    attempts: made.load(Ordering::Relaxed),
                })
            }),
        None => poll.await,
    }
}
