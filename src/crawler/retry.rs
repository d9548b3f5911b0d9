//! Transient-failure retry loop
//!
//! Only the delay between attempts is capped, never the number of attempts. The
//! optional deadline is the one way out of a transient sequence.

use crate::config::RetryConfig;
use crate::FetchError;
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of time for the retry loop
///
/// Production code sleeps on the tokio timer; tests substitute a clock that only
/// records the requested delays.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock that advances instantly and remembers every sleep
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualClockState>>,
}

#[derive(Debug)]
struct ManualClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualClockState {
                now: Instant::now(),
                sleeps: Vec::new(),
            })),
        }
    }

    /// Every delay requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Total virtual time slept
    pub fn elapsed(&self) -> Duration {
        self.lock().sleeps.iter().sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClockState> {
        // A poisoned lock only means another test thread panicked mid-record
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.now += duration;
        state.sleeps.push(duration);
    }
}

/// Capped linear backoff
///
/// Starts at zero, grows by `step` after every failure, and stays at `cap` once
/// reached. Retry N (zero-based) waits `min(step * N, cap)`.
#[derive(Debug, Clone)]
pub struct Backoff {
    step: Duration,
    cap: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(step: Duration, cap: Duration) -> Self {
        Self {
            step,
            cap,
            failures: 0,
        }
    }

    /// Registers a failed attempt and returns how long to wait before the next one
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.step.saturating_mul(self.failures).min(self.cap);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    /// Number of failures registered so far
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

/// Retry settings shared by every fetch of a run
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub step: Duration,
    pub cap: Duration,
    pub deadline: Option<Duration>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            step: Duration::from_secs(config.backoff_step_secs),
            cap: Duration::from_secs(config.backoff_cap_secs),
            deadline: config.fetch_deadline_secs.map(Duration::from_secs),
        }
    }

    /// A fresh backoff for a new fetch sequence
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.step, self.cap)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Runs `attempt` until it succeeds or fails permanently
///
/// Transient errors (see [`FetchError::is_transient`]) are logged and retried
/// after the backoff delay; permanent errors are returned immediately. When the
/// policy has a deadline and the next sleep would cross it, the sequence ends
/// with [`FetchError::DeadlineExceeded`].
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    url: &str,
    mut attempt: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut backoff = policy.backoff();
    let deadline = policy.deadline.map(|budget| clock.now() + budget);

    loop {
        let error = match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() => error,
            Err(error) => return Err(error),
        };

        let delay = backoff.next_delay();
        tracing::error!(
            "Attempt {} for {} failed: {}; retrying in {:?}",
            backoff.failures(),
            url,
            error,
            delay
        );

        if let Some(deadline) = deadline {
            if clock.now() + delay > deadline {
                return Err(FetchError::DeadlineExceeded {
                    url: url.to_string(),
                    attempts: backoff.failures(),
                });
            }
        }

        clock.sleep(delay).await;
    }
}
