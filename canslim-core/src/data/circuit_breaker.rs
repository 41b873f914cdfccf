//! Circuit breaker guarding the data provider.
//!
//! Yahoo bans IPs that hammer its endpoints. After repeated failures (or an
//! outright 403) the breaker opens and refuses every request until a
//! cooldown elapses.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct BreakerInner {
    /// `Some` while the breaker is open.
    opened_at: Option<Instant>,
    consecutive_failures: u32,
}

/// Provider guard: opens after `failure_threshold` consecutive failures or
/// an explicit trip, closes again once `cooldown` has elapsed.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                opened_at: None,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold,
        }
    }

    /// Default guard for Yahoo: 30-minute cooldown, opens after 3 failures.
    pub fn for_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60), 3)
    }

    /// Check whether requests are currently allowed.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.opened_at {
            None => true,
            Some(opened_at) => {
                if opened_at.elapsed() >= self.cooldown {
                    inner.opened_at = None;
                    inner.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful request, resetting the failure streak.
    pub fn record_success(&self) {
        self.inner.lock().unwrap().consecutive_failures = 0;
    }

    /// Record a failed request; opens the breaker at the threshold.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Open the breaker immediately (403 / IP ban).
    pub fn trip(&self) {
        self.inner.lock().unwrap().opened_at = Some(Instant::now());
    }

    /// Remaining cooldown, zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        match inner.opened_at {
            None => Duration::ZERO,
            Some(opened_at) => self.cooldown.saturating_sub(opened_at.elapsed()),
        }
    }
}
