//! Fixed-window request limiter keyed by caller identity.
//!
//! Soft and process local: concurrent requests from one identifier may race
//! between check and increment, which is acceptable for abuse mitigation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUESTS: u32 = 4;

#[derive(Clone, Copy, Debug)]
struct Entry {
    count: u32,
    reset_at: Instant,
}

/// Outcome of [`RateLimiter::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after: Duration,
}

#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_REQUESTS)
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts one request for `identifier` and reports whether it fits the quota.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries();

        match entries.get_mut(identifier) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count < self.max_requests {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                entries.insert(
                    identifier.to_owned(),
                    Entry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    pub fn remaining(&self, identifier: &str) -> u32 {
        let now = Instant::now();

        match self.entries().get(identifier) {
            Some(entry) if now <= entry.reset_at => self.max_requests.saturating_sub(entry.count),
            _ => self.max_requests,
        }
    }

    /// Time until the current window of `identifier` expires, zero when there is none.
    pub fn reset_after(&self, identifier: &str) -> Duration {
        let now = Instant::now();

        match self.entries().get(identifier) {
            Some(entry) if now <= entry.reset_at => entry.reset_at - now,
            _ => Duration::ZERO,
        }
    }

    pub fn check(&self, identifier: &str) -> RateLimitStatus {
        let allowed = self.is_allowed(identifier);

        RateLimitStatus {
            allowed,
            remaining: self.remaining(identifier),
            reset_after: self.reset_after(identifier),
        }
    }

    pub fn reset(&self, identifier: &str) {
        self.entries().remove(identifier);
    }

    /// Drops every entry whose window has passed, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();

        entries.retain(|_, entry| now <= entry.reset_at);

        before - entries.len()
    }

    pub fn tracked(&self) -> usize {
        self.entries().len()
    }

    /// Sweeps expired entries once per window until the handle is stopped or
    /// the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweepHandle {
        let limiter: Weak<Self> = Arc::downgrade(self);
        let period = self.window.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let Some(limiter) = limiter.upgrade() else {
                    break;
                };

                let removed = limiter.sweep();
                if removed > 0 {
                    tracing::debug!(removed, "swept expired rate limit entries");
                }
            }
        });

        SweepHandle { task }
    }
}

#[derive(Debug)]
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
