//! Credential-keyed call budget.
//!
//! The registrar allows 50 calls per minute, 700 per hour and 8000 per day for each
//! API account. [`RateLimiter`] keeps a log of reserved call times per credential
//! key and admits a call only when all three trailing windows have headroom. This is
//! an approximate sliding window driven by polling, not a token bucket.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{NamecheapError, Result};

pub const MINUTE: Duration = Duration::from_secs(60);
pub const HOUR: Duration = Duration::from_secs(60 * 60);
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Default pause between admission checks while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Each admitted call is logged this far in the future.
const RESERVATION: Duration = Duration::from_millis(100);

static SHARED: LazyLock<Arc<RateLimiter>> = LazyLock::new(|| Arc::new(RateLimiter::new()));

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Calls allowed in each trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub per_minute: usize,
    pub per_hour: usize,
    pub per_day: usize,
}

impl RateLimits {
    fn tightest(&self) -> usize {
        self.per_minute.min(self.per_hour).min(self.per_day)
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_minute: 50,
            per_hour: 700,
            per_day: 8000,
        }
    }
}

#[derive(Debug)]
struct CallEntry {
    at: Instant,
    command: String,
}

/// Three-window admission gate shared by every context using the same credentials.
#[derive(Debug)]
pub struct RateLimiter {
    logs: Mutex<HashMap<String, Vec<CallEntry>>>,
    clock: Arc<dyn Clock>,
    limits: RateLimits,
    poll_interval: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RateLimiterBuilder {
        RateLimiterBuilder::default()
    }

    /// Process-wide limiter used by contexts that are not given their own.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    pub fn limits(&self) -> RateLimits {
        self.limits
    }

    /// Wait until a call slot is free for `key`, then reserve it.
    ///
    /// Fails with [`NamecheapError::CallSlotTimeout`] once `max_wait` has elapsed on
    /// the limiter's clock without a free slot.
    pub async fn acquire(&self, key: &str, command: &str, max_wait: Duration) -> Result<()> {
        if self.try_fast_path(key, command) {
            return Ok(());
        }

        let started = self.clock.now();
        let mut announced = false;

        loop {
            if self.try_admit(key, command) {
                if announced {
                    log::debug!("[namecheap] Call slot acquired for {command}");
                }
                return Ok(());
            }

            let waited = self.clock.now().saturating_duration_since(started);
            if waited >= max_wait {
                log::warn!(
                    "[namecheap] Gave up waiting for a call slot for {command} after {}ms",
                    waited.as_millis()
                );
                return Err(NamecheapError::CallSlotTimeout {
                    command: command.to_string(),
                    waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                });
            }

            if !announced {
                log::warn!("[namecheap] Call budget exhausted, waiting for a slot for {command}");
                announced = true;
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Calls currently logged for `key` (including not yet pruned ones).
    pub fn logged_calls(&self, key: &str) -> usize {
        self.lock().get(key).map_or(0, Vec::len)
    }

    /// Commands logged for `key`, oldest first.
    pub fn logged_commands(&self, key: &str) -> Vec<String> {
        self.lock()
            .get(key)
            .map(|entries| entries.iter().map(|e| e.command.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<CallEntry>>> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit without waiting while the whole log is smaller than the tightest cap and
    /// the previous reservation has already passed.
    fn try_fast_path(&self, key: &str, command: &str) -> bool {
        let now = self.clock.now();
        let mut logs = self.lock();
        let entries = logs.entry(key.to_string()).or_default();

        let previous_passed = entries.last().is_none_or(|entry| entry.at < now);

        if entries.len() < self.limits.tightest() && previous_passed {
            reserve(entries, now, command);
            return true;
        }
        false
    }

    fn try_admit(&self, key: &str, command: &str) -> bool {
        let now = self.clock.now();
        let mut logs = self.lock();
        let entries = logs.entry(key.to_string()).or_default();

        entries.retain(|entry| now.saturating_duration_since(entry.at) <= DAY);

        if entries.len() >= self.limits.per_day {
            return false;
        }
        if count_within(entries, now, HOUR) >= self.limits.per_hour {
            return false;
        }
        if count_within(entries, now, MINUTE) >= self.limits.per_minute {
            return false;
        }

        reserve(entries, now, command);
        true
    }
}

fn reserve(entries: &mut Vec<CallEntry>, now: Instant, command: &str) {
    entries.push(CallEntry {
        at: now.checked_add(RESERVATION).unwrap_or(now),
        command: command.to_string(),
    });
}

/// Entries no older than `window` (future reservations count as current).
fn count_within(entries: &[CallEntry], now: Instant, window: Duration) -> usize {
    entries
        .iter()
        .filter(|entry| now.saturating_duration_since(entry.at) <= window)
        .count()
}

/// Builder for [`RateLimiter`].
#[derive(Debug)]
pub struct RateLimiterBuilder {
    clock: Arc<dyn Clock>,
    limits: RateLimits,
    poll_interval: Duration,
}

impl Default for RateLimiterBuilder {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            limits: RateLimits::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RateLimiterBuilder {
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: RateLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn build(self) -> RateLimiter {
        RateLimiter {
            logs: Mutex::new(HashMap::new()),
            clock: self.clock,
            limits: self.limits,
            poll_interval: self.poll_interval,
        }
    }
}
