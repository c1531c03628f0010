//! Time source abstraction.
//!
//! The ledger never advances time itself. It asks a [`Clock`] once per
//! command and derives every round phase from that reading.

use chrono::{DateTime, Utc};

/// Supplies the current time to the ledger.
pub trait Clock: Send + Sync {
    /// Current wall-clock time. Must never go backwards.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests. **Never use in production.**
///
/// Clones share the same reading, so a test can hand one clone to the ledger
/// and keep another to move time forward.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: std::sync::Arc<std::sync::atomic::AtomicI64>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ManualClock {
    /// Start at the given unix timestamp (seconds).
    pub fn at_unix(secs: i64) -> Self {
        Self {
            current: std::sync::Arc::new(std::sync::atomic::AtomicI64::new(secs)),
        }
    }

    /// Start at 2024-01-01 00:00:00 UTC.
    pub fn default_time() -> Self {
        Self::at_unix(1_704_067_200)
    }

    /// Current reading as a unix timestamp.
    pub fn unix(&self) -> i64 {
        self.current.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Jump to a specific timestamp. Callers keep it non-decreasing.
    pub fn set_unix(&self, secs: i64) {
        self.current
            .store(secs, std::sync::atomic::Ordering::SeqCst);
    }

    /// Move time forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.current
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::default_time()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.unix(), 0).unwrap_or_default()
    }
}
