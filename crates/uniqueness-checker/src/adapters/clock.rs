//! Clock adapters
//!
//! `SystemClock` for production, `ManualClock` for deterministic tests, and
//! `MonotonicClock` which the checker wraps around whichever it is given.

use crate::ports::outbound::Clock;
use parking_lot::Mutex;
use shared_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Wall clock in milliseconds since UNIX epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Settable clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: AtomicU64,
}

impl ManualClock {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

/// Never returns a timestamp smaller than one it has already returned.
///
/// Wall-clock regressions (NTP steps, VM migration) are absorbed by repeating
/// the last value until the source catches up.
pub struct MonotonicClock {
    source: Arc<dyn Clock>,
    last: Mutex<Timestamp>,
}

impl MonotonicClock {
    pub fn new(source: Arc<dyn Clock>) -> Self {
        Self {
            source,
            last: Mutex::new(0),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let mut last = self.last.lock();
        let now = self.source.now().max(*last);
        *last = now;
        now
    }
}
