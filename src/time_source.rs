//! Time source abstraction for supporting both real and manually driven time.
//!
//! The session uses a `TimeSource` to stamp heading samples and to measure the
//! grace window before the fallback simulator takes over. Production code uses
//! `RealTimeSource`; tests drive a `ManualTimeSource` forward explicitly so the
//! grace-window logic can be checked without waiting on the wall clock.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Time that only moves when told to.
pub struct ManualTimeSource {
    current: Mutex<DateTime<Local>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: StdDuration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += to_chrono(duration);
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new(Local::now())
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Convert a std duration to chrono, saturating on overflow.
pub fn to_chrono(duration: StdDuration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX)
}

/// Elapsed time between two instants, zero if `later` precedes `earlier`.
pub fn elapsed_between(earlier: DateTime<Local>, later: DateTime<Local>) -> StdDuration {
    (later - earlier).to_std().unwrap_or(StdDuration::ZERO)
}
