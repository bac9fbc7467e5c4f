//! Time abstraction for deterministic evaluation.
//!
//! The evaluator never reads a clock. Callers take one reading from a
//! [`Clock`] per batch and pass it down as `now`.
//!
//! # Example
//!
//! ```
//! use chrono::TimeDelta;
//! use mailrules_core::time::{Clock, MockClock};
//!
//! let clock = MockClock::epoch();
//! let start = clock.now();
//! clock.advance(TimeDelta::days(2));
//! assert_eq!(clock.now() - start, TimeDelta::days(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over wall-clock time.
///
/// In production, use [`SystemClock`]. In tests, use [`MockClock`] to pin
/// `now` to a known instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock that uses real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a base instant that only moves when told to.
#[derive(Debug)]
pub struct MockClock {
    /// Base instant.
    base: DateTime<Utc>,
    /// Offset from base in milliseconds.
    offset_millis: AtomicI64,
}

impl MockClock {
    /// Creates a mock clock starting at `base`.
    #[must_use]
    pub const fn at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            offset_millis: AtomicI64::new(0),
        }
    }

    /// Creates a mock clock starting at the Unix epoch.
    #[must_use]
    pub const fn epoch() -> Self {
        Self::at(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Creates a mock clock that can be shared across threads.
    #[must_use]
    pub fn shared(base: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self::at(base))
    }

    /// Advances the clock by the given delta.
    pub fn advance(&self, delta: TimeDelta) {
        self.offset_millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    /// Resets the clock to the base instant.
    pub fn reset(&self) {
        self.offset_millis.store(0, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + TimeDelta::milliseconds(self.offset_millis.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        self.as_ref().now()
    }
}
