//! Explicit time values.
//!
//! The engine never reads the wall clock. Callers pass `now` into every
//! operation as a [`Timestamp`], which makes every result replayable.

use serde::{Deserialize, Serialize};

/// Milliseconds per second.
pub const MILLIS_PER_SECOND: i64 = 1000;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// A point in time, in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Create a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Create a timestamp from whole seconds since the epoch.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * MILLIS_PER_SECOND)
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// This timestamp shifted forward by whole seconds, saturating at the far future.
    #[must_use]
    pub fn plus_secs(self, secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(secs.saturating_mul(MILLIS_PER_SECOND)))
    }

    /// This timestamp shifted forward by whole seconds, `None` if out of range.
    #[must_use]
    pub fn checked_plus_secs(self, secs: u64) -> Option<Self> {
        i64::try_from(secs)
            .ok()
            .and_then(|secs| secs.checked_mul(MILLIS_PER_SECOND))
            .and_then(|millis| self.0.checked_add(millis))
            .map(Self)
    }

    /// Seconds elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[must_use]
    pub fn secs_since(self, earlier: Self) -> f64 {
        if self.0 <= earlier.0 {
            0.0
        } else {
            (self.0 - earlier.0) as f64 / MILLIS_PER_SECOND as f64
        }
    }

    /// Whole milliseconds elapsed from `earlier` to `self`, zero if negative.
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> i64 {
        if self.0 <= earlier.0 {
            0
        } else {
            self.0 - earlier.0
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_secs() {
        let t = Timestamp::from_secs(10);
        assert_eq!(t.plus_secs(5), Timestamp::from_millis(15_000));
    }

    #[test]
    fn test_plus_secs_saturates_on_huge_durations() {
        let t = Timestamp::from_secs(10);
        assert_eq!(t.plus_secs(u64::MAX), Timestamp::from_millis(i64::MAX));
        assert_eq!(t.plus_secs(i64::MAX as u64 + 1), Timestamp::from_millis(i64::MAX));
        assert!(t.plus_secs(u64::MAX) > t);
    }

    #[test]
    fn test_checked_plus_secs() {
        let t = Timestamp::from_secs(10);
        assert_eq!(t.checked_plus_secs(5), Some(Timestamp::from_secs(15)));
        assert_eq!(t.checked_plus_secs(u64::MAX), None);
        assert_eq!(t.checked_plus_secs(i64::MAX as u64 / 1000), None);
    }

    #[test]
    fn test_secs_since_never_negative() {
        let early = Timestamp::from_secs(10);
        let late = Timestamp::from_millis(12_500);
        assert!((late.secs_since(early) - 2.5).abs() < f64::EPSILON);
        assert_eq!(early.secs_since(late), 0.0);
        assert_eq!(early.millis_since(late), 0);
    }
}
