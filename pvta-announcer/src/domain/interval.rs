//! Minutes-until-departure type.

use std::fmt;

/// Whole minutes until a departure.
///
/// Intervals are computed from epoch seconds by floor division, so a
/// departure 30 seconds away is 0 minutes out and a departure 30 seconds
/// gone is -1. Negative values mean the trip has already left (or the
/// feed is running behind).
///
/// # Examples
///
/// ```
/// use pvta_announcer::domain::Interval;
///
/// // 5 minutes before departure
/// assert_eq!(Interval::from_epoch_seconds(1_700_000_000, 1_700_000_000 - 300).minutes(), 5);
///
/// // Exactly at departure
/// assert_eq!(Interval::from_epoch_seconds(1_700_000_000, 1_700_000_000).minutes(), 0);
///
/// // One second past departure already counts as a minute gone
/// assert_eq!(Interval::from_epoch_seconds(1_700_000_000, 1_700_000_001).minutes(), -1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval(i64);

impl Interval {
    /// Create an interval from a whole number of minutes.
    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes)
    }

    /// Compute the interval between a departure time and "now", both in
    /// epoch seconds.
    ///
    /// Uses floor division, so partial minutes round down and departures
    /// in the past go negative rather than truncating towards zero.
    pub fn from_epoch_seconds(departure: i64, now: i64) -> Self {
        Self((departure - now).div_euclid(60))
    }

    /// Returns the number of minutes.
    pub fn minutes(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interval({})", self.0)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}
