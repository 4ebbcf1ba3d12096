//! Trip identifier type.

use std::fmt;

/// Error returned when constructing an invalid trip id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trip id: {reason}")]
pub struct InvalidTripId {
    reason: &'static str,
}

/// A trip identifier from the InfoPoint feed.
///
/// Trip ids are opaque and only meaningful within a single run; the feed
/// reuses them across days. They arrive as strings or bare integers
/// upstream and are always held here in string form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId(String);

impl TripId {
    /// Create a new trip id from a string.
    ///
    /// Returns an error if the string is empty or whitespace-only.
    pub fn new(s: String) -> Result<Self, InvalidTripId> {
        if s.trim().is_empty() {
            return Err(InvalidTripId {
                reason: "trip id cannot be blank",
            });
        }
        Ok(TripId(s))
    }

    /// Returns the trip id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the TripId and returns the inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TripId({})", self.0)
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
