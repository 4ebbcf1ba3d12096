//! Transit stop identifier type.

use std::fmt;

/// Error returned when constructing an invalid stop id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// An InfoPoint stop identifier.
///
/// Stop ids are opaque identifiers assigned by the transit agency; for PVTA
/// they happen to be short numeric strings ("71"), but nothing here depends
/// on that. The only validation is that they must contain something other
/// than whitespace.
///
/// # Examples
///
/// ```
/// use pvta_announcer::domain::StopId;
///
/// let stop = StopId::new("71".to_string()).unwrap();
/// assert_eq!(stop.as_str(), "71");
///
/// // Empty and blank strings are rejected
/// assert!(StopId::new("".to_string()).is_err());
/// assert!(StopId::new("   ".to_string()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(String);

impl StopId {
    /// Create a new stop id from a string.
    ///
    /// Returns an error if the string is empty or whitespace-only.
    pub fn new(s: String) -> Result<Self, InvalidStopId> {
        if s.trim().is_empty() {
            return Err(InvalidStopId {
                reason: "stop id cannot be blank",
            });
        }
        Ok(StopId(s))
    }

    /// Returns the stop id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the StopId and returns the inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
