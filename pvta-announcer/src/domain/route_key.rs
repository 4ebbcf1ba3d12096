//! Route and direction composite key.

use std::fmt;

/// Error returned when parsing an invalid legacy route key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route key: {reason}")]
pub struct InvalidRouteKey {
    reason: &'static str,
}

/// A route travelling in one direction, identified by route id and headsign.
///
/// The same route number runs in two directions, so departures are tracked
/// per (route, headsign) pair. Both components are opaque text from the
/// feed; route ids for PVTA are numeric strings ("20030") and headsigns are
/// destination labels ("North Amherst").
///
/// # Examples
///
/// ```
/// use pvta_announcer::domain::RouteKey;
///
/// let key = RouteKey::new("20030", "North Amherst");
/// assert_eq!(key.route_id(), "20030");
/// assert_eq!(key.headsign(), "North Amherst");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    route_id: String,
    headsign: String,
}

impl RouteKey {
    /// Create a route key from its components.
    pub fn new(route_id: impl Into<String>, headsign: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            headsign: headsign.into(),
        }
    }

    /// Returns the route id.
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// Returns the headsign (destination label).
    pub fn headsign(&self) -> &str {
        &self.headsign
    }

    /// Render this key in the legacy snapshot-file form.
    ///
    /// Earlier snapshot files used the printed two-element array text of
    /// the key as a JSON object key: `["20030", "North Amherst"]`.
    pub fn legacy_key(&self) -> String {
        format!("[\"{}\", \"{}\"]", self.route_id, self.headsign)
    }

    /// Parse a key from the legacy snapshot-file form.
    ///
    /// The separator search runs right-to-left, so a headsign that itself
    /// contains `", "` parses the same way the legacy reader did.
    ///
    /// # Examples
    ///
    /// ```
    /// use pvta_announcer::domain::RouteKey;
    ///
    /// let key = RouteKey::parse_legacy_key(r#"["20030", "North Amherst"]"#).unwrap();
    /// assert_eq!(key, RouteKey::new("20030", "North Amherst"));
    ///
    /// assert!(RouteKey::parse_legacy_key("20030").is_err());
    /// ```
    pub fn parse_legacy_key(s: &str) -> Result<Self, InvalidRouteKey> {
        let inner = s.strip_prefix("[\"").ok_or(InvalidRouteKey {
            reason: "expected leading [\"",
        })?;
        let inner = inner.strip_suffix("\"]").ok_or(InvalidRouteKey {
            reason: "expected trailing \"]",
        })?;
        let (route_id, headsign) = inner.rsplit_once("\", \"").ok_or(InvalidRouteKey {
            reason: "expected two quoted elements",
        })?;
        Ok(RouteKey::new(route_id, headsign))
    }
}

impl fmt::Debug for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteKey({} -> {})", self.route_id, self.headsign)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Encode then parse returns the original key whenever neither
        /// component contains text that collides with the separator
        #[test]
        fn legacy_roundtrip(
            route_id in "[0-9]{1,6}",
            headsign in "[A-Za-z0-9 /.-]{0,30}",
        ) {
            let key = RouteKey::new(route_id, headsign);
            let parsed = RouteKey::parse_legacy_key(&key.legacy_key()).unwrap();
            prop_assert_eq!(parsed, key);
        }
    }
}
