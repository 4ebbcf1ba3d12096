//! InfoPoint API response DTOs.
//!
//! These types map directly to the InfoPoint `stopdepartures` JSON
//! responses. They use `Option` liberally because the feed omits fields
//! rather than sending null values in many cases; required-field checks
//! happen during conversion, not deserialization, so one malformed record
//! cannot fail the whole payload.

use std::fmt;

use serde::Deserialize;

/// One element of the top-level response array for a stop.
///
/// The endpoint wraps the per-stop payload in a one-element array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopDeparturesPayload {
    /// Stop the payload describes. Echoes the id in the request URL.
    pub stop_id: Option<RawId>,

    /// Departures grouped by route and direction.
    pub route_directions: Option<Vec<RouteDirection>>,
}

/// Departures for one route travelling in one direction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteDirection {
    /// Route identifier.
    pub route_id: Option<RawId>,

    /// Upcoming departures for this route direction, soonest first.
    pub departures: Option<Vec<Departure>>,
}

/// One upcoming departure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Departure {
    /// Estimated departure time, as a Microsoft-style JSON date string.
    #[serde(rename = "EDT")]
    pub edt: Option<String>,

    /// Scheduled departure time, same encoding.
    #[serde(rename = "SDT")]
    pub sdt: Option<String>,

    /// The trip making this departure.
    pub trip: Option<Trip>,
}

/// Trip details attached to a departure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trip {
    /// Destination label shown on the vehicle headsign.
    pub internet_service_desc: Option<String>,

    /// Trip identifier, unique within a route direction for one day.
    pub trip_id: Option<RawId>,
}

/// An identifier that the feed sends as either a JSON string or a bare
/// integer, depending on endpoint revision.
///
/// Both forms normalize to the decimal string via `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{n}"),
        }
    }
}
