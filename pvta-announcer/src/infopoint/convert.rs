//! Conversion from InfoPoint DTOs to snapshot entries.
//!
//! This module turns one stop's raw payload into the canonical per-stop
//! departure map. Individual malformed records are logged and skipped so
//! one bad trip never costs the whole stop; only a payload with no usable
//! route list fails the stop outright.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{Interval, RouteDepartures, StopId, TripId};

use super::types::{Departure, RouteDirection, StopDeparturesPayload};

/// Error during payload to snapshot conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// The EDT field does not match the expected date pattern
    #[error("malformed EDT timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Convert a stop's fetched payload into its departure map.
///
/// `now` must be captured once per run and passed to every stop, so
/// intervals computed seconds apart cannot disagree about the minute.
///
/// Records missing a required field or carrying an unparseable EDT are
/// skipped with a warning; the error returned here means the payload as a
/// whole had no usable shape (no wrapping element, or no
/// `RouteDirections` key) and the stop should be left out of the snapshot.
pub fn normalize_stop(
    stop: &StopId,
    payload: &[StopDeparturesPayload],
    now: DateTime<Utc>,
) -> Result<RouteDepartures, NormalizeError> {
    let wrapper = payload
        .first()
        .ok_or(NormalizeError::MissingField("RouteDirections"))?;
    let route_directions = wrapper
        .route_directions
        .as_ref()
        .ok_or(NormalizeError::MissingField("RouteDirections"))?;

    let mut departures = RouteDepartures::new();
    for direction in route_directions {
        if let Err(e) = convert_route_direction(direction, now, &mut departures) {
            warn!(stop = %stop, error = %e, "skipping route direction");
        }
    }
    Ok(departures)
}

/// Convert one route direction, accumulating its usable trips.
fn convert_route_direction(
    direction: &RouteDirection,
    now: DateTime<Utc>,
    out: &mut RouteDepartures,
) -> Result<(), NormalizeError> {
    let route_id = direction
        .route_id
        .as_ref()
        .ok_or(NormalizeError::MissingField("RouteId"))?
        .to_string();
    let departures = direction
        .departures
        .as_ref()
        .ok_or(NormalizeError::MissingField("Departures"))?;

    for departure in departures {
        match convert_departure(departure, now) {
            Ok((headsign, trip_id, interval)) => {
                let key = crate::domain::RouteKey::new(route_id.clone(), headsign);
                out.entry(key).or_default().insert(trip_id, interval);
            }
            Err(e) => {
                warn!(route_id = %route_id, error = %e, "skipping departure");
            }
        }
    }
    Ok(())
}

/// Convert one departure record to (headsign, trip, interval).
fn convert_departure(
    departure: &Departure,
    now: DateTime<Utc>,
) -> Result<(String, TripId, Interval), NormalizeError> {
    let trip = departure
        .trip
        .as_ref()
        .ok_or(NormalizeError::MissingField("Trip"))?;
    let headsign = trip
        .internet_service_desc
        .clone()
        .ok_or(NormalizeError::MissingField("InternetServiceDesc"))?;
    let trip_id = trip
        .trip_id
        .as_ref()
        .ok_or(NormalizeError::MissingField("TripId"))?;
    let trip_id =
        TripId::new(trip_id.to_string()).map_err(|_| NormalizeError::MissingField("TripId"))?;

    let edt = departure
        .edt
        .as_deref()
        .ok_or(NormalizeError::MissingField("EDT"))?;
    let departure_epoch = parse_edt(edt)?;
    let interval = Interval::from_epoch_seconds(departure_epoch, now.timestamp());

    Ok((headsign, trip_id, interval))
}

/// Parse an InfoPoint EDT string into epoch seconds.
///
/// The feed encodes times as Microsoft-style JSON dates:
/// `/Date(1700000000000-0400)/`. The digits are epoch milliseconds, but
/// always a whole second padded with `000`, and the offset suffix is
/// `-0400` or `-0500` depending on daylight saving. Padding and offset are
/// validated and then discarded; the epoch is returned in seconds.
fn parse_edt(raw: &str) -> Result<i64, NormalizeError> {
    let malformed = || NormalizeError::MalformedTimestamp(raw.to_string());

    let body = raw.strip_prefix("/Date(").ok_or_else(malformed)?;
    let body = body.strip_suffix(")/").ok_or_else(malformed)?;

    let millis = body
        .strip_suffix("-0400")
        .or_else(|| body.strip_suffix("-0500"))
        .ok_or_else(malformed)?;

    let seconds = millis.strip_suffix("000").ok_or_else(malformed)?;
    if seconds.is_empty() || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    seconds.parse::<i64>().map_err(|_| malformed())
}
