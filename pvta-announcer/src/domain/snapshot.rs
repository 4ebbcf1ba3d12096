//! Point-in-time view of tracked departures.

use std::collections::BTreeMap;

use super::{Interval, RouteKey, StopId, TripId};

/// Departure intervals for the trips of one route direction.
pub type TripIntervals = BTreeMap<TripId, Interval>;

/// All tracked departures at one stop, keyed by route direction.
pub type RouteDepartures = BTreeMap<RouteKey, TripIntervals>;

/// The complete set of tracked departures at one point in time.
///
/// A snapshot nests stop -> route direction -> trip -> interval. One is
/// built fresh from the feed on every run and compared against the
/// previous run's snapshot to find threshold crossings.
///
/// Ordered maps keep iteration and the persisted file deterministic, so
/// two runs over the same data produce identical state files.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    stops: BTreeMap<StopId, RouteDepartures>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no stops are tracked.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Number of stops tracked, including stops with no departures.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Total number of trips across all stops and routes.
    pub fn trip_count(&self) -> usize {
        self.stops
            .values()
            .flat_map(|routes| routes.values())
            .map(|trips| trips.len())
            .sum()
    }

    /// Replace the departures tracked for a stop.
    ///
    /// A stop with an empty `RouteDepartures` map is still tracked: the
    /// feed answered for it and reported nothing departing.
    pub fn insert_stop(&mut self, stop: StopId, departures: RouteDepartures) {
        self.stops.insert(stop, departures);
    }

    /// Record a single trip's interval.
    pub fn record(&mut self, stop: StopId, route: RouteKey, trip: TripId, interval: Interval) {
        self.stops
            .entry(stop)
            .or_default()
            .entry(route)
            .or_default()
            .insert(trip, interval);
    }

    /// Departures tracked at a stop, if the stop is present at all.
    pub fn stop(&self, stop: &StopId) -> Option<&RouteDepartures> {
        self.stops.get(stop)
    }

    /// Look up one trip's interval.
    pub fn interval(&self, stop: &StopId, route: &RouteKey, trip: &TripId) -> Option<Interval> {
        self.stops
            .get(stop)
            .and_then(|routes| routes.get(route))
            .and_then(|trips| trips.get(trip))
            .copied()
    }

    /// Iterate over stops and their departures in stop order.
    pub fn iter(&self) -> impl Iterator<Item = (&StopId, &RouteDepartures)> {
        self.stops.iter()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.stops.iter()).finish()
    }
}
