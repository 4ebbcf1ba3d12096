//! Threshold-crossing detection between consecutive snapshots.
//!
//! The announcer's core question is "which trips just became due?". A trip
//! is due when its countdown moves from above the configured threshold to
//! at-or-below it between two runs. Absolute state never triggers an
//! announcement; only the transition does, which is what keeps a bus
//! sitting at 3 minutes out from being announced every single minute.

use crate::domain::{AnnouncementEvent, Interval, Snapshot};

/// Find every trip whose countdown crossed the threshold between runs.
///
/// For each (stop, route, trip) in `old`, the trip emits an event iff its
/// old interval was strictly above `threshold` and its new interval is at
/// or below it. The event carries the new interval.
///
/// Consequences of the rule, all deliberate:
/// - a trip at exactly the threshold last run never emits, whatever it
///   does next (it already had its chance to cross)
/// - a trip that vanished from the new snapshot never emits, however
///   close it was (it departed, or the feed dropped it)
/// - a trip seen for the first time never emits (no baseline to cross
///   from)
///
/// Result order follows snapshot iteration order but callers should treat
/// it as unordered.
pub fn crossings(old: &Snapshot, new: &Snapshot, threshold: Interval) -> Vec<AnnouncementEvent> {
    let mut events = Vec::new();
    for (stop, routes) in old.iter() {
        for (route, trips) in routes {
            for (trip, old_interval) in trips {
                let Some(new_interval) = new.interval(stop, route, trip) else {
                    continue;
                };
                if *old_interval > threshold && new_interval <= threshold {
                    events.push(AnnouncementEvent {
                        stop: stop.clone(),
                        route: route.clone(),
                        interval: new_interval,
                    });
                }
            }
        }
    }
    events
}

/// Reduce a snapshot to the soonest departure per (stop, route).
///
/// Used by announce-all mode: one event per route direction currently in
/// the feed, carrying the minimum interval across its trips. The previous
/// snapshot plays no part. Route directions with no trips emit nothing.
pub fn soonest_departures(snapshot: &Snapshot) -> Vec<AnnouncementEvent> {
    let mut events = Vec::new();
    for (stop, routes) in snapshot.iter() {
        for (route, trips) in routes {
            let Some(soonest) = trips.values().min() else {
                continue;
            };
            events.push(AnnouncementEvent {
                stop: stop.clone(),
                route: route.clone(),
                interval: *soonest,
            });
        }
    }
    events
}
