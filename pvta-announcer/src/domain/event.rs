//! Announcement event produced by the detector.

use std::fmt;

use super::{Interval, RouteKey, StopId};

/// One departure that should be announced.
///
/// Carries everything the announcer needs to speak: which route, where it
/// is headed, which stop it leaves from, and how many minutes remain. The
/// interval is always the one from the newest snapshot.
///
/// Events are consumed once and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnouncementEvent {
    /// Stop the departure leaves from.
    pub stop: StopId,
    /// Route and direction of the departure.
    pub route: RouteKey,
    /// Minutes until the departure.
    pub interval: Interval,
}

impl fmt::Display for AnnouncementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "route {} toward {} leaving stop {} in {}",
            self.route.route_id(),
            self.route.headsign(),
            self.stop,
            self.interval
        )
    }
}
