//! Domain types for the departure announcer.
//!
//! This module contains the core model types shared by the fetcher, the
//! detector and the announcer. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod event;
mod interval;
mod route_key;
mod snapshot;
mod stop;
mod trip;

pub use event::AnnouncementEvent;
pub use interval::Interval;
pub use route_key::{InvalidRouteKey, RouteKey};
pub use snapshot::{RouteDepartures, Snapshot, TripIntervals};
pub use stop::{InvalidStopId, StopId};
pub use trip::{InvalidTripId, TripId};
