//! PVTA InfoPoint departures client.
//!
//! This module provides an HTTP client for the InfoPoint REST API, which
//! publishes real-time bus departures per stop.
//!
//! Quirks of the feed worth knowing:
//! - Route and trip ids arrive as bare JSON integers or as strings
//!   depending on endpoint revision; both are normalized to strings
//! - Departure times are Microsoft-style JSON date strings
//!   (`/Date(1700000000000-0400)/`) whose millisecond part is always a
//!   whole second and whose offset is fixed to Eastern time
//! - Fields are omitted rather than sent as null

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{DepartureSource, InfoPointClient, InfoPointConfig};
pub use convert::{NormalizeError, normalize_stop};
pub use error::FetchError;
pub use mock::MockDepartureSource;
pub use types::{Departure, RawId, RouteDirection, StopDeparturesPayload, Trip};
