//! Single-slot snapshot persistence.
//!
//! The store keeps exactly one snapshot on disk, the baseline for the next
//! run's crossing detection. Saves fully replace the file; there is no
//! history and no merging.
//!
//! Two on-disk formats are understood on read. The current format spells
//! the route key out as two fields:
//!
//! ```json
//! {"stops": {"71": [{"route": "20030",
//!                    "headsign": "North Amherst",
//!                    "trips": {"4117": 5}}]}}
//! ```
//!
//! Older state files keyed routes by the printed array text
//! `["20030", "North Amherst"]`; those still load, so an upgrade does not
//! lose the baseline. Saves always write the current format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Interval, RouteKey, Snapshot, StopId, TripId};

/// Errors from snapshot persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the state file failed
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State file exists but is not a parseable snapshot
    #[error("corrupt state file: {message}")]
    CorruptState { message: String },
}

/// Current on-disk document.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    stops: BTreeMap<String, Vec<RouteEntry>>,
}

/// One route direction's trips within a stop.
#[derive(Debug, Serialize, Deserialize)]
struct RouteEntry {
    route: String,
    headsign: String,
    trips: BTreeMap<String, i64>,
}

/// Legacy on-disk document: route keys as printed array text.
type LegacyFile = BTreeMap<String, BTreeMap<String, BTreeMap<String, i64>>>;

/// File-backed store for the last run's snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the given file path.
    ///
    /// The file need not exist yet; a missing file loads as an empty
    /// snapshot.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot.
    ///
    /// A missing file is the first run and yields an empty snapshot. A
    /// present file that parses as neither the current nor the legacy
    /// format fails with [`StoreError::CorruptState`]; callers running on
    /// a schedule should treat that as an empty baseline rather than
    /// aborting.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Snapshot::new()),
            Err(e) => return Err(e.into()),
        };

        if let Ok(file) = serde_json::from_str::<StateFile>(&text) {
            return from_state_file(file);
        }

        match serde_json::from_str::<LegacyFile>(&text) {
            Ok(file) => from_legacy_file(file),
            Err(e) => Err(StoreError::CorruptState {
                message: e.to_string(),
            }),
        }
    }

    /// Persist a snapshot, fully replacing any prior contents.
    ///
    /// Writes to a sibling temp file and renames it into place, so a run
    /// killed mid-write cannot leave a truncated baseline behind.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let file = to_state_file(snapshot);
        let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::CorruptState {
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn to_state_file(snapshot: &Snapshot) -> StateFile {
    let mut stops = BTreeMap::new();
    for (stop, routes) in snapshot.iter() {
        let entries: Vec<RouteEntry> = routes
            .iter()
            .map(|(route, trips)| RouteEntry {
                route: route.route_id().to_string(),
                headsign: route.headsign().to_string(),
                trips: trips
                    .iter()
                    .map(|(trip, interval)| (trip.as_str().to_string(), interval.minutes()))
                    .collect(),
            })
            .collect();
        stops.insert(stop.as_str().to_string(), entries);
    }
    StateFile { stops }
}

fn from_state_file(file: StateFile) -> Result<Snapshot, StoreError> {
    let mut snapshot = Snapshot::new();
    for (stop, entries) in file.stops {
        let stop = parse_stop(stop)?;
        let mut routes = crate::domain::RouteDepartures::new();
        for entry in entries {
            let key = RouteKey::new(entry.route, entry.headsign);
            let trips = routes.entry(key).or_default();
            for (trip, minutes) in entry.trips {
                trips.insert(parse_trip(trip)?, Interval::from_minutes(minutes));
            }
        }
        snapshot.insert_stop(stop, routes);
    }
    Ok(snapshot)
}

fn from_legacy_file(file: LegacyFile) -> Result<Snapshot, StoreError> {
    let mut snapshot = Snapshot::new();
    for (stop, routes) in file {
        let stop = parse_stop(stop)?;
        let mut departures = crate::domain::RouteDepartures::new();
        for (key_text, trips) in routes {
            let key =
                RouteKey::parse_legacy_key(&key_text).map_err(|e| StoreError::CorruptState {
                    message: format!("route key {key_text:?}: {e}"),
                })?;
            let entry = departures.entry(key).or_default();
            for (trip, minutes) in trips {
                entry.insert(parse_trip(trip)?, Interval::from_minutes(minutes));
            }
        }
        snapshot.insert_stop(stop, departures);
    }
    Ok(snapshot)
}

fn parse_stop(s: String) -> Result<StopId, StoreError> {
    StopId::new(s).map_err(|e| StoreError::CorruptState {
        message: e.to_string(),
    })
}

fn parse_trip(s: String) -> Result<TripId, StoreError> {
    TripId::new(s).map_err(|e| StoreError::CorruptState {
        message: e.to_string(),
    })
}
