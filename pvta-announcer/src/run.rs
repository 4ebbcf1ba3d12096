//! One scheduled invocation, end to end.
//!
//! The scheduler calls this once a minute; everything here is a single
//! pass with no internal concurrency. Stops are fetched sequentially,
//! events announced sequentially, and one "now" is captured up front so
//! every interval in the run is computed against the same instant.

use chrono::Utc;
use tracing::{info, warn};

use crate::announce::{Announcer, CueSink};
use crate::config::RunConfig;
use crate::detect::{crossings, soonest_departures};
use crate::domain::Snapshot;
use crate::infopoint::{DepartureSource, normalize_stop};
use crate::store::{SnapshotStore, StoreError};

/// Errors that abort a run outright.
///
/// Almost nothing does: bad upstream records, failed stops, a corrupt
/// baseline and failed announcements are all logged and survived. What
/// remains is failing to persist the new baseline, which would make the
/// next run re-announce everything.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The snapshot store failed in a non-recoverable way
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one run did, for the scheduler's logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Stops successfully fetched and normalized
    pub stops_fetched: usize,
    /// Stops omitted because fetch or normalization failed
    pub stops_failed: usize,
    /// Events the detector produced
    pub events_detected: usize,
    /// Events actually rendered as audio
    pub events_announced: usize,
}

/// One full cycle: load baseline, fetch, detect crossings, announce,
/// persist.
///
/// A stop whose fetch or normalization fails is left out of detection;
/// at persist time its previous baseline fragment is carried forward
/// unchanged, so a transient upstream failure neither fabricates
/// "departed" trips now nor erases the baseline that detection needs
/// once the feed recovers. A stop that fetched successfully fully
/// replaces its old fragment.
pub async fn run_once(
    config: &RunConfig,
    source: &impl DepartureSource,
    announcer: &Announcer<impl CueSink>,
    store: &SnapshotStore,
) -> Result<RunSummary, RunError> {
    let old = load_baseline(store)?;
    let new = fetch_snapshot(config, source).await;

    let events = crossings(&old, &new, config.threshold);
    let mut summary = RunSummary {
        stops_fetched: new.stop_count(),
        stops_failed: config.stops.len() - new.stop_count(),
        events_detected: events.len(),
        ..Default::default()
    };

    for event in &events {
        match announcer.announce(event).await {
            Ok(()) => summary.events_announced += 1,
            Err(e) => warn!(%event, error = %e, "announcement failed"),
        }
    }

    // Carry the old fragment forward for stops that produced no data this
    // run, then persist as the next run's baseline
    let mut to_save = new;
    for stop in &config.stops {
        if to_save.stop(stop).is_none() {
            if let Some(fragment) = old.stop(stop) {
                to_save.insert_stop(stop.clone(), fragment.clone());
            }
        }
    }
    store.save(&to_save)?;

    info!(
        stops_fetched = summary.stops_fetched,
        stops_failed = summary.stops_failed,
        events_detected = summary.events_detected,
        events_announced = summary.events_announced,
        "run complete"
    );
    Ok(summary)
}

/// Announce the soonest departure for every route direction currently in
/// the feed.
///
/// A read-only broadcast: the persisted baseline is left untouched, so
/// running this between scheduled runs cannot shift crossing detection.
pub async fn run_announce_all(
    config: &RunConfig,
    source: &impl DepartureSource,
    announcer: &Announcer<impl CueSink>,
) -> Result<RunSummary, RunError> {
    let snapshot = fetch_snapshot(config, source).await;
    let events = soonest_departures(&snapshot);

    let mut summary = RunSummary {
        stops_fetched: snapshot.stop_count(),
        stops_failed: config.stops.len() - snapshot.stop_count(),
        events_detected: events.len(),
        ..Default::default()
    };

    for event in &events {
        match announcer.announce(event).await {
            Ok(()) => summary.events_announced += 1,
            Err(e) => warn!(%event, error = %e, "announcement failed"),
        }
    }
    Ok(summary)
}

/// Load the previous run's snapshot, degrading a corrupt file to an empty
/// baseline. Losing one run's detections beats crashing the scheduled job
/// until someone deletes the file by hand.
fn load_baseline(store: &SnapshotStore) -> Result<Snapshot, RunError> {
    match store.load() {
        Ok(snapshot) => Ok(snapshot),
        Err(StoreError::CorruptState { message }) => {
            warn!(%message, "corrupt state file, starting from an empty baseline");
            Ok(Snapshot::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Fetch and normalize every configured stop, capturing "now" once.
async fn fetch_snapshot(config: &RunConfig, source: &impl DepartureSource) -> Snapshot {
    let now = Utc::now();
    let mut snapshot = Snapshot::new();
    for stop in &config.stops {
        let payload = match source.stop_departures(stop).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%stop, error = %e, "fetch failed, omitting stop this run");
                continue;
            }
        };
        match normalize_stop(stop, &payload, now) {
            Ok(departures) => snapshot.insert_stop(stop.clone(), departures),
            Err(e) => warn!(%stop, error = %e, "unusable payload, omitting stop this run"),
        }
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::announce::{AnnounceError, MissingLog};
    use crate::config::RunConfig;
    use crate::domain::{Interval, RouteKey, StopId, TripId};
    use crate::infopoint::MockDepartureSource;

    /// Sink that records spoken text and never touches audio hardware.
    #[derive(Default)]
    struct SilentSink {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CueSink for SilentSink {
        async fn play_clip(&self, _path: &Path) -> Result<(), AnnounceError> {
            Ok(())
        }

        async fn speak(&self, text: &str) -> Result<(), AnnounceError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: RunConfig,
        announcer: Announcer<SilentSink>,
        store: SnapshotStore,
    }

    fn fixture(stops: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            stops: stops
                .iter()
                .map(|s| StopId::new(s.to_string()).unwrap())
                .collect(),
            ..RunConfig::default()
        };
        let announcer = Announcer::new(
            SilentSink::default(),
            dir.path().join("voice"),
            MissingLog::new(dir.path().join("missing_messages.log")),
        )
        .with_event_gap(Duration::ZERO);
        let store = SnapshotStore::new(dir.path().join("cached_departures.json"));
        Fixture {
            _dir: dir,
            config,
            announcer,
            store,
        }
    }

    fn stop(s: &str) -> StopId {
        StopId::new(s.to_string()).unwrap()
    }

    fn trip(s: &str) -> TripId {
        TripId::new(s.to_string()).unwrap()
    }

    /// Payload with one departure leaving `minutes` from now.
    ///
    /// The extra half minute keeps the floored interval stable even when
    /// the clock ticks between building the payload and the run capturing
    /// its own "now".
    fn payload_leaving_in(minutes: i64) -> String {
        let epoch = Utc::now().timestamp() + minutes * 60 + 30;
        format!(
            r#"[{{"RouteDirections": [{{"RouteId": 20030, "Departures": [
                {{"EDT": "/Date({epoch}000-0400)/",
                  "Trip": {{"InternetServiceDesc": "North Amherst", "TripId": 4117}}}}
            ]}}]}}]"#
        )
    }

    fn baseline_with_trip(store: &SnapshotStore, stop_id: &str, minutes: i64) {
        let mut old = Snapshot::new();
        old.record(
            stop(stop_id),
            RouteKey::new("20030", "North Amherst"),
            trip("4117"),
            Interval::from_minutes(minutes),
        );
        store.save(&old).unwrap();
    }

    #[tokio::test]
    async fn crossing_is_announced_and_new_snapshot_persisted() {
        let fx = fixture(&["71"]);
        baseline_with_trip(&fx.store, "71", 8);
        let source = MockDepartureSource::new().with_json(stop("71"), &payload_leaving_in(2));

        let summary = run_once(&fx.config, &source, &fx.announcer, &fx.store)
            .await
            .unwrap();

        assert_eq!(summary.stops_fetched, 1);
        assert_eq!(summary.events_detected, 1);
        assert_eq!(summary.events_announced, 1);

        let spoken = fx.announcer.sink().spoken.lock().unwrap().clone();
        assert!(spoken.contains(&"North Amherst".to_string()));
        assert!(spoken.contains(&"in 2 minutes".to_string()));

        // The persisted baseline now carries the new interval
        let saved = fx.store.load().unwrap();
        assert_eq!(
            saved.interval(
                &stop("71"),
                &RouteKey::new("20030", "North Amherst"),
                &trip("4117")
            ),
            Some(Interval::from_minutes(2))
        );
    }

    #[tokio::test]
    async fn first_run_announces_nothing_but_seeds_the_baseline() {
        let fx = fixture(&["71"]);
        let source = MockDepartureSource::new().with_json(stop("71"), &payload_leaving_in(2));

        let summary = run_once(&fx.config, &source, &fx.announcer, &fx.store)
            .await
            .unwrap();

        assert_eq!(summary.events_detected, 0);
        assert_eq!(fx.store.load().unwrap().trip_count(), 1);
    }

    #[tokio::test]
    async fn no_crossing_no_announcement() {
        let fx = fixture(&["71"]);
        baseline_with_trip(&fx.store, "71", 20);
        let source = MockDepartureSource::new().with_json(stop("71"), &payload_leaving_in(12));

        let summary = run_once(&fx.config, &source, &fx.announcer, &fx.store)
            .await
            .unwrap();

        assert_eq!(summary.events_detected, 0);
        assert!(fx.announcer.sink().spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_stop_keeps_its_old_baseline_fragment() {
        let fx = fixture(&["71", "72"]);
        let mut old = Snapshot::new();
        for s in ["71", "72"] {
            old.record(
                stop(s),
                RouteKey::new("20030", "North Amherst"),
                trip("4117"),
                Interval::from_minutes(8),
            );
        }
        fx.store.save(&old).unwrap();

        let source = MockDepartureSource::new()
            .with_json(stop("71"), &payload_leaving_in(6))
            .with_failure(stop("72"));

        let summary = run_once(&fx.config, &source, &fx.announcer, &fx.store)
            .await
            .unwrap();
        assert_eq!(summary.stops_fetched, 1);
        assert_eq!(summary.stops_failed, 1);
        // No event: the failed stop is absent from detection, not "all
        // departed"
        assert_eq!(summary.events_detected, 0);

        let saved = fx.store.load().unwrap();
        // Stop 71 replaced wholesale, stop 72 carried forward
        assert_eq!(
            saved.interval(
                &stop("71"),
                &RouteKey::new("20030", "North Amherst"),
                &trip("4117")
            ),
            Some(Interval::from_minutes(6))
        );
        assert_eq!(
            saved.interval(
                &stop("72"),
                &RouteKey::new("20030", "North Amherst"),
                &trip("4117")
            ),
            Some(Interval::from_minutes(8))
        );
    }

    #[tokio::test]
    async fn detection_resumes_after_recovery() {
        // Run 1: stop fails, baseline carried. Run 2: feed recovers with
        // the trip now inside the threshold; the crossing still fires.
        let fx = fixture(&["71"]);
        baseline_with_trip(&fx.store, "71", 8);

        let failing = MockDepartureSource::new().with_failure(stop("71"));
        run_once(&fx.config, &failing, &fx.announcer, &fx.store)
            .await
            .unwrap();

        let recovered = MockDepartureSource::new().with_json(stop("71"), &payload_leaving_in(3));
        let summary = run_once(&fx.config, &recovered, &fx.announcer, &fx.store)
            .await
            .unwrap();
        assert_eq!(summary.events_detected, 1);
        assert_eq!(summary.events_announced, 1);
    }

    #[tokio::test]
    async fn corrupt_state_degrades_to_empty_baseline() {
        let fx = fixture(&["71"]);
        std::fs::write(fx.store.path(), "not json at all").unwrap();
        let source = MockDepartureSource::new().with_json(stop("71"), &payload_leaving_in(2));

        let summary = run_once(&fx.config, &source, &fx.announcer, &fx.store)
            .await
            .unwrap();

        // Empty baseline means no crossings, but the run completes and
        // repairs the state file
        assert_eq!(summary.events_detected, 0);
        assert_eq!(fx.store.load().unwrap().trip_count(), 1);
    }

    #[tokio::test]
    async fn announce_all_speaks_soonest_and_never_persists() {
        let fx = fixture(&["71"]);
        baseline_with_trip(&fx.store, "71", 8);
        let before = std::fs::read_to_string(fx.store.path()).unwrap();

        let epoch_a = Utc::now().timestamp() + 7 * 60 + 30;
        let epoch_b = Utc::now().timestamp() + 3 * 60 + 30;
        let json = format!(
            r#"[{{"RouteDirections": [{{"RouteId": 20030, "Departures": [
                {{"EDT": "/Date({epoch_a}000-0400)/",
                  "Trip": {{"InternetServiceDesc": "North Amherst", "TripId": 1}}}},
                {{"EDT": "/Date({epoch_b}000-0400)/",
                  "Trip": {{"InternetServiceDesc": "North Amherst", "TripId": 2}}}}
            ]}}]}}]"#
        );
        let source = MockDepartureSource::new().with_json(stop("71"), &json);

        let summary = run_announce_all(&fx.config, &source, &fx.announcer)
            .await
            .unwrap();

        assert_eq!(summary.events_detected, 1);
        assert_eq!(summary.events_announced, 1);
        let spoken = fx.announcer.sink().spoken.lock().unwrap().clone();
        assert!(spoken.contains(&"in 3 minutes".to_string()));

        // Baseline untouched
        let after = std::fs::read_to_string(fx.store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn all_stops_failing_still_completes() {
        let fx = fixture(&["71", "72"]);
        let source = MockDepartureSource::new();

        let summary = run_once(&fx.config, &source, &fx.announcer, &fx.store)
            .await
            .unwrap();
        assert_eq!(summary.stops_fetched, 0);
        assert_eq!(summary.stops_failed, 2);
        assert_eq!(summary.events_detected, 0);
    }
}
