//! Mock departure source for testing without API access.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::StopId;

use super::client::DepartureSource;
use super::error::FetchError;
use super::types::StopDeparturesPayload;

/// What the mock should do when asked about a stop.
#[derive(Debug, Clone)]
enum Canned {
    Payload(Vec<StopDeparturesPayload>),
    Failure,
}

/// Mock departure source serving canned payloads.
///
/// Stops never registered behave like a failing fetch, matching a live
/// API that is unreachable for that stop.
#[derive(Debug, Clone, Default)]
pub struct MockDepartureSource {
    stops: HashMap<StopId, Canned>,
}

impl MockDepartureSource {
    /// Create an empty mock source; every fetch fails until stops are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payload to serve for a stop.
    pub fn with_payload(mut self, stop: StopId, payload: Vec<StopDeparturesPayload>) -> Self {
        self.stops.insert(stop, Canned::Payload(payload));
        self
    }

    /// Register a payload given as raw JSON text.
    ///
    /// Panics on malformed JSON; this is test setup, not input handling.
    pub fn with_json(self, stop: StopId, json: &str) -> Self {
        let payload = serde_json::from_str(json).expect("mock payload JSON must parse");
        self.with_payload(stop, payload)
    }

    /// Make fetches for a stop fail with an API error.
    pub fn with_failure(mut self, stop: StopId) -> Self {
        self.stops.insert(stop, Canned::Failure);
        self
    }
}

#[async_trait]
impl DepartureSource for MockDepartureSource {
    async fn stop_departures(
        &self,
        stop: &StopId,
    ) -> Result<Vec<StopDeparturesPayload>, FetchError> {
        match self.stops.get(stop) {
            Some(Canned::Payload(payload)) => Ok(payload.clone()),
            Some(Canned::Failure) => Err(FetchError::Api {
                status: 503,
                message: format!("mock failure for stop {stop}"),
            }),
            None => Err(FetchError::Api {
                status: 404,
                message: format!("no mock data for stop {stop}"),
            }),
        }
    }
}
