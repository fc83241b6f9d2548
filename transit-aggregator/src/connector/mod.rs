//! Source connectors.
//!
//! A connector turns one batch query into one raw payload. It does no
//! decoding and keeps no state between calls, so the pipeline can swap the
//! HTTP implementation for scripted payloads in tests and offline runs.

mod error;
mod http;
mod mock;

use std::fmt;

pub use error::ConnectError;
pub use http::HttpConnector;
pub use mock::MockConnector;

use crate::domain::{BusStopId, RouteId, Source, StationId};

/// Undecoded response body.
pub type RawPayload = String;

/// A (route, stop) pair requested from the bus feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusStopRequest {
    pub route_id: RouteId,
    pub stop_id: BusStopId,
}

impl BusStopRequest {
    pub fn new(route_id: RouteId, stop_id: BusStopId) -> Self {
        Self { route_id, stop_id }
    }
}

/// The identifiers carried by one network call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchQuery {
    /// Up to the rail ceiling of station ids.
    Rail(Vec<StationId>),
    /// Up to the bus ceiling of (route, stop) pairs.
    Bus(Vec<BusStopRequest>),
    /// The whole bike station feed.
    Bike,
}

impl BatchQuery {
    pub fn source(&self) -> Source {
        match self {
            BatchQuery::Rail(_) => Source::Rail,
            BatchQuery::Bus(_) => Source::Bus,
            BatchQuery::Bike => Source::Bike,
        }
    }

    /// Number of identifiers in the query. The bike feed has none.
    pub fn len(&self) -> usize {
        match self {
            BatchQuery::Rail(ids) => ids.len(),
            BatchQuery::Bus(pairs) => pairs.len(),
            BatchQuery::Bike => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for BatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchQuery::Rail(ids) => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "rail [{}]", ids.join(","))
            }
            BatchQuery::Bus(pairs) => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|p| format!("{}/{}", p.route_id, p.stop_id))
                    .collect();
                write!(f, "bus [{}]", pairs.join(","))
            }
            BatchQuery::Bike => f.write_str("bike"),
        }
    }
}

/// Fetches raw payloads for batch queries.
///
/// One call to `fetch` is exactly one network round trip. Transport
/// failures and non-success statuses are returned as [`ConnectError`];
/// implementations never panic on upstream misbehaviour.
pub trait SourceConnector {
    async fn fetch(&self, query: &BatchQuery) -> Result<RawPayload, ConnectError>;
}

/// Either the live HTTP connector or scripted payloads, chosen at startup.
#[derive(Debug)]
pub enum AnyConnector {
    Http(HttpConnector),
    Mock(MockConnector),
}

impl SourceConnector for AnyConnector {
    async fn fetch(&self, query: &BatchQuery) -> Result<RawPayload, ConnectError> {
        match self {
            AnyConnector::Http(c) => c.fetch(query).await,
            AnyConnector::Mock(c) => c.fetch(query).await,
        }
    }
}
