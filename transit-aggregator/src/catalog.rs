//! Reference catalog of stations and bus stops.
//!
//! The catalog is static data loaded once at startup and treated as an
//! immutable lookup table for the lifetime of the process. Aggregation
//! cycles only ever read it, so it is shared by reference across the
//! concurrently running source pipelines.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{BusStopId, RouteId, Station, StationId, Stop, StopId};

/// Errors loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stop {stop} is listed under both station {first} and station {second}")]
    DuplicateStop {
        stop: StopId,
        first: StationId,
        second: StationId,
    },
}

/// Read-only lookups the aggregation pipeline needs from reference data.
pub trait ReferenceCatalog {
    /// Look up a rail station.
    fn station(&self, id: StationId) -> Option<&Station>;

    /// Every known rail station id, ascending.
    fn all_station_ids(&self) -> Vec<StationId>;

    /// Look up a rail platform by its stop id.
    fn stop(&self, id: StopId) -> Option<&Stop>;

    /// Stops served by a bus route in one direction, in route order.
    fn stop_ids_for_bus_route(&self, route: &RouteId, direction: &str) -> Vec<BusStopId>;
}

/// A stop along a bus route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRouteStop {
    pub stop_id: BusStopId,
    pub name: String,
    /// Direction as the predictions feed spells it, e.g. "Northbound".
    pub direction: String,
}

/// On-disk shape of the catalog file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    stations: Vec<Station>,
    #[serde(default)]
    bus_routes: BTreeMap<RouteId, Vec<BusRouteStop>>,
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stations: BTreeMap<StationId, Station>,
    stop_index: HashMap<StopId, StationId>,
    bus_routes: BTreeMap<RouteId, Vec<BusRouteStop>>,
}

impl Catalog {
    /// Build a catalog from stations and bus routes.
    ///
    /// Fails if a platform id appears under two different stations, since
    /// direction lookups by stop id would then be ambiguous.
    pub fn new(
        stations: impl IntoIterator<Item = Station>,
        bus_routes: BTreeMap<RouteId, Vec<BusRouteStop>>,
    ) -> Result<Self, CatalogError> {
        let mut by_id = BTreeMap::new();
        let mut stop_index = HashMap::new();

        for station in stations {
            for stop in &station.stops {
                if let Some(&first) = stop_index.get(&stop.id)
                    && first != station.id
                {
                    return Err(CatalogError::DuplicateStop {
                        stop: stop.id,
                        first,
                        second: station.id,
                    });
                }
                stop_index.insert(stop.id, station.id);
            }
            by_id.insert(station.id, station);
        }

        Ok(Self {
            stations: by_id,
            stop_index,
            bus_routes,
        })
    }

    /// Parse a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.stations, file.bus_routes)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty() && self.bus_routes.is_empty()
    }

    /// Stops along a bus route across all directions.
    pub fn bus_route(&self, route: &RouteId) -> &[BusRouteStop] {
        self.bus_routes.get(route).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ReferenceCatalog for Catalog {
    fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    fn all_station_ids(&self) -> Vec<StationId> {
        self.stations.keys().copied().collect()
    }

    fn stop(&self, id: StopId) -> Option<&Stop> {
        let station = self.stop_index.get(&id)?;
        self.stations.get(station)?.stop(id)
    }

    fn stop_ids_for_bus_route(&self, route: &RouteId, direction: &str) -> Vec<BusStopId> {
        self.bus_route(route)
            .iter()
            .filter(|s| s.direction.eq_ignore_ascii_case(direction))
            .map(|s| s.stop_id)
            .collect()
    }
}
