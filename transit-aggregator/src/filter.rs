//! Per-rider arrival filtering.
//!
//! Preferences are owned by the settings layer and only read here. Filters
//! always build a fresh list from the input rather than removing entries
//! in place, so duplicate etas can never cause an entry to be skipped.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::ReferenceCatalog;
use crate::domain::{
    BikeStationId, BusArrival, BusStopId, Eta, RailArrival, RouteId, StationId, TrainDirection,
    TrainLine,
};

/// Read-only view of the rider's preferences.
pub trait PreferenceLookup {
    /// Whether arrivals for this (station, line, direction) should be shown.
    fn keep_train(&self, station: StationId, line: TrainLine, direction: TrainDirection) -> bool;

    /// Favorite (route, stop, direction) triples.
    fn favorite_bus_triples(&self) -> &[BusFavorite];
}

/// A favorite bus stop for one route and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusFavorite {
    pub route_id: RouteId,
    pub stop_id: BusStopId,
    /// e.g. "Northbound"
    pub direction: String,
}

impl BusFavorite {
    pub fn new(route_id: RouteId, stop_id: BusStopId, direction: impl Into<String>) -> Self {
        Self {
            route_id,
            stop_id,
            direction: direction.into(),
        }
    }

    fn matches(&self, arrival: &BusArrival) -> bool {
        self.route_id == arrival.route_id
            && self.stop_id == arrival.stop_id
            && self.direction.eq_ignore_ascii_case(&arrival.route_direction)
    }
}

/// A (station, line, direction) combination the rider has hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainFilterKey {
    pub station: StationId,
    pub line: TrainLine,
    pub direction: TrainDirection,
}

/// Errors loading preferences.
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// A snapshot of the rider's favorites and filters.
///
/// Every train combination is shown unless explicitly hidden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub hidden_trains: HashSet<TrainFilterKey>,
    #[serde(default)]
    pub favorite_rail_stations: Vec<StationId>,
    #[serde(default)]
    pub favorite_buses: Vec<BusFavorite>,
    #[serde(default)]
    pub favorite_bike_stations: Vec<BikeStationId>,
}

impl Preferences {
    pub fn from_json(json: &str) -> Result<Self, PreferencesError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PreferencesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Hide arrivals for one (station, line, direction).
    pub fn hide_train(
        mut self,
        station: StationId,
        line: TrainLine,
        direction: TrainDirection,
    ) -> Self {
        self.hidden_trains.insert(TrainFilterKey {
            station,
            line,
            direction,
        });
        self
    }
}

impl PreferenceLookup for Preferences {
    fn keep_train(&self, station: StationId, line: TrainLine, direction: TrainDirection) -> bool {
        !self.hidden_trains.contains(&TrainFilterKey {
            station,
            line,
            direction,
        })
    }

    fn favorite_bus_triples(&self) -> &[BusFavorite] {
        &self.favorite_buses
    }
}

/// The arrival filter for a single eta.
pub fn keep_eta<P: PreferenceLookup + ?Sized>(eta: &Eta, prefs: &P) -> bool {
    prefs.keep_train(eta.station_id, eta.line, eta.direction)
}

/// Replace each eta's decoded direction with its platform's direction from
/// the catalog. Unknown platforms keep the decoded value.
pub fn resolve_directions<R: ReferenceCatalog + ?Sized>(arrival: &mut RailArrival, catalog: &R) {
    for eta in &mut arrival.etas {
        if let Some(stop) = catalog.stop(eta.stop_id) {
            eta.direction = stop.direction;
        }
    }
}

/// Keep only the etas the rider wants to see. Order is preserved.
pub fn filter_rail<P: PreferenceLookup + ?Sized>(arrival: RailArrival, prefs: &P) -> RailArrival {
    let etas = arrival
        .etas
        .into_iter()
        .filter(|eta| keep_eta(eta, prefs))
        .collect();
    RailArrival { etas, ..arrival }
}

/// Keep bus arrivals matching a favorite triple.
///
/// A (route, stop) pair with no favorite at all is kept as is: it was
/// requested by something other than the favorites list.
pub fn filter_bus<P: PreferenceLookup + ?Sized>(
    arrivals: Vec<BusArrival>,
    prefs: &P,
) -> Vec<BusArrival> {
    let favorites = prefs.favorite_bus_triples();
    arrivals
        .into_iter()
        .filter(|arrival| {
            let mut for_pair = favorites
                .iter()
                .filter(|f| f.route_id == arrival.route_id && f.stop_id == arrival.stop_id)
                .peekable();
            for_pair.peek().is_none() || for_pair.any(|f| f.matches(arrival))
        })
        .collect()
}
