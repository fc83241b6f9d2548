//! What a refresh cycle asks each source for.

use std::collections::HashSet;
use std::hash::Hash;

use crate::catalog::ReferenceCatalog;
use crate::connector::BusStopRequest;
use crate::domain::{BikeStationId, RouteId, StationId};
use crate::filter::Preferences;

/// Identifiers to fetch in one cycle, per source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshRequest {
    pub rail_stations: Vec<StationId>,
    pub bus_stops: Vec<BusStopRequest>,
    pub bike_stations: Vec<BikeStationId>,
}

impl RefreshRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request everything the rider has favorited.
    ///
    /// Bus favorites differing only in direction share one (route, stop)
    /// request; the direction is applied later by the arrival filter.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            rail_stations: dedup(prefs.favorite_rail_stations.iter().copied()),
            bus_stops: dedup(
                prefs
                    .favorite_buses
                    .iter()
                    .map(|f| BusStopRequest::new(f.route_id.clone(), f.stop_id)),
            ),
            bike_stations: dedup(prefs.favorite_bike_stations.iter().copied()),
        }
    }

    pub fn with_rail(mut self, stations: impl IntoIterator<Item = StationId>) -> Self {
        self.rail_stations.extend(stations);
        self.rail_stations = dedup(self.rail_stations);
        self
    }

    pub fn with_bus(mut self, stops: impl IntoIterator<Item = BusStopRequest>) -> Self {
        self.bus_stops.extend(stops);
        self.bus_stops = dedup(self.bus_stops);
        self
    }

    pub fn with_bike(mut self, stations: impl IntoIterator<Item = BikeStationId>) -> Self {
        self.bike_stations.extend(stations);
        self.bike_stations = dedup(self.bike_stations);
        self
    }

    /// Add every rail station in the catalog.
    pub fn with_all_stations<R: ReferenceCatalog + ?Sized>(self, catalog: &R) -> Self {
        self.with_rail(catalog.all_station_ids())
    }

    /// Add every stop of one bus route in one direction.
    pub fn with_bus_route<R: ReferenceCatalog + ?Sized>(
        self,
        catalog: &R,
        route: &RouteId,
        direction: &str,
    ) -> Self {
        let stops = catalog
            .stop_ids_for_bus_route(route, direction)
            .into_iter()
            .map(|stop| BusStopRequest::new(route.clone(), stop));
        self.with_bus(stops)
    }

    pub fn is_empty(&self) -> bool {
        self.rail_stations.is_empty() && self.bus_stops.is_empty() && self.bike_stations.is_empty()
    }
}

/// Drop repeats, keeping first occurrences in order.
fn dedup<T: Clone + Eq + Hash>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::catalog::fixtures::{station, stop};
    use crate::catalog::{BusRouteStop, Catalog};
    use crate::domain::{BusStopId, TrainDirection, TrainLine};
    use crate::filter::BusFavorite;

    fn route(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    #[test]
    fn from_preferences_dedups_in_order() {
        let prefs = Preferences {
            favorite_rail_stations: vec![StationId(40380), StationId(40360), StationId(40380)],
            favorite_buses: vec![
                BusFavorite::new(route("22"), BusStopId(1855), "Northbound"),
                BusFavorite::new(route("36"), BusStopId(1856), "Southbound"),
                BusFavorite::new(route("22"), BusStopId(1855), "Southbound"),
            ],
            favorite_bike_stations: vec![BikeStationId(5)],
            ..Preferences::default()
        };

        let request = RefreshRequest::from_preferences(&prefs);
        assert_eq!(request.rail_stations, vec![StationId(40380), StationId(40360)]);
        assert_eq!(
            request.bus_stops,
            vec![
                BusStopRequest::new(route("22"), BusStopId(1855)),
                BusStopRequest::new(route("36"), BusStopId(1856)),
            ]
        );
        assert_eq!(request.bike_stations, vec![BikeStationId(5)]);
    }

    #[test]
    fn empty_preferences_make_empty_request() {
        assert!(RefreshRequest::from_preferences(&Preferences::default()).is_empty());
    }

    #[test]
    fn catalog_driven_requests() {
        let mut bus_routes = BTreeMap::new();
        bus_routes.insert(
            route("22"),
            vec![
                BusRouteStop {
                    stop_id: BusStopId(1855),
                    name: "Clark & Diversey".into(),
                    direction: "Northbound".into(),
                },
                BusRouteStop {
                    stop_id: BusStopId(1900),
                    name: "Clark & Belmont".into(),
                    direction: "Southbound".into(),
                },
            ],
        );
        let catalog = Catalog::new(
            [
                station(40380, "Clark/Lake", vec![stop(30074, TrainDirection::East, &[TrainLine::Blue])]),
                station(40360, "Southport", vec![]),
            ],
            bus_routes,
        )
        .unwrap();

        let request = RefreshRequest::new()
            .with_rail([StationId(40380)])
            .with_all_stations(&catalog)
            .with_bus_route(&catalog, &route("22"), "northbound");

        assert_eq!(request.rail_stations, vec![StationId(40380), StationId(40360)]);
        assert_eq!(
            request.bus_stops,
            vec![BusStopRequest::new(route("22"), BusStopId(1855))]
        );
    }
}
