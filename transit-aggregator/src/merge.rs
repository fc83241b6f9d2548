//! Folding per-batch decode results into one collection per source.
//!
//! Batches must be passed in request order. Under concurrent fetching the
//! pipeline reassembles them by batch index before merging, so output is
//! deterministic regardless of completion order.

use std::collections::{BTreeMap, HashSet};

use crate::decode::BusPredictions;
use crate::domain::{BikeStation, BikeStationId, RailArrival, StationId};

/// Rail arrivals keyed by station.
pub type RailBoard = BTreeMap<StationId, RailArrival>;

/// Merge rail batches by station id.
///
/// If a station shows up in more than one batch the later batch wins.
/// Each station's etas are then stable-sorted by minutes left, so equal
/// times keep their feed order.
pub fn merge_rail(batches: impl IntoIterator<Item = Vec<RailArrival>>) -> RailBoard {
    let mut board = RailBoard::new();
    for arrival in batches.into_iter().flatten() {
        board.insert(arrival.station_id, arrival);
    }
    for arrival in board.values_mut() {
        sort_etas(arrival);
    }
    board
}

/// Stable sort by ascending minutes left.
pub fn sort_etas(arrival: &mut RailArrival) {
    arrival.etas.sort_by_key(|eta| eta.minutes_left());
}

/// Concatenate bus batches in order.
pub fn merge_bus(batches: impl IntoIterator<Item = BusPredictions>) -> BusPredictions {
    batches
        .into_iter()
        .fold(BusPredictions::default(), |mut acc, batch| {
            acc.arrivals.extend(batch.arrivals);
            acc.no_service.extend(batch.no_service);
            acc
        })
}

/// Concatenate bike batches, keep only `wanted` stations, and stable-sort
/// by name.
pub fn merge_bike(
    batches: impl IntoIterator<Item = Vec<BikeStation>>,
    wanted: &[BikeStationId],
) -> Vec<BikeStation> {
    let wanted: HashSet<BikeStationId> = wanted.iter().copied().collect();
    let mut stations: Vec<BikeStation> = batches
        .into_iter()
        .flatten()
        .filter(|s| wanted.contains(&s.id))
        .collect();
    stations.sort_by(|a, b| a.name.cmp(&b.name));
    stations
}
