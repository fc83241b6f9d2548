//! The consolidated output of one refresh cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{BikeStation, BusArrival, NoServiceNotice, Source};
use crate::merge::RailBoard;

use super::report::FailureReport;

/// Everything one cycle produced, with a flag per source.
///
/// A source flag is false if any of its batches failed, even when the
/// batches that succeeded still contributed data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub rail_arrivals: RailBoard,
    pub bus_arrivals: Vec<BusArrival>,
    pub bus_no_service: Vec<NoServiceNotice>,
    pub bike_stations: Vec<BikeStation>,
    pub rail_ok: bool,
    pub bus_ok: bool,
    pub bike_ok: bool,
    pub network_available: bool,
    pub completed_at: DateTime<Utc>,
}

impl AggregationResult {
    /// Result of a cycle that found no network.
    pub fn offline(completed_at: DateTime<Utc>) -> Self {
        Self {
            rail_arrivals: RailBoard::new(),
            bus_arrivals: Vec::new(),
            bus_no_service: Vec::new(),
            bike_stations: Vec::new(),
            rail_ok: false,
            bus_ok: false,
            bike_ok: false,
            network_available: false,
            completed_at,
        }
    }

    pub fn source_ok(&self, source: Source) -> bool {
        match source {
            Source::Rail => self.rail_ok,
            Source::Bus => self.bus_ok,
            Source::Bike => self.bike_ok,
        }
    }

    /// Sources whose flag is false, in rail, bus, bike order.
    pub fn failed_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| !self.source_ok(*s))
            .collect()
    }

    /// At least one source delivered.
    pub fn is_success(&self) -> bool {
        self.rail_ok || self.bus_ok || self.bike_ok
    }

    pub fn report(&self) -> FailureReport {
        FailureReport::classify(self)
    }
}
