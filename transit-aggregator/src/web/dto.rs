//! Data transfer objects for web responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{AggregationResult, CycleState, FailureReport};
use crate::catalog::ReferenceCatalog;
use crate::domain::{
    BikeStation, BusArrival, BusStopId, Eta, NoServiceNotice, RailArrival, RouteId, StationId,
    TrainDirection, TrainLine,
};

/// Per-source outcome flags.
#[derive(Debug, Serialize)]
pub struct SourceStatus {
    pub rail: bool,
    pub bus: bool,
    pub bike: bool,
}

/// The latest refresh, shaped for display.
#[derive(Debug, Serialize)]
pub struct ArrivalsResponse {
    /// When the cycle finished
    pub completed_at: DateTime<Utc>,

    pub network_available: bool,

    pub sources: SourceStatus,

    /// Failure classification for the cycle
    pub failure: FailureReport,

    /// Message to show the rider, if the cycle failed
    pub message: Option<&'static str>,

    pub rail: Vec<StationBoard>,

    pub bus: Vec<BusResult>,

    /// Stops the bus feed reported as having no service
    pub no_service: Vec<NoServiceNotice>,

    pub bike: Vec<BikeStation>,
}

impl ArrivalsResponse {
    pub fn from_result<R: ReferenceCatalog + ?Sized>(result: &AggregationResult, catalog: &R) -> Self {
        let failure = result.report();
        Self {
            completed_at: result.completed_at,
            network_available: result.network_available,
            sources: SourceStatus {
                rail: result.rail_ok,
                bus: result.bus_ok,
                bike: result.bike_ok,
            },
            failure,
            message: failure.message(),
            rail: result
                .rail_arrivals
                .values()
                .map(|arrival| StationBoard::from_arrival(arrival, catalog))
                .collect(),
            bus: result.bus_arrivals.iter().map(BusResult::from).collect(),
            no_service: result.bus_no_service.clone(),
            bike: result.bike_stations.clone(),
        }
    }
}

/// Arrivals at one rail station.
#[derive(Debug, Serialize)]
pub struct StationBoard {
    pub station_id: StationId,

    pub station_name: String,

    /// Lines serving the station (from reference data when known)
    pub lines: Vec<TrainLine>,

    pub etas: Vec<EtaResult>,
}

impl StationBoard {
    pub fn from_arrival<R: ReferenceCatalog + ?Sized>(arrival: &RailArrival, catalog: &R) -> Self {
        let known = catalog.station(arrival.station_id);
        Self {
            station_id: arrival.station_id,
            station_name: known
                .map(|s| s.name.clone())
                .unwrap_or_else(|| arrival.station_name.clone()),
            lines: known.map(|s| s.lines()).unwrap_or_else(|| arrival.lines()),
            etas: arrival.etas.iter().map(EtaResult::from).collect(),
        }
    }
}

/// A single predicted train.
#[derive(Debug, Serialize)]
pub struct EtaResult {
    pub line: TrainLine,

    pub destination: String,

    pub direction: TrainDirection,

    pub run_number: Option<String>,

    /// "N min", "Due" or "Delay"
    pub time_left: String,

    /// Minutes until arrival, used for ordering
    pub minutes: i64,

    pub is_scheduled: bool,

    pub is_fault: bool,
}

impl From<&Eta> for EtaResult {
    fn from(eta: &Eta) -> Self {
        Self {
            line: eta.line,
            destination: eta.destination_name.clone(),
            direction: eta.direction,
            run_number: eta.run_number.clone(),
            time_left: eta.time_left().label(),
            minutes: eta.minutes_left(),
            is_scheduled: eta.is_scheduled,
            is_fault: eta.is_fault,
        }
    }
}

/// A single predicted bus.
#[derive(Debug, Serialize)]
pub struct BusResult {
    pub route_id: RouteId,

    pub stop_id: BusStopId,

    pub stop_name: String,

    /// e.g. "Northbound"
    pub direction: String,

    pub destination: String,

    pub vehicle_id: Option<String>,

    /// "N min" or "Delay"
    pub time_left: String,

    pub minutes: i64,
}

impl From<&BusArrival> for BusResult {
    fn from(arrival: &BusArrival) -> Self {
        Self {
            route_id: arrival.route_id.clone(),
            stop_id: arrival.stop_id,
            stop_name: arrival.stop_name.clone(),
            direction: arrival.route_direction.clone(),
            destination: arrival.destination_name.clone(),
            vehicle_id: arrival.vehicle_id.clone(),
            time_left: arrival.time_left().label(),
            minutes: arrival.minutes_left(),
        }
    }
}

/// Current cycle state and last completion time.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: CycleState,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
