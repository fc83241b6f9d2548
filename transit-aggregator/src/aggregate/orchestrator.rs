//! The refresh cycle.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::batch::{BatchError, batch, batch_pairs};
use crate::catalog::ReferenceCatalog;
use crate::config::{AggregatorConfig, ConfigError};
use crate::connectivity::ConnectivityProbe;
use crate::connector::{BatchQuery, BusStopRequest, SourceConnector};
use crate::decode::{BikeDecoder, BusDecoder, BusPredictions, RailDecoder};
use crate::domain::{BikeStation, BikeStationId, BusStopId, RouteId, Source, StationId};
use crate::filter::{PreferenceLookup, filter_bus, filter_rail, resolve_directions};
use crate::merge::{RailBoard, merge_bike, merge_bus, merge_rail};

use super::cancel::CancelSignal;
use super::cycle::{CycleState, CycleTracker};
use super::pipeline::run_source;
use super::request::RefreshRequest;
use super::result::AggregationResult;

/// Receives the result of each cycle.
pub trait RefreshListener {
    fn on_refresh(&self, result: AggregationResult);
}

impl<F> RefreshListener for F
where
    F: Fn(AggregationResult),
{
    fn on_refresh(&self, result: AggregationResult) {
        self(result)
    }
}

/// Drives the three source pipelines and folds them into one result.
#[derive(Debug)]
pub struct Aggregator<C, N> {
    connector: C,
    probe: N,
    config: AggregatorConfig,
    cycles: CycleTracker,
}

impl<C, N> Aggregator<C, N>
where
    C: SourceConnector,
    N: ConnectivityProbe,
{
    pub fn new(connector: C, probe: N, config: AggregatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            connector,
            probe,
            config,
            cycles: CycleTracker::new(),
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Earliest stage of any running cycle, `Idle` when none are.
    pub fn state(&self) -> CycleState {
        self.cycles.current()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.cycles.subscribe()
    }

    /// Run one cycle and return its result.
    ///
    /// Never fails: connect, decode and cancellation problems show up as
    /// false source flags on the result.
    #[instrument(
        skip_all,
        fields(
            rail = request.rail_stations.len(),
            bus = request.bus_stops.len(),
            bike = request.bike_stations.len(),
        )
    )]
    pub async fn refresh<R, P>(
        &self,
        request: &RefreshRequest,
        catalog: &R,
        prefs: &P,
        cancel: &CancelSignal,
    ) -> AggregationResult
    where
        R: ReferenceCatalog + ?Sized,
        P: PreferenceLookup + ?Sized,
    {
        // Dropping the guard, on return or when the future is dropped, ends the cycle
        let mut cycle = self.cycles.start();
        if !self.probe.is_network_available().await {
            warn!("network unavailable, skipping all sources");
            cycle.advance(CycleState::Reporting);
            return AggregationResult::offline(Utc::now());
        }

        cycle.advance(CycleState::Fetching);
        let ((rail_arrivals, rail_ok), (bus, bus_ok), (bike_stations, bike_ok)) = tokio::join!(
            self.fetch_rail(&request.rail_stations, catalog, prefs, cancel),
            self.fetch_bus(&request.bus_stops, prefs, cancel),
            self.fetch_bike(&request.bike_stations, cancel),
        );

        cycle.advance(CycleState::Reporting);
        let result = AggregationResult {
            rail_arrivals,
            bus_arrivals: bus.arrivals,
            bus_no_service: bus.no_service,
            bike_stations,
            rail_ok,
            bus_ok,
            bike_ok,
            network_available: true,
            completed_at: Utc::now(),
        };
        info!(
            stations = result.rail_arrivals.len(),
            buses = result.bus_arrivals.len(),
            bikes = result.bike_stations.len(),
            rail_ok,
            bus_ok,
            bike_ok,
            "refresh complete"
        );
        result
    }

    /// Run one cycle and hand the result to `listener`.
    pub async fn refresh_with<R, P, L>(
        &self,
        request: &RefreshRequest,
        catalog: &R,
        prefs: &P,
        cancel: &CancelSignal,
        listener: &L,
    ) where
        R: ReferenceCatalog + ?Sized,
        P: PreferenceLookup + ?Sized,
        L: RefreshListener + ?Sized,
    {
        let result = self.refresh(request, catalog, prefs, cancel).await;
        listener.on_refresh(result);
    }

    async fn fetch_rail<R, P>(
        &self,
        stations: &[StationId],
        catalog: &R,
        prefs: &P,
        cancel: &CancelSignal,
    ) -> (RailBoard, bool)
    where
        R: ReferenceCatalog + ?Sized,
        P: PreferenceLookup + ?Sized,
    {
        let queries = match batch(stations, self.config.rail.max_per_batch) {
            Ok(batches) => batches.into_iter().map(BatchQuery::Rail).collect(),
            Err(e) => return (RailBoard::new(), planning_failed(Source::Rail, e)),
        };

        let outcome = run_source::<RailDecoder, C>(
            &self.connector,
            queries,
            self.config.max_concurrent_batches,
            cancel,
        )
        .await;
        let ok = outcome.ok();

        let board = merge_rail(outcome.batches)
            .into_iter()
            .map(|(id, mut arrival)| {
                resolve_directions(&mut arrival, catalog);
                (id, filter_rail(arrival, prefs))
            })
            .collect();
        (board, ok)
    }

    async fn fetch_bus<P>(
        &self,
        stops: &[BusStopRequest],
        prefs: &P,
        cancel: &CancelSignal,
    ) -> (BusPredictions, bool)
    where
        P: PreferenceLookup + ?Sized,
    {
        let routes: Vec<RouteId> = stops.iter().map(|s| s.route_id.clone()).collect();
        let stop_ids: Vec<BusStopId> = stops.iter().map(|s| s.stop_id).collect();

        let queries = match batch_pairs(&routes, &stop_ids, self.config.bus.max_per_batch) {
            Ok(batches) => batches
                .into_iter()
                .map(|(routes, stop_ids)| {
                    BatchQuery::Bus(
                        routes
                            .into_iter()
                            .zip(stop_ids)
                            .map(|(route, stop)| BusStopRequest::new(route, stop))
                            .collect(),
                    )
                })
                .collect(),
            Err(e) => return (BusPredictions::default(), planning_failed(Source::Bus, e)),
        };

        let outcome = run_source::<BusDecoder, C>(
            &self.connector,
            queries,
            self.config.max_concurrent_batches,
            cancel,
        )
        .await;
        let ok = outcome.ok();

        let mut merged = merge_bus(outcome.batches);
        merged.arrivals = filter_bus(merged.arrivals, prefs);
        (merged, ok)
    }

    /// The bike feed is fetched whole and narrowed to the wanted stations.
    async fn fetch_bike(
        &self,
        wanted: &[BikeStationId],
        cancel: &CancelSignal,
    ) -> (Vec<BikeStation>, bool) {
        let queries = if wanted.is_empty() {
            Vec::new()
        } else {
            vec![BatchQuery::Bike]
        };

        let outcome = run_source::<BikeDecoder, C>(
            &self.connector,
            queries,
            self.config.max_concurrent_batches,
            cancel,
        )
        .await;
        let ok = outcome.ok();
        (merge_bike(outcome.batches, wanted), ok)
    }
}

fn planning_failed(source: Source, error: BatchError) -> bool {
    warn!(%source, error = %error, "could not batch request");
    false
}
