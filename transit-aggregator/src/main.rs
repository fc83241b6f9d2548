use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_aggregator::aggregate::Aggregator;
use transit_aggregator::catalog::Catalog;
use transit_aggregator::config::AggregatorConfig;
use transit_aggregator::connectivity::{AnyProbe, StaticProbe, TcpProbe};
use transit_aggregator::connector::{AnyConnector, HttpConnector, MockConnector};
use transit_aggregator::domain::Source;
use transit_aggregator::filter::Preferences;
use transit_aggregator::web::{AppState, create_router};

/// How long the connectivity probe waits for a TCP handshake.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AggregatorConfig::from_env().expect("Invalid configuration");
    // The bike feed is keyless
    for source in [Source::Rail, Source::Bus] {
        if config.endpoint(source).api_key.is_empty() {
            warn!(%source, "API key not set, calls will fail");
        }
    }

    // Reference data and preferences are optional; without them nothing is requested
    let catalog = match std::env::var("TRANSIT_CATALOG_PATH") {
        Ok(path) => Catalog::load(&path).expect("Failed to load catalog"),
        Err(_) => Catalog::default(),
    };
    let preferences = match std::env::var("TRANSIT_PREFERENCES_PATH") {
        Ok(path) => Preferences::load(&path).expect("Failed to load preferences"),
        Err(_) => Preferences::default(),
    };
    info!(
        stations = catalog.station_count(),
        rail = preferences.favorite_rail_stations.len(),
        bus = preferences.favorite_buses.len(),
        bike = preferences.favorite_bike_stations.len(),
        "loaded reference data and preferences"
    );

    // TRANSIT_MOCK_DIR serves canned payloads and skips the probe
    let (connector, probe) = match std::env::var("TRANSIT_MOCK_DIR") {
        Ok(dir) => {
            info!(%dir, "using mock payloads");
            let mock = MockConnector::from_dir(&dir).expect("Failed to load mock payloads");
            (AnyConnector::Mock(mock), AnyProbe::Static(StaticProbe(true)))
        }
        Err(_) => {
            let http = HttpConnector::new(&config).expect("Failed to create HTTP connector");
            let probe = TcpProbe::new(&config.probe_addr, PROBE_TIMEOUT);
            (AnyConnector::Http(http), AnyProbe::Tcp(probe))
        }
    };

    let refresh_interval = config.refresh_interval();
    let bind_addr = config.bind_addr.clone();
    let aggregator =
        Aggregator::new(connector, probe, config).expect("Failed to create aggregator");
    let state = AppState::new(aggregator, catalog, preferences);

    // Spawn background task to refresh arrivals periodically
    let background = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        loop {
            interval.tick().await;
            let result = background.refresh().await;
            if let Some(message) = result.report().message() {
                warn!(message, "refresh finished with failures");
            }
        }
    });

    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind");
    info!("Transit aggregator listening on http://{bind_addr}");
    info!("  GET  /health                  - Health check");
    info!("  GET  /status                  - Cycle state");
    info!("  GET  /arrivals                - Latest arrivals");
    info!("  GET  /arrivals/rail/:station  - Latest arrivals at one station");
    info!("  POST /refresh                 - Refresh now");

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("shutting down");
        state.cancel.cancel();
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Server error");
}
