//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::domain::StationId;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/arrivals", get(arrivals))
        .route("/arrivals/rail/:station", get(station_arrivals))
        .route("/refresh", post(refresh))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Cycle state and the time of the last completed refresh.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: state.aggregator.state(),
        last_refresh: state.latest().await.map(|r| r.completed_at),
    })
}

/// Latest arrivals, refreshing first if nothing has been fetched yet.
async fn arrivals(State(state): State<AppState>) -> Json<ArrivalsResponse> {
    let result = state.latest_or_refresh().await;
    Json(ArrivalsResponse::from_result(&result, state.catalog.as_ref()))
}

/// Latest arrivals at one rail station.
async fn station_arrivals(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Result<Json<StationBoard>, AppError> {
    let id = StationId::parse(&station).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let result = state.latest_or_refresh().await;
    let arrival = result
        .rail_arrivals
        .get(&id)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No arrivals for station {id}"),
        })?;

    Ok(Json(StationBoard::from_arrival(arrival, state.catalog.as_ref())))
}

/// Run a refresh cycle now.
async fn refresh(State(state): State<AppState>) -> Json<ArrivalsResponse> {
    let result = state.refresh().await;
    Json(ArrivalsResponse::from_result(&result, state.catalog.as_ref()))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::catalog::Catalog;
    use crate::config::AggregatorConfig;
    use crate::connectivity::{AnyProbe, StaticProbe};
    use crate::connector::{AnyConnector, MockConnector};
    use crate::decode::rail_fixtures::{ctatt, eta_xml};
    use crate::domain::Source;
    use crate::filter::Preferences;

    fn state(online: bool) -> AppState {
        let mock = MockConnector::new().with_source_payload(
            Source::Rail,
            ctatt(&[eta_xml(40380, 30074, "Brn", "23:30:00")]),
        );
        let aggregator = Aggregator::new(
            AnyConnector::Mock(mock),
            AnyProbe::Static(StaticProbe(online)),
            AggregatorConfig::default(),
        )
        .unwrap();
        let prefs = Preferences {
            favorite_rail_stations: vec![StationId(40380)],
            ..Preferences::default()
        };
        AppState::new(aggregator, Catalog::default(), prefs)
    }

    #[tokio::test]
    async fn arrivals_runs_first_cycle() {
        let state = state(true);
        assert!(state.latest().await.is_none());

        let Json(response) = arrivals(State(state.clone())).await;
        assert!(response.sources.rail);
        assert_eq!(response.rail.len(), 1);
        assert!(state.latest().await.is_some());
    }

    #[tokio::test]
    async fn refresh_reports_offline() {
        let Json(response) = refresh(State(state(false))).await;
        assert!(!response.network_available);
        assert_eq!(
            response.message,
            Some("No network connection. Check your connection and try again.")
        );
    }

    #[tokio::test]
    async fn station_lookup() {
        let state = state(true);

        let Json(board) = station_arrivals(State(state.clone()), Path("40380".to_string()))
            .await
            .unwrap();
        assert_eq!(board.etas.len(), 1);

        let err = station_arrivals(State(state.clone()), Path("40360".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = station_arrivals(State(state), Path("clark".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_after_refresh() {
        let state = state(true);
        state.refresh().await;

        let Json(status) = status(State(state)).await;
        assert_eq!(status.state, crate::aggregate::CycleState::Idle);
        assert!(status.last_refresh.is_some());
    }
}
