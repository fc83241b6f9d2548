//! Web layer for the transit aggregator.
//!
//! Serves the latest aggregation result as JSON and lets clients trigger a
//! refresh cycle.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, LiveAggregator};
