//! Aggregation orchestrator.
//!
//! A refresh cycle checks connectivity, then runs the rail, bus and bike
//! pipelines side by side. Each pipeline batches its request, fetches the
//! batches with bounded concurrency, decodes and merges them in request
//! order, then applies the rider's filters. A failing source only clears
//! its own flag on the result.

mod cancel;
mod cycle;
mod orchestrator;
mod pipeline;
mod report;
mod request;
mod result;


pub use cancel::{CancelHandle, CancelSignal};
pub use cycle::CycleState;
pub use orchestrator::{Aggregator, RefreshListener};
pub use pipeline::{BatchFailure, FailureCause, SourceOutcome, run_source};
pub use report::FailureReport;
pub use request::RefreshRequest;
pub use result::AggregationResult;
