//! Turning a cycle's flags into what the rider is told.

use serde::Serialize;

use crate::domain::Source;

use super::result::AggregationResult;

/// Which failure message a cycle calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum FailureReport {
    /// Every source delivered
    None,
    /// No network; per-source failures are not distinguished
    Connectivity,
    /// Two or more sources failed
    Generic,
    /// Exactly one source failed
    Single(Source),
}

impl FailureReport {
    pub fn classify(result: &AggregationResult) -> Self {
        if !result.network_available {
            return FailureReport::Connectivity;
        }
        match result.failed_sources().as_slice() {
            [] => FailureReport::None,
            [source] => FailureReport::Single(*source),
            _ => FailureReport::Generic,
        }
    }

    pub fn is_failure(self) -> bool {
        self != FailureReport::None
    }

    /// Message to show the rider, if any.
    pub fn message(self) -> Option<&'static str> {
        match self {
            FailureReport::None => None,
            FailureReport::Connectivity => {
                Some("No network connection. Check your connection and try again.")
            }
            FailureReport::Generic => Some("Something went wrong. Please try again later."),
            FailureReport::Single(Source::Rail) => Some("Train arrivals are unavailable right now."),
            FailureReport::Single(Source::Bus) => Some("Bus arrivals are unavailable right now."),
            FailureReport::Single(Source::Bike) => Some("Bike stations are unavailable right now."),
        }
    }
}
