//! Static reference data: rail stations and their platforms.

use serde::{Deserialize, Serialize};

use super::{StationId, StopId, TrainDirection, TrainLine};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A directional platform inside a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,

    /// Platform description, e.g. "Service toward Kimball".
    #[serde(default)]
    pub description: String,

    /// Compass direction the platform serves.
    pub direction: TrainDirection,

    /// Lines calling at this platform.
    #[serde(default)]
    pub lines: Vec<TrainLine>,

    pub position: Position,
}

/// A rail station as loaded from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl Station {
    /// Look up one of this station's platforms.
    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    /// Every line calling at any platform, deduplicated and ordered.
    pub fn lines(&self) -> Vec<TrainLine> {
        let mut lines: Vec<TrainLine> = self
            .stops
            .iter()
            .flat_map(|s| s.lines.iter().copied())
            .collect();
        lines.sort();
        lines.dedup();
        lines
    }
}
