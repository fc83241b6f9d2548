//! Bike-share dock stations.

use serde::Serialize;

use super::{BikeStationId, Position};

/// Live availability at one dock station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeStation {
    pub id: BikeStationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `None` when the feed omitted the count.
    pub available_bikes: Option<u32>,
    pub available_docks: Option<u32>,
    pub total_docks: Option<u32>,
    /// Operational status text, e.g. "In Service".
    pub status: Option<String>,
    pub address: Option<String>,
}

impl BikeStation {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}
