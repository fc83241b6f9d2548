//! Domain types for the transit aggregator.
//!
//! Identifiers, lines and timestamps are validated at construction time,
//! so code that receives these types can trust their validity. Decoded
//! arrival records are plain data owned by the aggregation result.

mod arrival;
mod bike;
mod ids;
mod line;
mod source;
mod station;
mod time;

pub use arrival::{BusArrival, Eta, NoServiceNotice, RailArrival};
pub use bike::BikeStation;
pub use ids::{BikeStationId, BusStopId, InvalidId, RouteId, StationId, StopId};
pub use line::{TrainDirection, TrainLine, UnknownCode};
pub use source::Source;
pub use station::{Position, Station, Stop};
pub use time::{TimeError, TimeLeft, minutes_between, parse_feed_timestamp};
