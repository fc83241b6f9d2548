//! Decoded arrival records for rail and bus.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{BusStopId, Position, RouteId, StationId, StopId, TimeLeft, TrainDirection, TrainLine};
use super::time::minutes_between;

/// One predicted rail arrival at a platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eta {
    pub station_id: StationId,
    pub stop_id: StopId,
    pub station_name: String,
    /// Platform description, e.g. "Service toward Kimball".
    pub stop_description: String,
    /// Run number of the train, when reported.
    pub run_number: Option<String>,
    pub line: TrainLine,
    pub destination_name: String,
    /// Direction of the platform. Decoded from the route-direction code and
    /// replaced with the catalog's platform direction before filtering.
    pub direction: TrainDirection,
    pub prediction_timestamp: NaiveDateTime,
    pub expected_timestamp: NaiveDateTime,
    pub is_approaching: bool,
    pub is_scheduled: bool,
    pub is_delayed: bool,
    pub is_fault: bool,
    pub position: Option<Position>,
    pub heading: Option<u16>,
}

impl Eta {
    /// Floored minutes until arrival. Used as the sort key.
    pub fn minutes_left(&self) -> i64 {
        minutes_between(self.prediction_timestamp, self.expected_timestamp)
    }

    pub fn time_left(&self) -> TimeLeft {
        TimeLeft::derive(
            self.prediction_timestamp,
            self.expected_timestamp,
            self.is_approaching,
            self.is_delayed,
        )
    }
}

/// All arrivals reported for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RailArrival {
    pub station_id: StationId,
    pub station_name: String,
    pub etas: Vec<Eta>,
}

impl RailArrival {
    /// A station with no arrivals to show.
    pub fn is_empty(&self) -> bool {
        self.etas.is_empty()
    }

    /// Distinct lines present in the arrivals, in order of first appearance.
    pub fn lines(&self) -> Vec<TrainLine> {
        let mut lines = Vec::new();
        for eta in &self.etas {
            if !lines.contains(&eta.line) {
                lines.push(eta.line);
            }
        }
        lines
    }
}

/// One predicted bus arrival at a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusArrival {
    pub stop_id: BusStopId,
    pub stop_name: String,
    pub route_id: RouteId,
    /// Route direction as the feed spells it, e.g. "Northbound".
    pub route_direction: String,
    pub destination_name: String,
    pub vehicle_id: Option<String>,
    /// Distance to the stop in feet.
    pub distance_to_stop: Option<u32>,
    pub prediction_timestamp: NaiveDateTime,
    pub expected_timestamp: NaiveDateTime,
    pub is_delayed: bool,
}

impl BusArrival {
    pub fn minutes_left(&self) -> i64 {
        minutes_between(self.prediction_timestamp, self.expected_timestamp)
    }

    pub fn time_left(&self) -> TimeLeft {
        TimeLeft::derive(
            self.prediction_timestamp,
            self.expected_timestamp,
            false,
            self.is_delayed,
        )
    }
}

/// A stop (or the whole request) for which the feed explicitly reported
/// that there is nothing to show, e.g. "No service scheduled".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoServiceNotice {
    pub route_id: Option<RouteId>,
    pub stop_id: Option<BusStopId>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_feed_timestamp;

    fn eta(line: TrainLine, arr: &str, approaching: bool) -> Eta {
        Eta {
            station_id: StationId(40380),
            stop_id: StopId(30074),
            station_name: "Clark/Lake".into(),
            stop_description: "Service toward Loop".into(),
            run_number: None,
            line,
            destination_name: "Loop".into(),
            direction: TrainDirection::East,
            prediction_timestamp: parse_feed_timestamp("20240315 10:00:00").unwrap(),
            expected_timestamp: parse_feed_timestamp(arr).unwrap(),
            is_approaching: approaching,
            is_scheduled: false,
            is_delayed: false,
            is_fault: false,
            position: None,
            heading: None,
        }
    }

    #[test]
    fn eta_time_left() {
        let e = eta(TrainLine::Brown, "20240315 10:04:30", false);
        assert_eq!(e.minutes_left(), 4);
        assert_eq!(e.time_left(), TimeLeft::Minutes(4));

        let e = eta(TrainLine::Brown, "20240315 10:01:00", true);
        assert_eq!(e.minutes_left(), 1);
        assert_eq!(e.time_left(), TimeLeft::Due);
    }

    #[test]
    fn rail_arrival_lines() {
        let arrival = RailArrival {
            station_id: StationId(40380),
            station_name: "Clark/Lake".into(),
            etas: vec![
                eta(TrainLine::Pink, "20240315 10:02:00", false),
                eta(TrainLine::Brown, "20240315 10:03:00", false),
                eta(TrainLine::Pink, "20240315 10:09:00", false),
            ],
        };
        assert_eq!(arrival.lines(), vec![TrainLine::Pink, TrainLine::Brown]);
        assert!(!arrival.is_empty());
    }

    #[test]
    fn bus_delay_overrides_minutes() {
        let bus = BusArrival {
            stop_id: BusStopId(1855),
            stop_name: "Clark & Lake".into(),
            route_id: RouteId::parse("22").unwrap(),
            route_direction: "Northbound".into(),
            destination_name: "Howard".into(),
            vehicle_id: Some("1768".into()),
            distance_to_stop: Some(4200),
            prediction_timestamp: parse_feed_timestamp("20240315 10:00").unwrap(),
            expected_timestamp: parse_feed_timestamp("20240315 10:12").unwrap(),
            is_delayed: true,
        };
        assert_eq!(bus.minutes_left(), 12);
        assert_eq!(bus.time_left(), TimeLeft::Delayed);
    }
}
