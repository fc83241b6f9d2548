//! Rail lines and travel directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a line or direction code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {code:?}")]
pub struct UnknownCode {
    kind: &'static str,
    code: String,
}

/// One of the eight rail lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainLine {
    Red,
    Blue,
    Brown,
    Green,
    Orange,
    Purple,
    Pink,
    Yellow,
}

impl TrainLine {
    /// All lines, in the order they are usually listed.
    pub const ALL: [TrainLine; 8] = [
        TrainLine::Red,
        TrainLine::Blue,
        TrainLine::Brown,
        TrainLine::Green,
        TrainLine::Orange,
        TrainLine::Purple,
        TrainLine::Pink,
        TrainLine::Yellow,
    ];

    /// Parse a line from either the feed's route code (`Brn`, `G`, `Pexp`, ...)
    /// or its display name (`Brown`, `Green`, ...). Case-insensitive.
    ///
    /// ```
    /// use transit_aggregator::domain::TrainLine;
    ///
    /// assert_eq!(TrainLine::parse("Brn").unwrap(), TrainLine::Brown);
    /// assert_eq!(TrainLine::parse("pexp").unwrap(), TrainLine::Purple);
    /// assert!(TrainLine::parse("Silver").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<Self, UnknownCode> {
        let line = match code.trim().to_ascii_lowercase().as_str() {
            "red" => TrainLine::Red,
            "blue" => TrainLine::Blue,
            "brn" | "brown" => TrainLine::Brown,
            "g" | "green" => TrainLine::Green,
            "org" | "orange" => TrainLine::Orange,
            "p" | "pexp" | "purple" => TrainLine::Purple,
            "pink" => TrainLine::Pink,
            "y" | "yellow" => TrainLine::Yellow,
            _ => {
                return Err(UnknownCode {
                    kind: "line",
                    code: code.to_string(),
                });
            }
        };
        Ok(line)
    }

    /// Human-readable line name.
    pub fn name(self) -> &'static str {
        match self {
            TrainLine::Red => "Red",
            TrainLine::Blue => "Blue",
            TrainLine::Brown => "Brown",
            TrainLine::Green => "Green",
            TrainLine::Orange => "Orange",
            TrainLine::Purple => "Purple",
            TrainLine::Pink => "Pink",
            TrainLine::Yellow => "Yellow",
        }
    }
}

impl fmt::Display for TrainLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of travel served by a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainDirection {
    North,
    South,
    East,
    West,
    Unknown,
}

impl TrainDirection {
    /// Parse a direction from its one-letter reference-data code.
    pub fn parse(code: &str) -> Result<Self, UnknownCode> {
        match code.trim() {
            "N" | "n" => Ok(TrainDirection::North),
            "S" | "s" => Ok(TrainDirection::South),
            "E" | "e" => Ok(TrainDirection::East),
            "W" | "w" => Ok(TrainDirection::West),
            other => Err(UnknownCode {
                kind: "direction",
                code: other.to_string(),
            }),
        }
    }

    /// Map the arrivals feed's `trDr` route-direction code.
    ///
    /// The feed only distinguishes `1` (north/outbound) from `5`
    /// (south/inbound); the platform's compass direction comes from the
    /// reference catalog when available.
    pub fn from_route_code(code: &str) -> Self {
        match code.trim() {
            "1" => TrainDirection::North,
            "5" => TrainDirection::South,
            _ => TrainDirection::Unknown,
        }
    }
}

impl fmt::Display for TrainDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainDirection::North => "North",
            TrainDirection::South => "South",
            TrainDirection::East => "East",
            TrainDirection::West => "West",
            TrainDirection::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}
