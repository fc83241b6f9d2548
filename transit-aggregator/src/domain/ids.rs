//! Identifier types for the three transit sources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct InvalidId {
    kind: &'static str,
    value: String,
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Parse an identifier from its decimal wire form.
            ///
            /// Surrounding whitespace is ignored.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                s.trim().parse::<u32>().map($name).map_err(|_| InvalidId {
                    kind: $kind,
                    value: s.to_string(),
                })
            }

            /// Returns the raw numeric value.
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// A rail station (the upstream "map id", e.g. `40380` for Clark/Lake).
    StationId,
    "station"
);

numeric_id!(
    /// A directional platform within a rail station (e.g. `30074`).
    StopId,
    "stop"
);

numeric_id!(
    /// A bus stop.
    BusStopId,
    "bus stop"
);

numeric_id!(
    /// A bike-share dock station.
    BikeStationId,
    "bike station"
);

/// A bus route designator such as `"22"` or `"X9"`.
///
/// Route ids are short alphanumeric strings; they are case-sensitive
/// upstream, so no normalisation is applied beyond trimming.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Parse a route id. Empty strings and embedded commas are rejected,
    /// since route lists are comma-joined on the wire.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains(',') {
            return Err(InvalidId {
                kind: "route",
                value: s.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the route id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_ids() {
        assert_eq!(StationId::parse("40380").unwrap(), StationId(40380));
        assert_eq!(StopId::parse(" 30074 ").unwrap(), StopId(30074));
        assert_eq!(BusStopId::parse("1855").unwrap().get(), 1855);
        assert_eq!("5".parse::<BikeStationId>().unwrap(), BikeStationId(5));
    }

    #[test]
    fn reject_bad_numeric_ids() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("-1").is_err());
        assert!(StopId::parse("30a74").is_err());

        let err = StationId::parse("abc").unwrap_err();
        assert_eq!(err.to_string(), "invalid station id: \"abc\"");
    }

    #[test]
    fn route_ids() {
        assert_eq!(RouteId::parse(" X9 ").unwrap().as_str(), "X9");
        assert!(RouteId::parse("").is_err());
        assert!(RouteId::parse("22,36").is_err());
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(StationId(40380).to_string(), "40380");
        assert_eq!(format!("{:?}", StationId(40380)), "StationId(40380)");
        assert_eq!(format!("{:?}", RouteId::parse("22").unwrap()), "RouteId(22)");
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&StationId(40380)).unwrap();
        assert_eq!(json, "40380");
        let route: RouteId = serde_json::from_str("\"22\"").unwrap();
        assert_eq!(route.as_str(), "22");
    }
}
