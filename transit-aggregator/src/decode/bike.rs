//! Bike-share station feed decoder.
//!
//! The feed is a single JSON document listing every dock station under
//! `stationBeanList`. Fields other than id, name and coordinates are
//! frequently omitted, so the DTO uses `Option` liberally.

use serde::Deserialize;
use tracing::warn;

use crate::domain::{BikeStation, BikeStationId};

use super::error::DecodeError;

/// Top-level feed document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BikeFeed {
    /// When the feed was generated, e.g. "2013-07-28 02:48:01 PM".
    pub execution_time: Option<String>,

    /// Stations, kept as raw values so one bad entry does not sink the rest.
    pub station_bean_list: Vec<serde_json::Value>,
}

/// One station entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationBean {
    pub id: u32,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub available_bikes: Option<u32>,
    pub available_docks: Option<u32>,
    pub total_docks: Option<u32>,
    /// e.g. "In Service", "Not In Service".
    pub status_value: Option<String>,
    pub st_address1: Option<String>,
}

impl From<StationBean> for BikeStation {
    fn from(bean: StationBean) -> Self {
        BikeStation {
            id: BikeStationId(bean.id),
            name: bean.station_name,
            latitude: bean.latitude,
            longitude: bean.longitude,
            available_bikes: bean.available_bikes,
            available_docks: bean.available_docks,
            total_docks: bean.total_docks,
            status: bean.status_value,
            address: bean.st_address1.filter(|a| !a.trim().is_empty()),
        }
    }
}

/// Decode the station feed, in feed order.
pub fn decode_bike(json: &str) -> Result<Vec<BikeStation>, DecodeError> {
    let feed: BikeFeed = serde_json::from_str(json)?;

    let mut stations = Vec::with_capacity(feed.station_bean_list.len());
    for value in feed.station_bean_list {
        match serde_json::from_value::<StationBean>(value) {
            Ok(bean) => stations.push(bean.into()),
            Err(e) => warn!(error = %e, "skipping bike station"),
        }
    }
    Ok(stations)
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub fn bean_json(id: u32, name: &str, bikes: u32) -> String {
        format!(
            r#"{{"id":{id},"stationName":"{name}","availableDocks":10,"totalDocks":19,
                "latitude":41.87395806,"longitude":-87.62773949,"statusValue":"In Service",
                "availableBikes":{bikes},"stAddress1":"{name}"}}"#
        )
    }

    pub fn feed_json(beans: &[String]) -> String {
        format!(
            r#"{{"executionTime":"2013-07-28 02:48:01 PM","stationBeanList":[{}]}}"#,
            beans.join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn decode_feed() {
        let json = feed_json(&[
            bean_json(5, "State St & Harrison St", 9),
            bean_json(13, "Wilton Ave & Diversey Pkwy", 2),
        ]);
        let stations = decode_bike(&json).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, BikeStationId(5));
        assert_eq!(stations[0].name, "State St & Harrison St");
        assert_eq!(stations[0].available_bikes, Some(9));
        assert_eq!(stations[0].available_docks, Some(10));
        assert_eq!(stations[0].status.as_deref(), Some("In Service"));
    }

    #[test]
    fn missing_optional_fields() {
        let json = r#"{"stationBeanList":[
            {"id":5,"stationName":"State St & Harrison St","latitude":41.87,"longitude":-87.62,
             "stAddress1":""}
        ]}"#;
        let stations = decode_bike(json).unwrap();

        assert_eq!(stations[0].available_bikes, None);
        assert_eq!(stations[0].available_docks, None);
        assert_eq!(stations[0].total_docks, None);
        assert_eq!(stations[0].address, None);
    }

    #[test]
    fn skips_station_without_name() {
        let json = feed_json(&[
            r#"{"id":7,"latitude":41.0,"longitude":-87.0}"#.to_string(),
            bean_json(5, "State St & Harrison St", 9),
        ]);
        let stations = decode_bike(&json).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, BikeStationId(5));
    }

    #[test]
    fn wrong_shape_fails() {
        assert!(matches!(decode_bike("{}"), Err(DecodeError::Json(_))));
        assert!(matches!(decode_bike("<html/>"), Err(DecodeError::Json(_))));
    }
}
