//! Bus predictions decoder.
//!
//! The predictions feed answers with a `<bustime-response>` holding
//! `<prd>` elements and, per stop that has nothing to report, an `<error>`
//! element. Some of those errors are really "no data" markers and are
//! surfaced as [`NoServiceNotice`]s instead of failures.

use roxmltree::{Document, Node};
use tracing::warn;

use crate::domain::{BusArrival, BusStopId, NoServiceNotice, RouteId, parse_feed_timestamp};

use super::error::{DecodeError, RecordError};
use super::xml::{child_text, expect_root, optional_number, required};

/// Messages the feed uses to say "nothing to show here".
pub const NO_DATA_MARKERS: [&str; 3] = [
    "No service scheduled",
    "No arrival times",
    "No data found for parameter",
];

/// Decoded contents of one predictions payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusPredictions {
    pub arrivals: Vec<BusArrival>,
    pub no_service: Vec<NoServiceNotice>,
}

impl BusPredictions {
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.no_service.is_empty()
    }
}

/// Whether an `<error>` message is one of the feed's "no data" markers.
pub fn is_no_data_marker(message: &str) -> bool {
    NO_DATA_MARKERS.iter().any(|m| message.starts_with(m))
}

/// Decode one predictions payload.
///
/// Errors that are not "no data" markers fail the batch only when the
/// payload carries nothing else. Otherwise they are kept as notices so the
/// affected stop still shows up.
pub fn decode_bus(xml: &str) -> Result<BusPredictions, DecodeError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    expect_root(root, "bustime-response")?;

    let mut out = BusPredictions::default();
    let mut upstream_errors: Vec<NoServiceNotice> = Vec::new();

    for node in root.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "prd" => match decode_prd(node) {
                Ok(arrival) => out.arrivals.push(arrival),
                Err(e) => warn!(error = %e, "skipping bus prediction"),
            },
            "error" => {
                let notice = decode_error(node);
                if is_no_data_marker(&notice.message) {
                    out.no_service.push(notice);
                } else {
                    upstream_errors.push(notice);
                }
            }
            _ => {}
        }
    }

    if let Some(first) = upstream_errors.first() {
        if out.is_empty() {
            return Err(DecodeError::Upstream {
                code: None,
                message: first.message.clone(),
            });
        }
        warn!(
            errors = upstream_errors.len(),
            first = %first.message,
            "bus payload carried errors alongside data"
        );
        out.no_service.extend(upstream_errors);
    }

    Ok(out)
}

fn decode_error(node: Node<'_, '_>) -> NoServiceNotice {
    NoServiceNotice {
        route_id: child_text(node, "rt").and_then(|r| RouteId::parse(r).ok()),
        stop_id: child_text(node, "stpid").and_then(|s| BusStopId::parse(s).ok()),
        message: child_text(node, "msg").unwrap_or("unknown error").to_string(),
    }
}

fn decode_prd(node: Node<'_, '_>) -> Result<BusArrival, RecordError> {
    let stop_raw = required(node, "stpid")?;
    let stop_id =
        BusStopId::parse(stop_raw).map_err(|_| RecordError::invalid("stpid", stop_raw))?;

    let route_raw = required(node, "rt")?;
    let route_id = RouteId::parse(route_raw).map_err(|_| RecordError::invalid("rt", route_raw))?;

    let tmstmp = required(node, "tmstmp")?;
    let prediction_timestamp =
        parse_feed_timestamp(tmstmp).map_err(|_| RecordError::invalid("tmstmp", tmstmp))?;

    let prdtm = required(node, "prdtm")?;
    let expected_timestamp =
        parse_feed_timestamp(prdtm).map_err(|_| RecordError::invalid("prdtm", prdtm))?;

    Ok(BusArrival {
        stop_id,
        stop_name: child_text(node, "stpnm").unwrap_or_default().to_string(),
        route_id,
        route_direction: child_text(node, "rtdir").unwrap_or_default().to_string(),
        destination_name: child_text(node, "des").unwrap_or_default().to_string(),
        vehicle_id: child_text(node, "vid").map(str::to_string),
        distance_to_stop: optional_number(node, "dstp"),
        prediction_timestamp,
        expected_timestamp,
        is_delayed: matches!(child_text(node, "dly"), Some("true" | "1")),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Payload builders shared with pipeline tests.

    pub fn prd_xml(route: &str, stop: u32, direction: &str, prdtm: &str) -> String {
        format!(
            "<prd>\
               <tmstmp>20130620 15:45</tmstmp><typ>A</typ>\
               <stpnm>Stop {stop}</stpnm><stpid>{stop}</stpid><vid>1768</vid>\
               <dstp>4200</dstp><rt>{route}</rt><rtdir>{direction}</rtdir>\
               <des>Howard</des><prdtm>20130620 {prdtm}</prdtm>\
             </prd>"
        )
    }

    pub fn no_service_xml(route: &str, stop: u32) -> String {
        format!(
            "<error><rt>{route}</rt><stpid>{stop}</stpid>\
             <msg>No service scheduled</msg></error>"
        )
    }

    pub fn bustime(items: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\"?><bustime-response>{}</bustime-response>",
            items.concat()
        )
    }
}
