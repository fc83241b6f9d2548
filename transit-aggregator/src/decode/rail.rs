//! Rail arrivals decoder.
//!
//! The arrivals feed answers with a `<ctatt>` document: a header
//! (`tmst`, `errCd`, `errNm`) followed by one `<eta>` element per predicted
//! train, for every station requested in the call. Etas are regrouped by
//! station here.

use std::collections::HashMap;

use roxmltree::{Document, Node};
use tracing::warn;

use crate::domain::{
    Eta, Position, RailArrival, StationId, StopId, TrainDirection, TrainLine,
    parse_feed_timestamp,
};

use super::error::{DecodeError, RecordError};
use super::xml::{child_text, expect_root, flag, optional_number, required};

/// Decode one arrivals payload.
///
/// Stations appear in the order their first eta appears in the document.
/// Etas missing a required field are skipped with a warning rather than
/// failing the whole batch.
pub fn decode_rail(xml: &str) -> Result<Vec<RailArrival>, DecodeError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    expect_root(root, "ctatt")?;

    let code = child_text(root, "errCd").unwrap_or("0");
    if code != "0" {
        return Err(DecodeError::Upstream {
            code: Some(code.to_string()),
            message: child_text(root, "errNm")
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let mut arrivals: Vec<RailArrival> = Vec::new();
    let mut by_station: HashMap<StationId, usize> = HashMap::new();

    for node in root.children().filter(|n| n.has_tag_name("eta")) {
        let eta = match decode_eta(node) {
            Ok(eta) => eta,
            Err(e) => {
                warn!(error = %e, "skipping rail eta");
                continue;
            }
        };

        let idx = *by_station.entry(eta.station_id).or_insert_with(|| {
            arrivals.push(RailArrival {
                station_id: eta.station_id,
                station_name: eta.station_name.clone(),
                etas: Vec::new(),
            });
            arrivals.len() - 1
        });
        arrivals[idx].etas.push(eta);
    }

    Ok(arrivals)
}

fn decode_eta(node: Node<'_, '_>) -> Result<Eta, RecordError> {
    let station_raw = required(node, "staId")?;
    let station_id =
        StationId::parse(station_raw).map_err(|_| RecordError::invalid("staId", station_raw))?;

    let stop_raw = required(node, "stpId")?;
    let stop_id = StopId::parse(stop_raw).map_err(|_| RecordError::invalid("stpId", stop_raw))?;

    let route = required(node, "rt")?;
    let line = TrainLine::parse(route).map_err(|_| RecordError::invalid("rt", route))?;

    let prdt = required(node, "prdt")?;
    let prediction_timestamp =
        parse_feed_timestamp(prdt).map_err(|_| RecordError::invalid("prdt", prdt))?;

    let arr_t = required(node, "arrT")?;
    let expected_timestamp =
        parse_feed_timestamp(arr_t).map_err(|_| RecordError::invalid("arrT", arr_t))?;

    let position = match (
        optional_number::<f64>(node, "lat"),
        optional_number::<f64>(node, "lon"),
    ) {
        (Some(lat), Some(lon)) => Some(Position::new(lat, lon)),
        _ => None,
    };

    Ok(Eta {
        station_id,
        stop_id,
        station_name: child_text(node, "staNm").unwrap_or_default().to_string(),
        stop_description: child_text(node, "stpDe").unwrap_or_default().to_string(),
        run_number: child_text(node, "rn").map(str::to_string),
        line,
        destination_name: child_text(node, "destNm").unwrap_or_default().to_string(),
        direction: TrainDirection::from_route_code(child_text(node, "trDr").unwrap_or_default()),
        prediction_timestamp,
        expected_timestamp,
        is_approaching: flag(node, "isApp"),
        is_scheduled: flag(node, "isSch"),
        is_delayed: flag(node, "isDly"),
        is_fault: flag(node, "isFlt"),
        position,
        heading: optional_number(node, "heading"),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Payload builders shared with merge and pipeline tests.

    /// One `<eta>` element. `arr` is the arrival time on 2011-06-18.
    pub fn eta_xml(station: u32, stop: u32, route: &str, arr: &str) -> String {
        format!(
            "<eta>\
               <staId>{station}</staId><stpId>{stop}</stpId>\
               <staNm>Station {station}</staNm><stpDe>Service toward Loop</stpDe>\
               <rn>419</rn><rt>{route}</rt><destNm>Loop</destNm><trDr>1</trDr>\
               <prdt>20110618 23:26:00</prdt><arrT>20110618 {arr}</arrT>\
               <isApp>0</isApp><isSch>0</isSch><isDly>0</isDly><isFlt>0</isFlt>\
               <lat>41.97776</lat><lon>-87.77567</lon><heading>299</heading>\
             </eta>"
        )
    }

    pub fn ctatt(etas: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <ctatt><tmst>20110618 23:26:50</tmst><errCd>0</errCd><errNm/>{}</ctatt>",
            etas.concat()
        )
    }
}
