//! Wire decoders.
//!
//! Each source speaks its own format:
//! - rail arrivals: XML `<ctatt>` documents
//! - bus predictions: XML `<bustime-response>` documents
//! - bike stations: a JSON `stationBeanList`
//!
//! Decoders are pure functions of the payload. Every batch is decoded on
//! its own, so a bad payload only ever affects its own batch.

mod bike;
mod bus;
mod error;
mod rail;
mod xml;

pub use bike::{BikeFeed, StationBean, decode_bike};
pub use bus::{BusPredictions, NO_DATA_MARKERS, decode_bus, is_no_data_marker};
pub use error::DecodeError;
pub use rail::decode_rail;

#[cfg(test)]
pub(crate) use bike::fixtures as bike_fixtures;
#[cfg(test)]
pub(crate) use bus::fixtures as bus_fixtures;
#[cfg(test)]
pub(crate) use rail::fixtures as rail_fixtures;

use crate::domain::{BikeStation, RailArrival, Source};

/// A decoder for one source's payloads.
///
/// The source pipeline is generic over this, which keeps the payload kind
/// a compile-time choice.
pub trait Decoder {
    /// Records produced from one payload.
    type Output;

    /// The source whose payloads this decodes.
    const SOURCE: Source;

    fn decode(payload: &str) -> Result<Self::Output, DecodeError>;
}

/// Decodes rail arrivals payloads.
pub struct RailDecoder;

/// Decodes bus predictions payloads.
pub struct BusDecoder;

/// Decodes bike station feed payloads.
pub struct BikeDecoder;

impl Decoder for RailDecoder {
    type Output = Vec<RailArrival>;
    const SOURCE: Source = Source::Rail;

    fn decode(payload: &str) -> Result<Self::Output, DecodeError> {
        decode_rail(payload)
    }
}

impl Decoder for BusDecoder {
    type Output = BusPredictions;
    const SOURCE: Source = Source::Bus;

    fn decode(payload: &str) -> Result<Self::Output, DecodeError> {
        decode_bus(payload)
    }
}

impl Decoder for BikeDecoder {
    type Output = Vec<BikeStation>;
    const SOURCE: Source = Source::Bike;

    fn decode(payload: &str) -> Result<Self::Output, DecodeError> {
        decode_bike(payload)
    }
}

/// One decoded payload, tagged by source.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBatch {
    Rail(Vec<RailArrival>),
    Bus(BusPredictions),
    Bike(Vec<BikeStation>),
}

impl DecodedBatch {
    pub fn source(&self) -> Source {
        match self {
            DecodedBatch::Rail(_) => Source::Rail,
            DecodedBatch::Bus(_) => Source::Bus,
            DecodedBatch::Bike(_) => Source::Bike,
        }
    }
}

/// Decode a payload whose source is only known at runtime.
pub fn decode(payload: &str, source: Source) -> Result<DecodedBatch, DecodeError> {
    Ok(match source {
        Source::Rail => DecodedBatch::Rail(RailDecoder::decode(payload)?),
        Source::Bus => DecodedBatch::Bus(BusDecoder::decode(payload)?),
        Source::Bike => DecodedBatch::Bike(BikeDecoder::decode(payload)?),
    })
}
