//! Aggregator configuration.
//!
//! The per-call identifier ceilings (4 stations for rail, 10 stop pairs
//! for bus) are undocumented limits of the upstream services, so they are
//! plain settings here and can be overridden from the environment.

use std::time::Duration;

use crate::domain::Source;

/// Default base URL for the rail arrivals API.
pub const DEFAULT_RAIL_BASE_URL: &str = "http://lapi.transitchicago.com/api/1.0";

/// Default base URL for the bus predictions API.
pub const DEFAULT_BUS_BASE_URL: &str = "http://www.ctabustracker.com/bustime/api/v1";

/// Default URL of the bike-share station feed.
pub const DEFAULT_BIKE_BASE_URL: &str = "http://www.divvybikes.com/stations/json";

/// Default maximum stations per rail arrivals call.
pub const DEFAULT_RAIL_BATCH_SIZE: usize = 4;

/// Default maximum (route, stop) pairs per bus predictions call.
pub const DEFAULT_BUS_BATCH_SIZE: usize = 10;

/// Default maximum in-flight batches per source.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Errors building configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held something unusable
    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: String, value: String },

    /// A batch size or concurrency limit of zero
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Where and how to reach one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoint {
    /// Base URL (the bike endpoint is the full feed URL)
    pub base_url: String,
    /// API key, sent as the `key` query parameter when non-empty
    pub api_key: String,
    /// Maximum identifiers per call
    pub max_per_batch: usize,
}

impl SourceEndpoint {
    pub fn new(base_url: impl Into<String>, max_per_batch: usize) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: String::new(),
            max_per_batch,
        }
    }
}

/// Configuration for an aggregation cycle and its HTTP connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub rail: SourceEndpoint,
    pub bus: SourceEndpoint,
    pub bike: SourceEndpoint,
    /// Maximum batches of one source fetched at the same time
    pub max_concurrent_batches: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// `host:port` dialled to decide whether the network is reachable
    pub probe_addr: String,
    /// Seconds between background refreshes
    pub refresh_interval_secs: u64,
    /// Address the HTTP server listens on
    pub bind_addr: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            rail: SourceEndpoint::new(DEFAULT_RAIL_BASE_URL, DEFAULT_RAIL_BATCH_SIZE),
            bus: SourceEndpoint::new(DEFAULT_BUS_BASE_URL, DEFAULT_BUS_BATCH_SIZE),
            bike: SourceEndpoint::new(DEFAULT_BIKE_BASE_URL, usize::MAX),
            max_concurrent_batches: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            probe_addr: "lapi.transitchicago.com:80".to_string(),
            refresh_interval_secs: 60,
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl AggregatorConfig {
    /// Create a config with API keys for the two tracker feeds.
    pub fn new(rail_api_key: impl Into<String>, bus_api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.rail.api_key = rail_api_key.into();
        config.bus.api_key = bus_api_key.into();
        config
    }

    /// Endpoint settings for one source.
    pub fn endpoint(&self, source: Source) -> &SourceEndpoint {
        match source {
            Source::Rail => &self.rail,
            Source::Bus => &self.bus,
            Source::Bike => &self.bike,
        }
    }

    /// Set a custom rail base URL (for testing).
    pub fn with_rail_base_url(mut self, url: impl Into<String>) -> Self {
        self.rail.base_url = url.into();
        self
    }

    /// Set a custom bus base URL (for testing).
    pub fn with_bus_base_url(mut self, url: impl Into<String>) -> Self {
        self.bus.base_url = url.into();
        self
    }

    /// Set a custom bike feed URL (for testing).
    pub fn with_bike_url(mut self, url: impl Into<String>) -> Self {
        self.bike.base_url = url.into();
        self
    }

    pub fn with_rail_batch_size(mut self, n: usize) -> Self {
        self.rail.max_per_batch = n;
        self
    }

    pub fn with_bus_batch_size(mut self, n: usize) -> Self {
        self.bus.max_per_batch = n;
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent_batches = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Check the limits that would otherwise stall a cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rail.max_per_batch == 0 {
            return Err(ConfigError::Zero("rail batch size"));
        }
        if self.bus.max_per_batch == 0 {
            return Err(ConfigError::Zero("bus batch size"));
        }
        if self.max_concurrent_batches == 0 {
            return Err(ConfigError::Zero("max concurrent batches"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Zero("refresh interval"));
        }
        Ok(())
    }

    /// Build a config from `TRANSIT_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("TRANSIT_RAIL_API_KEY") {
            config.rail.api_key = v;
        }
        if let Some(v) = lookup("TRANSIT_BUS_API_KEY") {
            config.bus.api_key = v;
        }
        if let Some(v) = lookup("TRANSIT_RAIL_BASE_URL") {
            config.rail.base_url = v;
        }
        if let Some(v) = lookup("TRANSIT_BUS_BASE_URL") {
            config.bus.base_url = v;
        }
        if let Some(v) = lookup("TRANSIT_BIKE_URL") {
            config.bike.base_url = v;
        }
        if let Some(v) = lookup("TRANSIT_PROBE_ADDR") {
            config.probe_addr = v;
        }
        if let Some(v) = lookup("TRANSIT_BIND_ADDR") {
            config.bind_addr = v;
        }

        if let Some(n) = parse_var(&lookup, "TRANSIT_RAIL_BATCH_SIZE")? {
            config.rail.max_per_batch = n;
        }
        if let Some(n) = parse_var(&lookup, "TRANSIT_BUS_BATCH_SIZE")? {
            config.bus.max_per_batch = n;
        }
        if let Some(n) = parse_var(&lookup, "TRANSIT_MAX_CONCURRENT")? {
            config.max_concurrent_batches = n;
        }
        if let Some(n) = parse_var(&lookup, "TRANSIT_TIMEOUT_SECS")? {
            config.timeout_secs = n;
        }
        if let Some(n) = parse_var(&lookup, "TRANSIT_REFRESH_SECS")? {
            config.refresh_interval_secs = n;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar {
                var: var.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn config_defaults() {
        let config = AggregatorConfig::default();

        assert_eq!(config.rail.max_per_batch, 4);
        assert_eq!(config.bus.max_per_batch, 10);
        assert_eq!(config.rail.base_url, DEFAULT_RAIL_BASE_URL);
        assert_eq!(config.max_concurrent_batches, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = AggregatorConfig::new("rail-key", "bus-key")
            .with_rail_base_url("http://localhost:8080/rail")
            .with_bus_base_url("http://localhost:8080/bus")
            .with_bike_url("http://localhost:8080/bike.json")
            .with_rail_batch_size(2)
            .with_bus_batch_size(5)
            .with_max_concurrent(1)
            .with_timeout(5);

        assert_eq!(config.rail.api_key, "rail-key");
        assert_eq!(config.endpoint(Source::Bus).api_key, "bus-key");
        assert_eq!(config.endpoint(Source::Bike).base_url, "http://localhost:8080/bike.json");
        assert_eq!(config.rail.max_per_batch, 2);
        assert_eq!(config.bus.max_per_batch, 5);
        assert_eq!(config.max_concurrent_batches, 1);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn zero_limits_rejected() {
        let config = AggregatorConfig::default().with_rail_batch_size(0);
        assert_eq!(config.validate(), Err(ConfigError::Zero("rail batch size")));

        let config = AggregatorConfig::default().with_max_concurrent(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides() {
        let config = AggregatorConfig::from_lookup(lookup(&[
            ("TRANSIT_RAIL_API_KEY", "abc"),
            ("TRANSIT_RAIL_BATCH_SIZE", "3"),
            ("TRANSIT_BUS_BATCH_SIZE", " 8 "),
            ("TRANSIT_REFRESH_SECS", "30"),
            ("TRANSIT_BIND_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.rail.api_key, "abc");
        assert_eq!(config.rail.max_per_batch, 3);
        assert_eq!(config.bus.max_per_batch, 8);
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.bus.base_url, DEFAULT_BUS_BASE_URL);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn env_invalid_values() {
        let err =
            AggregatorConfig::from_lookup(lookup(&[("TRANSIT_RAIL_BATCH_SIZE", "four")]))
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for TRANSIT_RAIL_BATCH_SIZE: \"four\""
        );

        let err = AggregatorConfig::from_lookup(lookup(&[("TRANSIT_BUS_BATCH_SIZE", "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Zero("bus batch size"));
    }
}
