//! HTTP connector for the live feeds.
//!
//! Rail and bus use the tracker APIs' query-string form: an API `key`,
//! then repeated `mapid` parameters for rail or comma-joined `rt` and
//! `stpid` lists for bus. The bike feed is a single unparameterised URL.

use reqwest::Url;
use tracing::debug;

use crate::config::{AggregatorConfig, SourceEndpoint};

use super::error::ConnectError;
use super::{BatchQuery, RawPayload, SourceConnector};

/// Path of the rail arrivals endpoint under the rail base URL.
const RAIL_ARRIVALS_PATH: &str = "ttarrivals.aspx";

/// Path of the bus predictions endpoint under the bus base URL.
const BUS_PREDICTIONS_PATH: &str = "getpredictions";

/// Longest response body kept in a status error.
const MAX_ERROR_BODY: usize = 500;

/// Live connector backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    rail: SourceEndpoint,
    bus: SourceEndpoint,
    bike: SourceEndpoint,
}

impl HttpConnector {
    /// Create a connector from the endpoints and timeout in `config`.
    pub fn new(config: &AggregatorConfig) -> Result<Self, ConnectError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            rail: config.rail.clone(),
            bus: config.bus.clone(),
            bike: config.bike.clone(),
        })
    }

    /// Build the request URL for one batch.
    pub fn url_for(&self, query: &BatchQuery) -> Result<Url, ConnectError> {
        match query {
            BatchQuery::Rail(ids) => {
                let mut params = key_param(&self.rail);
                params.extend(ids.iter().map(|id| ("mapid", id.to_string())));
                endpoint_url(&self.rail.base_url, RAIL_ARRIVALS_PATH, &params)
            }
            BatchQuery::Bus(pairs) => {
                let routes: Vec<&str> = pairs.iter().map(|p| p.route_id.as_str()).collect();
                let stops: Vec<String> = pairs.iter().map(|p| p.stop_id.to_string()).collect();

                let mut params = key_param(&self.bus);
                params.push(("rt", routes.join(",")));
                params.push(("stpid", stops.join(",")));
                endpoint_url(&self.bus.base_url, BUS_PREDICTIONS_PATH, &params)
            }
            BatchQuery::Bike => Url::parse(&self.bike.base_url).map_err(|e| ConnectError::Url {
                url: self.bike.base_url.clone(),
                message: e.to_string(),
            }),
        }
    }
}

fn key_param(endpoint: &SourceEndpoint) -> Vec<(&'static str, String)> {
    if endpoint.api_key.is_empty() {
        Vec::new()
    } else {
        vec![("key", endpoint.api_key.clone())]
    }
}

fn endpoint_url(
    base: &str,
    path: &str,
    params: &[(&'static str, String)],
) -> Result<Url, ConnectError> {
    let url = format!("{}/{}", base.trim_end_matches('/'), path);
    Url::parse_with_params(&url, params).map_err(|e| ConnectError::Url {
        url,
        message: e.to_string(),
    })
}

impl SourceConnector for HttpConnector {
    async fn fetch(&self, query: &BatchQuery) -> Result<RawPayload, ConnectError> {
        let url = self.url_for(query)?;
        debug!(source = %query.source(), ids = query.len(), "fetching batch");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ConnectError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ConnectError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(response.text().await?)
    }
}
