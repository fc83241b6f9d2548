//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::aggregate::{AggregationResult, Aggregator, CancelHandle, RefreshRequest};
use crate::catalog::Catalog;
use crate::connectivity::AnyProbe;
use crate::connector::AnyConnector;
use crate::filter::Preferences;

/// The aggregator the server runs.
pub type LiveAggregator = Aggregator<AnyConnector, AnyProbe>;

/// Shared application state.
///
/// Catalog and preferences are read-only for the life of the server; only
/// the latest result is replaced, once per completed cycle.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<LiveAggregator>,

    /// Static reference data
    pub catalog: Arc<Catalog>,

    /// The rider's favorites and hidden trains
    pub preferences: Arc<Preferences>,

    /// Cancels in-flight cycles on shutdown
    pub cancel: Arc<CancelHandle>,

    latest: Arc<RwLock<Option<AggregationResult>>>,
}

impl AppState {
    pub fn new(aggregator: LiveAggregator, catalog: Catalog, preferences: Preferences) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            catalog: Arc::new(catalog),
            preferences: Arc::new(preferences),
            cancel: Arc::new(CancelHandle::new()),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// What each cycle fetches.
    pub fn request(&self) -> RefreshRequest {
        RefreshRequest::from_preferences(&self.preferences)
    }

    /// Run a cycle now and keep its result as the latest.
    pub async fn refresh(&self) -> AggregationResult {
        let result = self
            .aggregator
            .refresh(
                &self.request(),
                self.catalog.as_ref(),
                self.preferences.as_ref(),
                &self.cancel.signal(),
            )
            .await;
        let mut latest = self.latest.write().await;
        // Overlapping cycles: keep whichever finished last.
        if latest
            .as_ref()
            .is_none_or(|prev| prev.completed_at <= result.completed_at)
        {
            *latest = Some(result.clone());
        }
        result
    }

    pub async fn latest(&self) -> Option<AggregationResult> {
        self.latest.read().await.clone()
    }

    /// The latest result, running a cycle first if there is none yet.
    pub async fn latest_or_refresh(&self) -> AggregationResult {
        match self.latest().await {
            Some(result) => result,
            None => self.refresh().await,
        }
    }
}
