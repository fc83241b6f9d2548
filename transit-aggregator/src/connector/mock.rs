//! Scripted connector for tests and offline development.
//!
//! Replies are looked up by exact query first, then by source. Every call
//! is recorded so tests can check how a cycle batched its requests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::Source;

use super::error::ConnectError;
use super::{BatchQuery, RawPayload, SourceConnector};

#[derive(Debug, Clone)]
enum Reply {
    Payload(RawPayload),
    Status(u16),
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Option<Duration>,
}

/// Connector that serves canned payloads instead of calling the network.
#[derive(Debug, Default)]
pub struct MockConnector {
    by_query: HashMap<BatchQuery, Scripted>,
    by_source: HashMap<Source, Scripted>,
    calls: Mutex<Vec<BatchQuery>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fallback payloads from a directory.
    ///
    /// Looks for `rail.xml`, `bus.xml` and `bike.json`; any subset may be
    /// present but at least one is required.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, ConnectError> {
        let data_dir = data_dir.as_ref();
        let mut mock = Self::new();

        for (source, file) in [
            (Source::Rail, "rail.xml"),
            (Source::Bus, "bus.xml"),
            (Source::Bike, "bike.json"),
        ] {
            let path = data_dir.join(file);
            if !path.is_file() {
                continue;
            }
            let payload = std::fs::read_to_string(&path).map_err(|e| ConnectError::Fixture {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            mock = mock.with_source_payload(source, payload);
        }

        if mock.by_source.is_empty() {
            return Err(ConnectError::Fixture {
                path: data_dir.display().to_string(),
                message: "no rail.xml, bus.xml or bike.json found".to_string(),
            });
        }

        Ok(mock)
    }

    /// Reply to exactly `query` with `payload`.
    pub fn with_payload(mut self, query: BatchQuery, payload: impl Into<RawPayload>) -> Self {
        self.by_query.insert(
            query,
            Scripted {
                reply: Reply::Payload(payload.into()),
                delay: None,
            },
        );
        self
    }

    /// Reply to exactly `query` with `payload` after `delay`.
    pub fn with_delayed_payload(
        mut self,
        query: BatchQuery,
        payload: impl Into<RawPayload>,
        delay: Duration,
    ) -> Self {
        self.by_query.insert(
            query,
            Scripted {
                reply: Reply::Payload(payload.into()),
                delay: Some(delay),
            },
        );
        self
    }

    /// Fail exactly `query` with an HTTP status.
    pub fn with_failure(mut self, query: BatchQuery, status: u16) -> Self {
        self.by_query.insert(
            query,
            Scripted {
                reply: Reply::Status(status),
                delay: None,
            },
        );
        self
    }

    /// Reply to any query for `source` that has no exact script.
    pub fn with_source_payload(mut self, source: Source, payload: impl Into<RawPayload>) -> Self {
        self.by_source.insert(
            source,
            Scripted {
                reply: Reply::Payload(payload.into()),
                delay: None,
            },
        );
        self
    }

    /// Fail any query for `source` that has no exact script.
    pub fn with_source_failure(mut self, source: Source, status: u16) -> Self {
        self.by_source.insert(
            source,
            Scripted {
                reply: Reply::Status(status),
                delay: None,
            },
        );
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<BatchQuery> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn script_for(&self, query: &BatchQuery) -> Option<Scripted> {
        self.by_query
            .get(query)
            .or_else(|| self.by_source.get(&query.source()))
            .cloned()
    }
}

impl SourceConnector for MockConnector {
    async fn fetch(&self, query: &BatchQuery) -> Result<RawPayload, ConnectError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        let script = self
            .script_for(query)
            .ok_or_else(|| ConnectError::Unscripted(query.to_string()))?;

        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }

        match script.reply {
            Reply::Payload(payload) => Ok(payload),
            Reply::Status(status) => Err(ConnectError::Status {
                status,
                message: format!("scripted failure for {query}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;

    #[tokio::test]
    async fn exact_script_beats_source_fallback() {
        let exact = BatchQuery::Rail(vec![StationId(40380)]);
        let other = BatchQuery::Rail(vec![StationId(40360)]);
        let mock = MockConnector::new()
            .with_payload(exact.clone(), "<exact/>")
            .with_source_payload(Source::Rail, "<fallback/>");

        assert_eq!(mock.fetch(&exact).await.unwrap(), "<exact/>");
        assert_eq!(mock.fetch(&other).await.unwrap(), "<fallback/>");
        assert_eq!(mock.calls(), vec![exact, other]);
    }

    #[tokio::test]
    async fn unscripted_and_failing_queries() {
        let failing = BatchQuery::Rail(vec![StationId(1)]);
        let mock = MockConnector::new().with_failure(failing.clone(), 503);

        let err = mock.fetch(&failing).await.unwrap_err();
        assert!(matches!(err, ConnectError::Status { status: 503, .. }));

        let err = mock.fetch(&BatchQuery::Bike).await.unwrap_err();
        assert_eq!(err.to_string(), "no mock response for bike");
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn from_dir_loads_present_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bike.json"), r#"{"stationBeanList":[]}"#).unwrap();

        let mock = MockConnector::from_dir(dir.path()).unwrap();
        assert!(mock.by_source.contains_key(&Source::Bike));
        assert!(!mock.by_source.contains_key(&Source::Rail));
    }

    #[test]
    fn from_dir_requires_a_payload() {
        let dir = tempfile::tempdir().unwrap();
        let err = MockConnector::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ConnectError::Fixture { .. }));
    }
}
