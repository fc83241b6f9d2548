//! One source's fetch-and-decode pipeline.
//!
//! Batches are fetched concurrently up to a limit and come back in request
//! order. A failed batch never stops the others; it is recorded and the
//! source is reported as failed once all batches are done.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::connector::{BatchQuery, ConnectError, SourceConnector};
use crate::decode::{DecodeError, Decoder};

use super::cancel::CancelSignal;

/// Why a single batch produced no data.
#[derive(Debug, thiserror::Error)]
pub enum FailureCause {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("cancelled")]
    Cancelled,
}

/// A failed batch, identified by its position in the request.
#[derive(Debug, thiserror::Error)]
#[error("batch {index} failed: {cause}")]
pub struct BatchFailure {
    pub index: usize,
    pub cause: FailureCause,
}

/// Decoded batches in request order, plus the batches that failed.
#[derive(Debug)]
pub struct SourceOutcome<T> {
    pub batches: Vec<T>,
    pub failures: Vec<BatchFailure>,
}

impl<T> SourceOutcome<T> {
    /// The source succeeded only if every batch did.
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch and decode `queries` for the source `D` decodes.
///
/// An empty query list makes no calls and is a success.
pub async fn run_source<D, C>(
    connector: &C,
    queries: Vec<BatchQuery>,
    max_concurrent: usize,
    cancel: &CancelSignal,
) -> SourceOutcome<D::Output>
where
    D: Decoder,
    C: SourceConnector,
{
    let total = queries.len();
    let results: Vec<Result<D::Output, BatchFailure>> = stream::iter(queries.into_iter().enumerate())
        .map(move |(index, query)| async move {
            fetch_batch::<D, C>(connector, index, &query, cancel)
                .await
                .map_err(|cause| BatchFailure { index, cause })
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut outcome = SourceOutcome {
        batches: Vec::with_capacity(total),
        failures: Vec::new(),
    };
    for result in results {
        match result {
            Ok(batch) => outcome.batches.push(batch),
            Err(failure) => {
                warn!(source = %D::SOURCE, batch = failure.index, error = %failure.cause, "batch failed");
                outcome.failures.push(failure);
            }
        }
    }

    debug!(
        source = %D::SOURCE,
        batches = total,
        failed = outcome.failures.len(),
        "source pipeline finished"
    );
    outcome
}

async fn fetch_batch<D, C>(
    connector: &C,
    index: usize,
    query: &BatchQuery,
    cancel: &CancelSignal,
) -> Result<D::Output, FailureCause>
where
    D: Decoder,
    C: SourceConnector,
{
    if cancel.is_cancelled() {
        return Err(FailureCause::Cancelled);
    }

    let payload = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FailureCause::Cancelled),
        fetched = connector.fetch(query) => fetched?,
    };

    debug!(source = %D::SOURCE, batch = index, bytes = payload.len(), "decoding batch");
    Ok(D::decode(&payload)?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::aggregate::cancel::CancelHandle;
    use crate::connector::MockConnector;
    use crate::decode::RailDecoder;
    use crate::decode::rail_fixtures::{ctatt, eta_xml};
    use crate::domain::StationId;

    fn rail_query(ids: &[u32]) -> BatchQuery {
        BatchQuery::Rail(ids.iter().copied().map(StationId).collect())
    }

    fn rail_payload(ids: &[u32]) -> String {
        let etas: Vec<String> = ids
            .iter()
            .map(|id| eta_xml(*id, 30000, "Red", "23:30:00"))
            .collect();
        ctatt(&etas)
    }

    #[tokio::test]
    async fn empty_request_makes_no_calls() {
        let mock = MockConnector::new();
        let outcome =
            run_source::<RailDecoder, _>(&mock, Vec::new(), 4, &CancelSignal::never()).await;

        assert!(outcome.ok());
        assert!(outcome.batches.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn results_keep_request_order_when_completion_is_reversed() {
        let mock = MockConnector::new()
            .with_delayed_payload(rail_query(&[1]), rail_payload(&[1]), Duration::from_millis(60))
            .with_delayed_payload(rail_query(&[2]), rail_payload(&[2]), Duration::from_millis(30))
            .with_payload(rail_query(&[3]), rail_payload(&[3]));

        let queries = vec![rail_query(&[1]), rail_query(&[2]), rail_query(&[3])];
        let outcome = run_source::<RailDecoder, _>(&mock, queries, 3, &CancelSignal::never()).await;

        assert!(outcome.ok());
        let order: Vec<StationId> = outcome
            .batches
            .iter()
            .map(|batch| batch[0].station_id)
            .collect();
        assert_eq!(order, vec![StationId(1), StationId(2), StationId(3)]);
    }

    #[tokio::test]
    async fn failures_are_recorded_with_their_index() {
        let mock = MockConnector::new()
            .with_payload(rail_query(&[1]), rail_payload(&[1]))
            .with_failure(rail_query(&[2]), 500)
            .with_payload(rail_query(&[3]), "<not-ctatt/>");

        let queries = vec![rail_query(&[1]), rail_query(&[2]), rail_query(&[3])];
        let outcome = run_source::<RailDecoder, _>(&mock, queries, 2, &CancelSignal::never()).await;

        assert!(!outcome.ok());
        assert_eq!(outcome.batches.len(), 1);
        let failed: Vec<usize> = outcome.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![1, 2]);
        assert!(matches!(outcome.failures[0].cause, FailureCause::Connect(_)));
        assert!(matches!(outcome.failures[1].cause, FailureCause::Decode(_)));
    }

    #[tokio::test]
    async fn cancelled_before_start_skips_every_batch() {
        let mock = MockConnector::new().with_payload(rail_query(&[1]), rail_payload(&[1]));
        let handle = CancelHandle::new();
        handle.cancel();

        let outcome =
            run_source::<RailDecoder, _>(&mock, vec![rail_query(&[1])], 1, &handle.signal()).await;

        assert!(!outcome.ok());
        assert!(matches!(outcome.failures[0].cause, FailureCause::Cancelled));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn cancel_abandons_in_flight_batch() {
        let mock = MockConnector::new().with_delayed_payload(
            rail_query(&[1]),
            rail_payload(&[1]),
            Duration::from_secs(30),
        );
        let handle = CancelHandle::new();
        let signal = handle.signal();

        let run = run_source::<RailDecoder, _>(&mock, vec![rail_query(&[1])], 1, &signal);
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        };
        let (outcome, ()) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(run, cancel)
        })
        .await
        .unwrap();

        assert!(!outcome.ok());
        assert!(matches!(outcome.failures[0].cause, FailureCause::Cancelled));
    }
}
