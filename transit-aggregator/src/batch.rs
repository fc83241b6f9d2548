//! Request batching.
//!
//! Each upstream feed caps how many identifiers one call may carry. These
//! helpers split a request list into chunks under that cap while keeping
//! the original order, so that concatenating the batches reproduces the
//! request exactly once.

/// Errors from batching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// A batch size of zero can never make progress.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    /// Correlated lists must pair up one-to-one.
    #[error("correlated lists differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Split `ids` into order-preserving chunks of at most `max_per_batch`.
///
/// An empty input yields no batches.
///
/// # Examples
///
/// ```
/// use transit_aggregator::batch::batch;
///
/// let batches = batch(&[1, 2, 3, 4, 5, 6], 4).unwrap();
/// assert_eq!(batches, vec![vec![1, 2, 3, 4], vec![5, 6]]);
///
/// assert!(batch::<u32>(&[], 4).unwrap().is_empty());
/// ```
pub fn batch<T: Clone>(ids: &[T], max_per_batch: usize) -> Result<Vec<Vec<T>>, BatchError> {
    if max_per_batch == 0 {
        return Err(BatchError::ZeroBatchSize);
    }
    Ok(ids.chunks(max_per_batch).map(<[T]>::to_vec).collect())
}

/// Split two correlated lists using the same chunk boundaries.
///
/// Position `i` of the `k`th left batch still pairs with position `i` of
/// the `k`th right batch.
pub fn batch_pairs<A: Clone, B: Clone>(
    left: &[A],
    right: &[B],
    max_per_batch: usize,
) -> Result<Vec<(Vec<A>, Vec<B>)>, BatchError> {
    if left.len() != right.len() {
        return Err(BatchError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    let lefts = batch(left, max_per_batch)?;
    let rights = batch(right, max_per_batch)?;
    Ok(lefts.into_iter().zip(rights).collect())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn concatenation_reproduces_input(
            ids in prop::collection::vec(any::<u32>(), 0..64),
            max in 1usize..16,
        ) {
            let batches = batch(&ids, max).unwrap();
            let flattened: Vec<u32> = batches.iter().flatten().copied().collect();
            prop_assert_eq!(flattened, ids.clone());
            prop_assert_eq!(batches.len(), ids.len().div_ceil(max));
            prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= max));
        }

        #[test]
        fn only_last_batch_is_short(
            ids in prop::collection::vec(any::<u16>(), 1..64),
            max in 1usize..16,
        ) {
            let batches = batch(&ids, max).unwrap();
            let (last, full) = batches.split_last().unwrap();
            prop_assert!(full.iter().all(|b| b.len() == max));
            prop_assert!(last.len() <= max);
        }

        #[test]
        fn paired_batches_stay_aligned(
            pairs in prop::collection::vec((any::<u8>(), any::<u32>()), 0..48),
            max in 1usize..12,
        ) {
            let (routes, stops): (Vec<u8>, Vec<u32>) = pairs.iter().copied().unzip();
            let batches = batch_pairs(&routes, &stops, max).unwrap();

            let rebuilt: Vec<(u8, u32)> = batches
                .iter()
                .flat_map(|(r, s)| {
                    assert_eq!(r.len(), s.len());
                    r.iter().copied().zip(s.iter().copied())
                })
                .collect();
            prop_assert_eq!(rebuilt, pairs);
        }
    }
}
