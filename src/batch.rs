use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::KdError;
use crate::point::KdPoint;
use crate::solver::NnSolver;
use crate::tree::KdTree;

/// Cloneable handle used to cancel an in-flight batch from another thread.
///
/// Workers poll the token between queries and stop early once it trips; the
/// orchestrator then discards every partial result and surfaces
/// [`KdError::Cancelled`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Fans a batch of queries out over a fixed number of parallel workers, all
/// reading the same immutable tree.
///
/// The batch is split into contiguous partitions, one per worker; each worker
/// owns an independent [`NnSolver`] and answers its partition sequentially.
/// Results come back concatenated in partition order, so output order always
/// matches input order. The tree is never mutated after construction, which
/// is what makes the concurrent reads safe without any locking.
pub struct NnOrchestrator<'t> {
    tree: &'t KdTree,
    worker_count: usize,
    cancel: CancelToken,
}

impl<'t> NnOrchestrator<'t> {
    /// Creates an orchestrator bound to the tree with the given number of
    /// parallel workers.
    ///
    /// Panics if `worker_count` is zero.
    pub fn new(tree: &'t KdTree, worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker count must be at least 1");

        Self {
            tree,
            worker_count,
            cancel: CancelToken::new(),
        }
    }

    /// Handle for cancelling batches issued through this orchestrator.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Finds the nearest tree point for every query point, in input order.
    ///
    /// Each entry follows the single-query contract of
    /// [`NnSolver::find_nearest`], including the identity-based
    /// self-exclusion rule. Fails with [`KdError::Cancelled`] if the cancel
    /// token trips before all workers finish; no partial results are
    /// returned in that case.
    pub fn find_nearest_batch(
        &self,
        query_points: &[KdPoint],
    ) -> Result<Vec<Option<&'t KdPoint>>, KdError> {
        let partitions = self.partitions(query_points.len());

        let partial: Vec<Vec<Option<&'t KdPoint>>> = partitions
            .into_par_iter()
            .map(|partition| {
                let solver = NnSolver::new(self.tree);

                let mut results = Vec::with_capacity(partition.len());

                for query in &query_points[partition] {
                    if self.cancel.is_cancelled() {
                        break;
                    }

                    results.push(solver.find_nearest(query));
                }

                results
            })
            .collect();

        if self.cancel.is_cancelled() {
            return Err(KdError::Cancelled);
        }

        Ok(partial.into_iter().flatten().collect())
    }

    /// Splits `len` queries into `worker_count` contiguous partitions.
    ///
    /// Every partition spans `floor(len / worker_count)` queries except the
    /// last, which absorbs the remainder so that no trailing query is ever
    /// dropped.
    fn partitions(&self, len: usize) -> Vec<Range<usize>> {
        let batch_size = len / self.worker_count;

        let mut partitions = Vec::with_capacity(self.worker_count);
        let mut start = 0;

        for i in 0..self.worker_count {
            let end = if i == self.worker_count - 1 {
                len
            } else {
                len.min(start + batch_size)
            };

            partitions.push(start..end);
            start = end;
        }

        partitions
    }
}
