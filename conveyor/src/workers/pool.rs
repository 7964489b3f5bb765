use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info_span};

use crate::conveyor_error;
use crate::error::{ConveyorResult, ErrorKind};
use crate::workers::base::{Worker, WorkerRole, WorkerSummary};

/// Owns the tasks of every spawned worker.
///
/// [`WorkerPool`] runs each worker in its own task inside a worker span, and collects their
/// summaries once they terminate.
#[derive(Debug, Default)]
pub struct WorkerPool {
    join_set: JoinSet<(WorkerRole, ConveyorResult<WorkerSummary>)>,
    spawned: usize,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `worker` on the current runtime.
    pub fn spawn<W>(&mut self, worker: W)
    where
        W: Worker + Send + 'static,
    {
        let role = worker.role();
        let span = info_span!("worker", %role);

        self.join_set.spawn(
            async move {
                let result = worker.run().await;
                (role, result)
            }
            .instrument(span.or_current()),
        );
        self.spawned += 1;

        debug!(%role, "spawned worker in pool");
    }

    /// Number of workers spawned so far.
    pub fn len(&self) -> usize {
        self.spawned
    }

    pub fn is_empty(&self) -> bool {
        self.spawned == 0
    }

    /// Waits for all workers to complete.
    ///
    /// The first failing worker aborts the remaining ones, since a worker waiting on a stage that
    /// a failed peer would have fed can never finish. All errors collected along the way are
    /// returned together.
    pub async fn wait_all(mut self) -> ConveyorResult<Vec<WorkerSummary>> {
        let mut summaries = Vec::with_capacity(self.spawned);
        let mut errors = Vec::new();

        while let Some(result) = self.join_set.join_next().await {
            match result {
                Ok((_, Ok(summary))) => {
                    summaries.push(summary);
                }
                Ok((role, Err(err))) => {
                    error!(%role, error = %err, "worker completed with error");
                    errors.push(err);
                    self.join_set.abort_all();
                }
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        // Cancellations following a failure are the pool's own aborts.
                        if errors.is_empty() {
                            error!("worker task was cancelled");
                            errors.push(conveyor_error!(
                                ErrorKind::WorkerCancelled,
                                "Pipeline worker was cancelled",
                                join_err
                            ));
                        } else {
                            debug!("worker task was cancelled");
                        }
                    } else {
                        error!(error = %join_err, "worker panicked");
                        errors.push(conveyor_error!(
                            ErrorKind::WorkerPanic,
                            "Pipeline worker panicked",
                            join_err
                        ));
                        self.join_set.abort_all();
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(summaries)
        } else {
            Err(errors.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bail;
    use crate::types::TransformerId;

    struct Finishing(u16);

    impl Worker for Finishing {
        fn role(&self) -> WorkerRole {
            WorkerRole::Transformer {
                id: TransformerId::new(self.0),
            }
        }

        async fn run(self) -> ConveyorResult<WorkerSummary> {
            Ok(WorkerSummary {
                role: self.role(),
                handled: u64::from(self.0),
            })
        }
    }

    struct Failing;

    impl Worker for Failing {
        fn role(&self) -> WorkerRole {
            WorkerRole::Consumer
        }

        async fn run(self) -> ConveyorResult<WorkerSummary> {
            bail!(ErrorKind::SinkError, "Sink rejected the item");
        }
    }

    struct Stuck;

    impl Worker for Stuck {
        fn role(&self) -> WorkerRole {
            WorkerRole::Transformer {
                id: TransformerId::new(9),
            }
        }

        async fn run(self) -> ConveyorResult<WorkerSummary> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    struct Panicking;

    impl Worker for Panicking {
        fn role(&self) -> WorkerRole {
            WorkerRole::Consumer
        }

        async fn run(self) -> ConveyorResult<WorkerSummary> {
            panic!("worker blew up");
        }
    }

    #[tokio::test]
    async fn collects_every_summary() {
        let mut pool = WorkerPool::new();
        assert!(pool.is_empty());
        pool.spawn(Finishing(1));
        pool.spawn(Finishing(2));
        assert_eq!(pool.len(), 2);
        assert!(!pool.is_empty());

        let mut handled: Vec<_> = pool
            .wait_all()
            .await
            .unwrap()
            .into_iter()
            .map(|summary| summary.handled)
            .collect();
        handled.sort();
        assert_eq!(handled, vec![1, 2]);
    }

    #[tokio::test]
    async fn failure_aborts_remaining_workers() {
        let mut pool = WorkerPool::new();
        pool.spawn(Stuck);
        pool.spawn(Failing);

        let err = pool.wait_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkError);
    }

    #[tokio::test]
    async fn panic_is_reported_as_worker_panic() {
        let mut pool = WorkerPool::new();
        pool.spawn(Panicking);

        let err = pool.wait_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WorkerPanic);
    }
}
