use std::sync::Arc;

use config::shared::{PipelineConfig, QuotaRole};
use tracing::{error, info};

use crate::bail;
use crate::concurrency::jitter::WorkJitter;
use crate::concurrency::quota::QuotaCounter;
use crate::error::{ConveyorResult, ErrorKind};
use crate::sink::Sink;
use crate::stage::{StageGate, StageSnapshot};
use crate::types::{Item, ItemKind, TransformerId};
use crate::workers::base::{WorkerRole, WorkerSummary};
use crate::workers::consumer::Consumer;
use crate::workers::pool::WorkerPool;
use crate::workers::producer::Producer;
use crate::workers::transformer::Transformer;

/// Name of the stage between producers and transformers.
pub const STAGE_A: &str = "stage_a";

/// Name of the stage between transformers and the consumer.
pub const STAGE_B: &str = "stage_b";

/// The set of workers a pipeline runs.
///
/// A roster always includes exactly one consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub producers: Vec<ItemKind>,
    pub transformers: u16,
}

impl Roster {
    /// One producer per [`ItemKind`] and `transformers` transformers.
    pub fn standard(transformers: u16) -> Self {
        Self::new(ItemKind::ALL.to_vec(), transformers)
    }

    pub fn new(producers: Vec<ItemKind>, transformers: u16) -> Self {
        Self {
            producers,
            transformers,
        }
    }

    /// Every role of the roster, in spawn order.
    pub fn roles(&self) -> Vec<WorkerRole> {
        let producers = self
            .producers
            .iter()
            .map(|&kind| WorkerRole::Producer { kind });
        let transformers = (0..self.transformers).map(|id| WorkerRole::Transformer {
            id: TransformerId::new(id),
        });

        producers
            .chain(transformers)
            .chain(std::iter::once(WorkerRole::Consumer))
            .collect()
    }

    /// Rejects rosters that could never move `items` items end to end.
    pub fn validate(&self, items: u64) -> ConveyorResult<()> {
        if items == 0 {
            return Ok(());
        }

        if self.producers.is_empty() {
            bail!(
                ErrorKind::ConfigError,
                "Roster has no producer",
                format!("{items} items must be produced but no producer is configured")
            );
        }

        if self.transformers == 0 {
            bail!(
                ErrorKind::ConfigError,
                "Roster has no transformer",
                format!("{items} items must be relabeled but no transformer is configured")
            );
        }

        Ok(())
    }
}

/// Counts and final stage state of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub produced: u64,
    pub relabeled: u64,
    pub consumed: u64,
    pub workers: Vec<WorkerSummary>,
    pub stage_a: StageSnapshot,
    pub stage_b: StageSnapshot,
}

/// A pipeline whose stages and quotas are allocated and whose workers can be spawned.
///
/// Workers start running as soon as they are spawned. [`Pipeline::wait`] joins them and returns
/// a [`FinishedPipeline`], the only state from which stages can be torn down.
#[derive(Debug)]
pub struct Pipeline<S> {
    config: Arc<PipelineConfig>,
    sink: Option<S>,
    stage_a: Arc<StageGate<Item>>,
    stage_b: Arc<StageGate<Item>>,
    production: Arc<QuotaCounter>,
    relabel: Arc<QuotaCounter>,
    jitter: WorkJitter,
    pool: WorkerPool,
}

impl<S> Pipeline<S>
where
    S: Sink + Send + Sync + 'static,
{
    /// Validates `config` and allocates both stages and the shared quotas.
    ///
    /// No worker is spawned, so a failure here leaves nothing behind.
    pub fn new(config: PipelineConfig, sink: S) -> ConveyorResult<Self> {
        config.validate()?;

        let stage_a = Arc::new(StageGate::new(STAGE_A, config.stage_capacity)?);
        let stage_b = Arc::new(StageGate::new(STAGE_B, config.stage_capacity)?);
        let production = Arc::new(QuotaCounter::new(QuotaRole::Produce, config.items));
        let relabel = Arc::new(QuotaCounter::new(QuotaRole::Relabel, config.items));
        let jitter = WorkJitter::new(config.work_jitter_ms);

        Ok(Self {
            config: Arc::new(config),
            sink: Some(sink),
            stage_a,
            stage_b,
            production,
            relabel,
            jitter,
            pool: WorkerPool::new(),
        })
    }

    /// Spawns the standard roster: both producers, the configured transformers and the consumer.
    pub fn start(&mut self) -> ConveyorResult<()> {
        self.start_with_roster(Roster::standard(self.config.transformers))
    }

    /// Spawns every worker of `roster`.
    pub fn start_with_roster(&mut self, roster: Roster) -> ConveyorResult<()> {
        roster.validate(self.config.items)?;

        info!(
            items = self.config.items,
            stage_capacity = self.config.stage_capacity,
            producers = roster.producers.len(),
            transformers = roster.transformers,
            "starting pipeline"
        );

        for role in roster.roles() {
            self.spawn(role)?;
        }

        Ok(())
    }

    /// Constructs and spawns the worker for `role`.
    ///
    /// Only one consumer may be spawned, since it owns the sink.
    pub fn spawn(&mut self, role: WorkerRole) -> ConveyorResult<()> {
        match role {
            WorkerRole::Producer { kind } => {
                self.pool.spawn(Producer::new(
                    kind,
                    self.production.clone(),
                    self.stage_a.clone(),
                    self.jitter,
                ));
            }
            WorkerRole::Transformer { id } => {
                self.pool.spawn(Transformer::new(
                    id,
                    self.relabel.clone(),
                    self.stage_a.clone(),
                    self.stage_b.clone(),
                    self.jitter,
                ));
            }
            WorkerRole::Consumer => {
                let Some(sink) = self.sink.take() else {
                    bail!(
                        ErrorKind::ConfigError,
                        "Consumer already spawned",
                        "a pipeline runs exactly one consumer"
                    );
                };

                self.pool.spawn(Consumer::new(
                    self.config.items,
                    self.stage_b.clone(),
                    sink,
                    self.jitter,
                ));
            }
        }

        Ok(())
    }

    /// Waits for every spawned worker to terminate.
    ///
    /// On failure the remaining workers are aborted and the stages are closed, so no task is left
    /// waiting on them.
    pub async fn wait(self) -> ConveyorResult<FinishedPipeline> {
        info!(workers = self.pool.len(), "waiting for workers to complete");

        let workers = match self.pool.wait_all().await {
            Ok(workers) => workers,
            Err(err) => {
                error!(failed = err.kinds().len(), "pipeline workers failed");

                self.stage_a.close();
                self.stage_b.close();

                return Err(err);
            }
        };

        Ok(FinishedPipeline {
            workers,
            stage_a: self.stage_a,
            stage_b: self.stage_b,
        })
    }
}

/// A pipeline whose workers have all terminated successfully.
#[derive(Debug)]
pub struct FinishedPipeline {
    workers: Vec<WorkerSummary>,
    stage_a: Arc<StageGate<Item>>,
    stage_b: Arc<StageGate<Item>>,
}

impl FinishedPipeline {
    pub fn workers(&self) -> &[WorkerSummary] {
        &self.workers
    }

    /// Closes both stages and reports what the run did.
    ///
    /// Fails with [`ErrorKind::InvalidState`] when a stage still holds items or its counters
    /// did not return to their initial values.
    pub async fn teardown(self) -> ConveyorResult<PipelineReport> {
        let stage_a = self.stage_a.snapshot().await;
        let stage_b = self.stage_b.snapshot().await;

        self.stage_a.close();
        self.stage_b.close();

        for (name, snapshot) in [(STAGE_A, &stage_a), (STAGE_B, &stage_b)] {
            if !snapshot.is_at_rest() {
                error!(stage = name, ?snapshot, "stage is not at rest on teardown");

                bail!(
                    ErrorKind::InvalidState,
                    "Stage is not at rest on teardown",
                    format!(
                        "{name} has occupancy {}, {} free and {} filled slots out of {}",
                        snapshot.occupancy,
                        snapshot.free_slots,
                        snapshot.filled_slots,
                        snapshot.capacity
                    )
                );
            }
        }

        let handled_by = |is_role: fn(&WorkerRole) -> bool| -> u64 {
            self.workers
                .iter()
                .filter(|summary| is_role(&summary.role))
                .map(|summary| summary.handled)
                .sum()
        };

        let produced = handled_by(|role| matches!(role, WorkerRole::Producer { .. }));
        let relabeled = handled_by(|role| matches!(role, WorkerRole::Transformer { .. }));
        let consumed = handled_by(|role| matches!(role, WorkerRole::Consumer));

        info!(produced, relabeled, consumed, "pipeline torn down");

        Ok(PipelineReport {
            produced,
            relabeled,
            consumed,
            workers: self.workers,
            stage_a,
            stage_b,
        })
    }
}
