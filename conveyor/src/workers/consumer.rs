use std::sync::Arc;

use config::shared::QuotaRole;
use tracing::info;

use crate::concurrency::jitter::WorkJitter;
use crate::concurrency::quota::{Claim, QuotaCounter};
use crate::error::ConveyorResult;
use crate::sink::Sink;
use crate::stage::StageGate;
use crate::types::Item;
use crate::workers::base::{Worker, WorkerRole, WorkerSummary};

/// Drains stage B into a [`Sink`].
///
/// There is a single consumer, so its quota is private to it. The sink is shut down once the
/// quota is exhausted, and not when the consumer fails.
#[derive(Debug)]
pub struct Consumer<S> {
    quota: QuotaCounter,
    input: Arc<StageGate<Item>>,
    sink: S,
    jitter: WorkJitter,
}

impl<S> Consumer<S> {
    pub fn new(items: u64, input: Arc<StageGate<Item>>, sink: S, jitter: WorkJitter) -> Self {
        Self {
            quota: QuotaCounter::new(QuotaRole::Consume, items),
            input,
            sink,
            jitter,
        }
    }
}

impl<S> Worker for Consumer<S>
where
    S: Sink + Send + Sync + 'static,
{
    fn role(&self) -> WorkerRole {
        WorkerRole::Consumer
    }

    async fn run(self) -> ConveyorResult<WorkerSummary> {
        let role = self.role();
        let mut handled = 0;

        while let Claim::Claimed(_) = self.quota.try_claim().await {
            let item = self.input.pop().await?;
            self.jitter.pause().await;

            self.sink.write_item(item).await?;
            handled += 1;

            info!(
                %role,
                action = "consumed",
                sequence = item.sequence,
                stage = self.input.name(),
                sink = S::name(),
                "item handed off"
            );
        }

        self.sink.shutdown().await?;

        info!(%role, handled, "consume quota exhausted, consumer terminating");

        Ok(WorkerSummary { role, handled })
    }
}
