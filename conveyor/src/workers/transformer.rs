use std::sync::Arc;

use tracing::info;

use crate::concurrency::jitter::WorkJitter;
use crate::concurrency::quota::{Claim, QuotaCounter};
use crate::error::ConveyorResult;
use crate::stage::StageGate;
use crate::types::{Item, TransformerId};
use crate::workers::base::{Worker, WorkerRole, WorkerSummary};

/// Moves items from stage A to stage B, labeling each with its own identifier.
///
/// A transformer claims a unit of the relabel quota before popping, so all transformers together
/// pop exactly as many items as were produced and none of them waits on an empty stage forever.
#[derive(Debug)]
pub struct Transformer {
    id: TransformerId,
    quota: Arc<QuotaCounter>,
    input: Arc<StageGate<Item>>,
    output: Arc<StageGate<Item>>,
    jitter: WorkJitter,
}

impl Transformer {
    pub fn new(
        id: TransformerId,
        quota: Arc<QuotaCounter>,
        input: Arc<StageGate<Item>>,
        output: Arc<StageGate<Item>>,
        jitter: WorkJitter,
    ) -> Self {
        Self {
            id,
            quota,
            input,
            output,
            jitter,
        }
    }
}

impl Worker for Transformer {
    fn role(&self) -> WorkerRole {
        WorkerRole::Transformer { id: self.id }
    }

    async fn run(self) -> ConveyorResult<WorkerSummary> {
        let role = self.role();
        let mut handled = 0;

        while let Claim::Claimed(_) = self.quota.try_claim().await {
            let item = self.input.pop().await?;
            info!(
                %role,
                action = "took",
                sequence = item.sequence,
                stage = self.input.name(),
                "item handed off"
            );

            self.jitter.pause().await;

            let item = item.relabel(self.id);
            self.output.push(item).await?;
            handled += 1;

            info!(
                %role,
                action = "relabeled",
                sequence = item.sequence,
                stage = self.output.name(),
                "item handed off"
            );
        }

        info!(%role, handled, "relabel quota exhausted, transformer terminating");

        Ok(WorkerSummary { role, handled })
    }
}
