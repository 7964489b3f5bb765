use std::sync::Arc;

use tracing::info;

use crate::concurrency::jitter::WorkJitter;
use crate::concurrency::quota::{Claim, QuotaCounter};
use crate::error::ConveyorResult;
use crate::stage::StageGate;
use crate::types::{Item, ItemKind};
use crate::workers::base::{Worker, WorkerRole, WorkerSummary};

/// Creates items of a single kind until the shared production quota runs out.
///
/// Both producers draw from the same counter, so their combined output is exactly the quota and
/// every sequence number is issued once.
#[derive(Debug)]
pub struct Producer {
    kind: ItemKind,
    quota: Arc<QuotaCounter>,
    stage: Arc<StageGate<Item>>,
    jitter: WorkJitter,
}

impl Producer {
    pub fn new(
        kind: ItemKind,
        quota: Arc<QuotaCounter>,
        stage: Arc<StageGate<Item>>,
        jitter: WorkJitter,
    ) -> Self {
        Self {
            kind,
            quota,
            stage,
            jitter,
        }
    }
}

impl Worker for Producer {
    fn role(&self) -> WorkerRole {
        WorkerRole::Producer { kind: self.kind }
    }

    async fn run(self) -> ConveyorResult<WorkerSummary> {
        let role = self.role();
        let mut handled = 0;

        while let Claim::Claimed(ticket) = self.quota.try_claim().await {
            self.jitter.pause().await;

            let item = Item::new(ticket.sequence(), self.kind);
            self.stage.push(item).await?;
            handled += 1;

            info!(
                %role,
                action = "produced",
                sequence = item.sequence,
                stage = self.stage.name(),
                "item handed off"
            );
        }

        info!(%role, handled, "production quota exhausted, producer terminating");

        Ok(WorkerSummary { role, handled })
    }
}
