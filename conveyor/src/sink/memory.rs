use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::ConveyorResult;
use crate::sink::Sink;
use crate::types::Item;

/// Sink keeping every consumed item in memory, in consumption order.
///
/// Clones share the same storage, so a clone handed to the pipeline can be inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    items: Arc<Mutex<Vec<Item>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the consumed items.
    pub async fn items(&self) -> Vec<Item> {
        self.items.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

}

impl Sink for MemorySink {
    fn name() -> &'static str {
        "memory"
    }

    async fn shutdown(&self) -> ConveyorResult<()> {
        let items = self.len().await;
        info!(items, "memory sink shut down");

        Ok(())
    }

    async fn write_item(&self, item: Item) -> ConveyorResult<()> {
        self.items.lock().await.push(item);

        Ok(())
    }
}
