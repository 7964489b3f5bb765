use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::bail;
use crate::error::{ConveyorResult, ErrorKind};
use crate::sink::Sink;
use crate::test_utils::notify::TimedNotify;
use crate::types::Item;

type ItemCondition = Box<dyn Fn(&[Item]) -> bool + Send + Sync>;

struct Inner<S> {
    wrapped_sink: S,
    items: Vec<Item>,
    conditions: Vec<(ItemCondition, Arc<Notify>)>,
    shutdown_called: bool,
}

impl<S> Inner<S> {
    fn check_conditions(&mut self) {
        let items = &self.items;
        self.conditions.retain(|(condition, notify)| {
            let met = condition(items);
            if met {
                notify.notify_one();
            }
            !met
        });
    }
}

/// Test wrapper for [`Sink`] implementations that records every written item.
///
/// Tests can register a condition on the recorded items and wait until it holds.
#[derive(Clone)]
pub struct TestSinkWrapper<S> {
    inner: Arc<Mutex<Inner<S>>>,
}

impl<S> fmt::Debug for TestSinkWrapper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSinkWrapper").finish_non_exhaustive()
    }
}

impl<S> TestSinkWrapper<S> {
    pub fn wrap(sink: S) -> Self {
        let inner = Inner {
            wrapped_sink: sink,
            items: Vec::new(),
            conditions: Vec::new(),
            shutdown_called: false,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Items written so far, in consumption order.
    pub async fn items(&self) -> Vec<Item> {
        self.inner.lock().await.items.clone()
    }

    pub async fn shutdown_called(&self) -> bool {
        self.inner.lock().await.shutdown_called
    }

    /// Returns a notification fired once `condition` holds on the written items.
    pub async fn notify_on_items<F>(&self, condition: F) -> TimedNotify
    where
        F: Fn(&[Item]) -> bool + Send + Sync + 'static,
    {
        let notify = Arc::new(Notify::new());

        let mut inner = self.inner.lock().await;
        inner.conditions.push((Box::new(condition), notify.clone()));
        inner.check_conditions();

        TimedNotify::new(notify)
    }

    /// Returns a notification fired once at least `count` items were written.
    pub async fn wait_for_items(&self, count: usize) -> TimedNotify {
        self.notify_on_items(move |items| items.len() >= count)
            .await
    }
}

impl<S> Sink for TestSinkWrapper<S>
where
    S: Sink + Send + Sync,
{
    fn name() -> &'static str {
        S::name()
    }

    async fn shutdown(&self) -> ConveyorResult<()> {
        let mut inner = self.inner.lock().await;
        inner.wrapped_sink.shutdown().await?;
        inner.shutdown_called = true;

        Ok(())
    }

    async fn write_item(&self, item: Item) -> ConveyorResult<()> {
        let mut inner = self.inner.lock().await;
        inner.wrapped_sink.write_item(item).await?;
        inner.items.push(item);
        inner.check_conditions();

        Ok(())
    }
}

/// Sink accepting a fixed number of items and failing with [`ErrorKind::SinkError`] afterwards.
#[derive(Debug, Clone)]
pub struct FailingSink {
    accepted: Arc<Mutex<u64>>,
    fail_after: u64,
}

impl FailingSink {
    pub fn new(fail_after: u64) -> Self {
        Self {
            accepted: Arc::new(Mutex::new(0)),
            fail_after,
        }
    }

    pub async fn accepted(&self) -> u64 {
        *self.accepted.lock().await
    }
}

impl Sink for FailingSink {
    fn name() -> &'static str {
        "failing"
    }

    async fn write_item(&self, item: Item) -> ConveyorResult<()> {
        let mut accepted = self.accepted.lock().await;
        if *accepted >= self.fail_after {
            bail!(
                ErrorKind::SinkError,
                "Sink refused the item",
                format!("item {} arrived after {} accepted items", item.sequence, *accepted)
            );
        }

        *accepted += 1;

        Ok(())
    }
}
