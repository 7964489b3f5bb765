use std::future::Future;

use crate::error::ConveyorResult;
use crate::types::Item;

/// Final destination of the items drained from stage B.
///
/// The consumer is the only caller, so writes arrive one at a time and in stage B order.
///
/// The trait also provides an optional [`Sink::shutdown`] method with a default no-op
/// implementation, called once after the consumer wrote its last item.
pub trait Sink {
    /// Returns the name of the sink.
    fn name() -> &'static str;

    /// Flushes or releases whatever the sink holds once the consumer is done.
    fn shutdown(&self) -> impl Future<Output = ConveyorResult<()>> + Send {
        async { Ok(()) }
    }

    /// Accepts one fully labeled item.
    ///
    /// An error stops the consumer and fails the whole pipeline.
    fn write_item(&self, item: Item) -> impl Future<Output = ConveyorResult<()>> + Send;
}
