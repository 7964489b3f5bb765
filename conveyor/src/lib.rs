//! Two-stage bounded-buffer pipeline.
//!
//! Producers put items on stage A, transformers relabel them on their way to stage B, and a
//! single consumer drains stage B into a [`sink::Sink`]. Each stage is a fixed-capacity queue
//! guarded by a [`stage::StageGate`], and every role stops on its own once its
//! [`concurrency::quota::QuotaCounter`] is exhausted.

pub mod concurrency;
pub mod error;
mod macros;
pub mod pipeline;
pub mod sink;
pub mod stage;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod workers;
