//! Helpers for testing pipelines.
//!
//! Available to unit tests and, with the `test-utils` feature, to integration tests. The
//! [`sink`] module provides sinks that record what the consumer wrote and let a test wait for a
//! condition on it, the [`pipeline`] module builds configurations and runs pipelines under a
//! timeout so a broken hand-off fails the test instead of hanging it.

pub mod notify;
pub mod pipeline;
pub mod sink;
