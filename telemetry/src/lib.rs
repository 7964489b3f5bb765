//! Logging setup shared by conveyor binaries and tests.

pub mod tracing;
