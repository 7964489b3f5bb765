//! Shared configuration types for conveyor pipelines.

mod base;
mod pipeline;
mod quota;
mod runner;

pub use base::ValidationError;
pub use pipeline::PipelineConfig;
pub use quota::{QuotaConfig, QuotaRole};
pub use runner::RunnerConfig;
