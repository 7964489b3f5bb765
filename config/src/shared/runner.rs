use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{PipelineConfig, ValidationError};

/// Complete configuration for the runner binary.
///
/// Typically loaded from the `configuration` directory at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Configuration of the pipeline to run.
    pub pipeline: PipelineConfig,
}

impl RunnerConfig {
    /// Validates the complete runner configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pipeline.validate()
    }
}

impl Config for RunnerConfig {}
