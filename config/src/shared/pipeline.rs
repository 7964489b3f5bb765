use serde::{Deserialize, Serialize};

use crate::shared::{QuotaConfig, ValidationError};

/// Configuration of a two-stage conveyor pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Total number of items produced, relabeled and consumed during a run.
    #[serde(default = "default_items")]
    pub items: u64,
    /// Number of slots of each stage queue.
    #[serde(default = "default_stage_capacity")]
    pub stage_capacity: usize,
    /// Number of transformer workers moving items from stage A to stage B.
    pub transformers: u16,
    /// Upper bound, in milliseconds, of the random pause a worker takes per hand-off.
    ///
    /// Zero disables the pause.
    #[serde(default)]
    pub work_jitter_ms: u64,
    /// Optional per-role quota overrides, which must all equal `items`.
    #[serde(default)]
    pub quotas: QuotaConfig,
}

impl PipelineConfig {
    /// Default number of items flowing through a pipeline.
    pub const DEFAULT_ITEMS: u64 = 10;

    /// Default number of slots per stage.
    pub const DEFAULT_STAGE_CAPACITY: usize = 5;

    /// Creates a configuration with default sizes and the given number of transformers.
    pub fn with_transformers(transformers: u16) -> Self {
        Self {
            items: default_items(),
            stage_capacity: default_stage_capacity(),
            transformers,
            work_jitter_ms: 0,
            quotas: QuotaConfig::default(),
        }
    }

    /// Validates pipeline configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stage_capacity == 0 {
            return Err(ValidationError::StageCapacityZero);
        }

        if self.transformers == 0 {
            return Err(ValidationError::TransformersZero);
        }

        self.quotas.validate(self.items)
    }
}

fn default_items() -> u64 {
    PipelineConfig::DEFAULT_ITEMS
}

fn default_stage_capacity() -> usize {
    PipelineConfig::DEFAULT_STAGE_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::QuotaRole;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::with_transformers(2);
        assert_eq!(config.items, 10);
        assert_eq!(config.stage_capacity, 5);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_items_is_valid() {
        let config = PipelineConfig {
            items: 0,
            ..PipelineConfig::with_transformers(1)
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = PipelineConfig {
            stage_capacity: 0,
            ..PipelineConfig::with_transformers(1)
        };
        assert_eq!(config.validate(), Err(ValidationError::StageCapacityZero));
    }

    #[test]
    fn zero_transformers_is_rejected() {
        let config = PipelineConfig::with_transformers(0);
        assert_eq!(config.validate(), Err(ValidationError::TransformersZero));
    }

    #[test]
    fn mismatching_quota_is_rejected() {
        let config = PipelineConfig {
            quotas: QuotaConfig {
                consume: Some(9),
                ..QuotaConfig::default()
            },
            ..PipelineConfig::with_transformers(1)
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::QuotaMismatch {
                role: QuotaRole::Consume,
                quota: 9,
                items: 10,
            })
        );
    }
}
