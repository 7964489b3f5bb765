use thiserror::Error;

use crate::shared::QuotaRole;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Stage capacity cannot be zero.
    #[error("`stage_capacity` cannot be zero")]
    StageCapacityZero,
    /// At least one transformer must be started.
    #[error("`transformers` cannot be zero")]
    TransformersZero,
    /// A per-role quota override disagrees with the total item count.
    #[error(
        "the {role} quota ({quota}) differs from `items` ({items}), items would be lost or awaited forever"
    )]
    QuotaMismatch {
        role: QuotaRole,
        quota: u64,
        items: u64,
    },
}
