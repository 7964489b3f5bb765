use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Roles that draw from a quota counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaRole {
    /// Producers, collectively creating items.
    Produce,
    /// Transformers, collectively relabeling items.
    Relabel,
    /// The consumer, draining items.
    Consume,
}

impl QuotaRole {
    /// Returns the role name used in messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaRole::Produce => "produce",
            QuotaRole::Relabel => "relabel",
            QuotaRole::Consume => "consume",
        }
    }
}

impl fmt::Display for QuotaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-role quota overrides.
///
/// Every role must account for the same number of items, so an override is only accepted when
/// it equals the pipeline's `items`. The overrides exist so that deployments which configure
/// each role's quota explicitly get a clear error instead of a pipeline that drops items or
/// waits forever.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuotaConfig {
    #[serde(default)]
    pub produce: Option<u64>,
    #[serde(default)]
    pub relabel: Option<u64>,
    #[serde(default)]
    pub consume: Option<u64>,
}

impl QuotaConfig {
    /// Checks that every configured override matches `items`.
    pub fn validate(&self, items: u64) -> Result<(), ValidationError> {
        let overrides = [
            (QuotaRole::Produce, self.produce),
            (QuotaRole::Relabel, self.relabel),
            (QuotaRole::Consume, self.consume),
        ];

        for (role, quota) in overrides {
            match quota {
                Some(quota) if quota != items => {
                    return Err(ValidationError::QuotaMismatch { role, quota, items });
                }
                _ => {}
            }
        }

        Ok(())
    }
}
