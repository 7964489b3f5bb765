use std::fmt;
use std::future::Future;

use crate::error::ConveyorResult;
use crate::types::{ItemKind, TransformerId};

/// Classification of pipeline workers with identifying properties.
///
/// [`WorkerRole`] is attached to every log record a worker emits and to the summary it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    /// Creates items of one kind and puts them on stage A.
    Producer { kind: ItemKind },
    /// Moves items from stage A to stage B, labeling them with its identifier.
    Transformer { id: TransformerId },
    /// Drains stage B into the sink.
    Consumer,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerRole::Producer { kind } => write!(f, "producer[{kind}]"),
            WorkerRole::Transformer { id } => write!(f, "transformer[{id}]"),
            WorkerRole::Consumer => f.write_str("consumer"),
        }
    }
}

/// What a worker reports once its quota is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub role: WorkerRole,
    /// Number of items this worker moved.
    pub handled: u64,
}

/// Trait for the tasks making up a pipeline.
///
/// A worker loops until the quota it draws from is exhausted and then returns on its own; no
/// other task ever has to stop it.
pub trait Worker {
    fn role(&self) -> WorkerRole;

    /// Runs the worker to completion.
    fn run(self) -> impl Future<Output = ConveyorResult<WorkerSummary>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_render_with_their_identity() {
        assert_eq!(
            WorkerRole::Producer {
                kind: ItemKind::Second
            }
            .to_string(),
            "producer[second]"
        );
        assert_eq!(
            WorkerRole::Transformer {
                id: TransformerId::new(3)
            }
            .to_string(),
            "transformer[3]"
        );
        assert_eq!(WorkerRole::Consumer.to_string(), "consumer");
    }
}
