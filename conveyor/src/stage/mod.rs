//! Fixed-capacity stages connecting the pipeline roles.

mod gate;
mod queue;

pub use gate::{StageGate, StageSnapshot};
pub use queue::BoundedQueue;
