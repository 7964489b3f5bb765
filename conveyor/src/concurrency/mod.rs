//! Synchronization primitives shared by the workers.

pub mod jitter;
pub mod quota;
