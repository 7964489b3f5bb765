//! Core data types moving through the pipeline.

mod item;

pub use item::{Item, ItemKind, Sequence, TransformerId};
