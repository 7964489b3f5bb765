pub mod base;
pub mod consumer;
pub mod pool;
pub mod producer;
pub mod transformer;
