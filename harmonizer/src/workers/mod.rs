//! Bounded concurrent execution of per-identifier work.

pub mod pool;
