//! Conflict resolution between the two sources.
//!
//! Each [`CoalesceStrategy`](harmonizer_config::shared::CoalesceStrategy) maps to one
//! [`CoalescePolicy`] implementation. The mapping is resolved once per run in
//! [`coalesce_records`].

mod base;
mod coalesce;
pub mod policies;

pub use base::{CoalescePolicy, DataSource, Presence};
pub use coalesce::{CoalescedRecord, coalesce_records, coalesce_with};
