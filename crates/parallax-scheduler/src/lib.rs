//! # parallax-scheduler
//!
//! Scope-conflict-based transaction scheduling for Parallax.
//!
//! Each incoming transaction declares the resource namespaces (scopes)
//! it reads and writes. The scheduler places every transaction into an
//! execution shard such that no two live shards ever hold overlapping
//! write-scope claims, which is what makes parallel execution safe.
//! Transactions whose scopes straddle two existing shards are reported
//! back as conflicts for the caller to defer to a later cycle.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod executor;
mod scheduler;
mod scope_index;
mod shard;

pub use error::{ScheduleError, ScheduleResult};
pub use executor::{ExecutionError, ExecutionOutcome, Executor, ShardStore};
pub use scheduler::ShardScheduler;
pub use scope_index::ScopeIndex;
pub use shard::{Shard, ShardHandle, ShardId};
