//! # parallax-forkdb
//!
//! In-memory index of candidate blocks forming a tree rooted at the
//! last irreversible block. Blocks are indexed simultaneously by id, by
//! previous-id (children lookup), and by block number, supporting head
//! selection over competing branches, branch-diff queries for reorgs,
//! and pruning as irreversibility advances.
//!
//! The fork database never validates blocks; it receives headers
//! already validated by the block-validation collaborator.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod fork_db;
mod meta;

pub use error::{ForkDbError, ForkDbResult};
pub use fork_db::{ForkDatabase, DEFAULT_SIZE_HINT, MAX_BLOCK_REORDERING};
pub use meta::MetaBlock;
