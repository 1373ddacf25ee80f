//! # parallax-primitives
//!
//! Primitive types for the Parallax blockchain core.
//!
//! This crate provides the fundamental data types used throughout the
//! system: the 256-bit hash, block identifiers with their embedded
//! block number, and the associated parsing errors.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block_id;
mod hash;

pub use block_id::{num_from_id, BlockId};
pub use hash::{Hash, HashError, H256};

/// Block height type
pub type BlockNum = u64;
