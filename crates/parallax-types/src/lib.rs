//! # parallax-types
//!
//! Block and transaction types for the Parallax core.
//!
//! This crate defines the scheduling view of a transaction (its declared
//! read and write scopes plus an opaque payload) and the block header
//! shape consumed by the fork database.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block;
mod transaction;

pub use block::{Block, BlockHeader};
pub use transaction::{ScopeName, Transaction};
