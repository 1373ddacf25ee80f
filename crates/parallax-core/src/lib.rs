//! # parallax-core
//!
//! Orchestration for the Parallax core: wires the fork database, the
//! shard scheduler, and the worker-pool runtime into a block-processing
//! pipeline. New blocks are pushed into the fork database; when a block
//! becomes head its transactions are scheduled into shards and executed
//! in parallel, with conflicting transactions reported back for the
//! caller to retry next cycle.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod pipeline;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use pipeline::{BlockOutcome, BlockPipeline};
