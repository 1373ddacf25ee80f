//! # parallax-runtime
//!
//! Fixed-size worker thread pool with FIFO execution lanes ("strands").
//!
//! Tasks posted to the same strand run in posting order and never
//! concurrently with each other; tasks on different strands run in
//! parallel up to the worker count. The pool drains exactly once via
//! [`WorkerPool::async_wait`] and never returns to the accepting state.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod pool;
mod strand;

pub use pool::{PoolState, WorkerPool, DEFAULT_WORKER_THREADS};
pub use strand::StrandId;
