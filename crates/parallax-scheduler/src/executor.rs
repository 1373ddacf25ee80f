//! Collaborator seams
//!
//! The scheduler never executes transactions or touches chain state
//! itself. Both concerns are injected capabilities supplied at
//! construction: an [`Executor`] that runs a transaction payload on a
//! worker thread, and a [`ShardStore`] that mints and extends the
//! opaque database-shard handles a [`Shard`](crate::Shard) wraps.

use crate::shard::ShardHandle;
use bytes::Bytes;
use parallax_types::{ScopeName, Transaction};
use thiserror::Error;

/// Result of executing one transaction payload
#[derive(Clone, Debug, Default)]
pub struct ExecutionOutcome {
    /// Opaque output emitted by the execution engine
    pub output: Bytes,
}

/// Execution failures reported by the execution collaborator
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The execution engine rejected or aborted the transaction
    #[error("execution failed: {0}")]
    Failed(String),
}

/// Execution collaborator: runs a transaction payload.
///
/// Implementations must be safe to invoke from any worker thread; the
/// scheduler posts `execute` calls onto shard strands.
pub trait Executor: Send + Sync {
    /// Execute one transaction
    fn execute(&self, tx: &Transaction) -> Result<ExecutionOutcome, ExecutionError>;
}

/// Storage collaborator: supplies the opaque database shard backing
/// each execution shard.
pub trait ShardStore: Send + Sync {
    /// Open a new database shard reserving the given scope sets
    fn start_shard(&self, write_scopes: &[ScopeName], read_scopes: &[ScopeName]) -> ShardHandle;

    /// Extend an existing database shard with additional scopes
    fn extend_shard(
        &self,
        handle: &ShardHandle,
        write_scopes: &[ScopeName],
        read_scopes: &[ScopeName],
    );
}
