//! Block-processing pipeline
//!
//! One `apply_block` call covers a full cycle: ingest the header into
//! the fork database, and if the block became head, run a scheduling
//! pass over its transactions and drain the worker pool. The scheduler
//! and pool are per-cycle (the drain barrier is one-shot); the fork
//! database persists across cycles behind an `RwLock`.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use parallax_forkdb::{ForkDatabase, MetaBlock};
use parallax_primitives::BlockId;
use parallax_runtime::WorkerPool;
use parallax_scheduler::{Executor, ScheduleError, ShardScheduler, ShardStore};
use parallax_types::{Block, Transaction};
use parking_lot::RwLock;
use std::sync::mpsc;
use std::sync::Arc;

/// Outcome of applying one block
#[derive(Debug)]
pub enum BlockOutcome {
    /// The block became head; its transactions were scheduled and
    /// executed. Conflicting transactions are returned for the caller
    /// to retry in a later cycle.
    Applied {
        /// The new head
        head: Arc<MetaBlock>,
        /// Number of shards formed this cycle
        shard_count: usize,
        /// Transactions deferred on scope conflicts
        deferred: Vec<Transaction>,
    },
    /// The block was indexed but is not the best branch; nothing was
    /// executed.
    Buffered {
        /// The unchanged head
        head: Arc<MetaBlock>,
    },
}

/// Drives blocks through the fork database and the shard scheduler.
pub struct BlockPipeline {
    config: CoreConfig,
    fork_db: RwLock<ForkDatabase>,
    executor: Arc<dyn Executor>,
    store: Arc<dyn ShardStore>,
}

impl BlockPipeline {
    /// Create a pipeline over the given collaborators
    pub fn new(
        config: CoreConfig,
        executor: Arc<dyn Executor>,
        store: Arc<dyn ShardStore>,
    ) -> Self {
        let fork_db = RwLock::new(ForkDatabase::with_config(
            config.max_block_reordering,
            config.fork_db_size_hint,
        ));
        Self {
            config,
            fork_db,
            executor,
            store,
        }
    }

    /// Ingest a block and, if it became head, execute its transactions.
    pub fn apply_block(&self, block: Block) -> CoreResult<BlockOutcome> {
        let block_id = block.id();
        let head = self.fork_db.write().push_block(block.header.clone())?;

        if head.id() != block_id {
            tracing::debug!(block = %block_id, head = %head.id(), "block buffered, head unchanged");
            return Ok(BlockOutcome::Buffered { head });
        }

        let pool = Arc::new(WorkerPool::with_threads(self.config.worker_threads));
        let mut scheduler = ShardScheduler::new(
            Arc::clone(&pool),
            Arc::clone(&self.executor),
            Arc::clone(&self.store),
        );

        let mut deferred = Vec::new();
        for tx in block.transactions {
            match scheduler.schedule(tx.clone()) {
                Ok(_) => {}
                Err(err @ ScheduleError::ScopeConflict { .. }) => {
                    tracing::debug!(%err, "transaction deferred to next cycle");
                    deferred.push(tx);
                }
            }
        }

        let (done_tx, done_rx) = mpsc::channel();
        pool.async_wait(move || {
            let _ = done_tx.send(());
        });
        done_rx.recv().map_err(|_| CoreError::DrainFailed)?;

        let shard_count = scheduler.shard_count();
        tracing::info!(
            block = %block_id,
            number = head.number(),
            shards = shard_count,
            deferred = deferred.len(),
            "block applied"
        );
        Ok(BlockOutcome::Applied {
            head,
            shard_count,
            deferred,
        })
    }

    /// Advance the last-irreversible root, pruning stale branches
    pub fn advance_irreversible(&self, id: BlockId) -> CoreResult<Arc<MetaBlock>> {
        Ok(self.fork_db.write().set_irreversible(id)?)
    }

    /// Current head block
    pub fn head(&self) -> Option<Arc<MetaBlock>> {
        self.fork_db.read().head()
    }

    /// Branch diff between two tips, for computing a reorg
    pub fn fork_branch(
        &self,
        first: BlockId,
        second: BlockId,
    ) -> CoreResult<(Vec<Arc<MetaBlock>>, Vec<Arc<MetaBlock>>)> {
        Ok(self.fork_db.read().fetch_branch_from(first, second)?)
    }

    /// Clear the fork database back to an empty state
    pub fn reset(&self) {
        self.fork_db.write().reset();
    }
}
