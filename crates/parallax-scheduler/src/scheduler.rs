//! Shard scheduler
//!
//! Places each incoming transaction into an execution shard so that the
//! write-scope sets of any two live shards stay disjoint, and posts the
//! transaction's execution onto the shard's strand. Placement is
//! strictly first-come-first-served over the order transactions reach
//! [`ShardScheduler::schedule`]; any prioritization happens upstream.

use crate::error::{ScheduleError, ScheduleResult};
use crate::executor::{Executor, ShardStore};
use crate::scope_index::ScopeIndex;
use crate::shard::{Shard, ShardId};
use parallax_runtime::WorkerPool;
use parallax_types::{ScopeName, Transaction};
use std::sync::Arc;

/// Scope-conflict transaction scheduler for one block cycle.
///
/// Not safe to drive from multiple threads: one thread calls
/// `schedule()`; only the *execution* of assigned payloads happens in
/// parallel, on the worker pool.
pub struct ShardScheduler {
    pool: Arc<WorkerPool>,
    executor: Arc<dyn Executor>,
    store: Arc<dyn ShardStore>,
    index: ScopeIndex,
    shards: Vec<Shard>,
}

impl ShardScheduler {
    /// Create a scheduler over the given runtime and collaborators
    pub fn new(
        pool: Arc<WorkerPool>,
        executor: Arc<dyn Executor>,
        store: Arc<dyn ShardStore>,
    ) -> Self {
        Self {
            pool,
            executor,
            store,
            index: ScopeIndex::new(),
            shards: Vec::new(),
        }
    }

    /// Assign `tx` to a shard, or report a scope conflict.
    ///
    /// Returns `Ok(shard_id)` when the transaction was appended to an
    /// existing shard or a new one was opened for it. Returns
    /// `Err(ScopeConflict)` when its scopes resolve to two distinct
    /// live shards; in that case nothing is mutated and the caller
    /// decides whether to defer the transaction to a later cycle.
    pub fn schedule(&mut self, tx: Transaction) -> ScheduleResult<ShardId> {
        // Resolve every declared scope against the write-claim map
        // before touching anything. Read scopes first, then write
        // scopes, accumulating a single candidate shard.
        let mut existing: Option<ShardId> = None;
        self.bind_scopes(&tx.read_scopes, &mut existing)?;
        self.bind_scopes(&tx.write_scopes, &mut existing)?;

        let shard_id = match existing {
            Some(id) => {
                self.extend_shard(id, &tx);
                id
            }
            None => self.open_shard(&tx),
        };

        let shard = &mut self.shards[shard_id.0 as usize];
        let strand = shard.strand();
        shard.assign(tx.clone());

        let executor = Arc::clone(&self.executor);
        self.pool.post(strand, move || {
            if let Err(err) = executor.execute(&tx) {
                // Result plumbing back into block finalization belongs
                // to the execution collaborator.
                tracing::warn!(%err, "transaction execution failed");
            }
        });

        Ok(shard_id)
    }

    /// Discard all shards and scope claims for the next block cycle.
    ///
    /// Shards are created and destroyed in bursts per pass; the arena
    /// is cleared wholesale here, never entry by entry.
    pub fn start_cycle(&mut self) {
        self.index.clear();
        self.shards.clear();
    }

    /// Shard by arena index
    pub fn shard(&self, id: ShardId) -> Option<&Shard> {
        self.shards.get(id.0 as usize)
    }

    /// All live shards in creation order
    pub fn shards(&self) -> impl Iterator<Item = &Shard> {
        self.shards.iter()
    }

    /// Number of live shards this pass
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The scope index for this pass
    pub fn scope_index(&self) -> &ScopeIndex {
        &self.index
    }

    /// Fold `scopes` into the single-candidate accumulator, failing on
    /// the first scope owned by a second distinct shard.
    fn bind_scopes(
        &self,
        scopes: &[ScopeName],
        existing: &mut Option<ShardId>,
    ) -> ScheduleResult<()> {
        for scope in scopes {
            if let Some(owner) = self.index.find_owner(scope) {
                match *existing {
                    None => *existing = Some(owner),
                    Some(bound) if bound == owner => {}
                    Some(bound) => {
                        return Err(ScheduleError::ScopeConflict {
                            first: bound,
                            second: owner,
                            scope: scope.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    fn extend_shard(&mut self, id: ShardId, tx: &Transaction) {
        self.store.extend_shard(
            self.shards[id.0 as usize].handle(),
            &tx.write_scopes,
            &tx.read_scopes,
        );
        self.claim(id, tx);
        tracing::debug!(shard = ?id, "extended shard");
    }

    fn open_shard(&mut self, tx: &Transaction) -> ShardId {
        let id = ShardId(self.shards.len() as u32);
        let handle = self.store.start_shard(&tx.write_scopes, &tx.read_scopes);
        let strand = self.pool.create_strand();
        self.shards.push(Shard::new(id, handle, strand));
        self.claim(id, tx);
        tracing::debug!(shard = ?id, "opened new shard");
        id
    }

    fn claim(&self, id: ShardId, tx: &Transaction) {
        for scope in &tx.write_scopes {
            if let Err(owner) = self.index.claim_write(scope.clone(), id) {
                // bind_scopes already resolved every scope to `id`, so
                // a foreign owner here means two live shards hold the
                // same write scope.
                panic!(
                    "scope index corrupted: write scope {scope} claimed by \
                     {owner:?} while assigning to {id:?}"
                );
            }
        }
        for scope in &tx.read_scopes {
            self.index.note_read(scope.clone());
        }
    }
}
