//! Scope index - tracks which shard owns each scope
//!
//! The direct analog of a per-block ownership table: each scope can be
//! write-owned by at most one live shard. The index is rebuilt fresh
//! for every block cycle; there is no removal mid-pass.

use crate::shard::ShardId;
use dashmap::{DashMap, DashSet};
use parallax_types::ScopeName;

/// Scope index for one scheduling pass
///
/// Maps each scope name to the (at most one) shard holding its write
/// lock, plus a set of all scopes read by any shard.
pub struct ScopeIndex {
    /// Map from scope to the shard owning its write lock
    writers: DashMap<ScopeName, ShardId>,
    /// All scopes read by any shard this pass
    readers: DashSet<ScopeName>,
}

impl ScopeIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            writers: DashMap::new(),
            readers: DashSet::new(),
        }
    }

    /// Register that `shard` owns `scope` for writing.
    ///
    /// Returns `Ok(())` if the claim was recorded or the scope is
    /// already owned by this same shard. Returns `Err(owner)` if a
    /// *different* live shard owns the scope; that is a scheduling
    /// conflict for the caller, never a crash.
    pub fn claim_write(&self, scope: ScopeName, shard: ShardId) -> Result<(), ShardId> {
        match self.writers.entry(scope) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let owner = *entry.get();
                if owner == shard {
                    Ok(())
                } else {
                    Err(owner)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(shard);
                Ok(())
            }
        }
    }

    /// Look up the shard owning `scope`'s write lock. O(1) expected.
    pub fn find_owner(&self, scope: &ScopeName) -> Option<ShardId> {
        self.writers.get(scope).map(|entry| *entry)
    }

    /// Record that some shard has read `scope`, independent of write
    /// ownership.
    pub fn note_read(&self, scope: ScopeName) {
        self.readers.insert(scope);
    }

    /// Check whether any shard has read `scope` this pass
    pub fn is_read(&self, scope: &ScopeName) -> bool {
        self.readers.contains(scope)
    }

    /// Number of write-claimed scopes
    pub fn claimed_count(&self) -> usize {
        self.writers.len()
    }

    /// Number of read scopes noted
    pub fn read_count(&self) -> usize {
        self.readers.len()
    }

    /// Check if nothing has been claimed or read
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty() && self.readers.is_empty()
    }

    /// Discard everything for the next scheduling pass
    pub fn clear(&self) {
        self.writers.clear();
        self.readers.clear();
    }
}

impl Default for ScopeIndex {
    fn default() -> Self {
        Self::new()
    }
}
