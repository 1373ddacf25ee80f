//! Execution shards
//!
//! A shard is one execution lane: an ordered list of transactions, the
//! strand that serializes their execution, a handle to the backing
//! database shard, and the scope sets it has claimed. Shards live in an
//! arena inside the scheduler and are addressed by [`ShardId`]; the
//! whole arena is dropped at the start of the next scheduling pass, so
//! no shard is ever freed individually mid-pass.

use parallax_runtime::StrandId;
use parallax_types::{ScopeName, Transaction};
use std::collections::HashSet;
use std::fmt;

/// Arena index of a shard within one scheduling pass
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardId(pub u32);

impl ShardId {
    /// Raw index value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShardId({})", self.0)
    }
}

/// Opaque handle to a database shard, minted by the storage
/// collaborator. The scheduler stores it and passes it back on
/// `extend_shard` without inspecting it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ShardHandle(u64);

impl ShardHandle {
    /// Wrap a raw handle value (storage collaborator use only)
    pub fn new(raw: u64) -> Self {
        ShardHandle(raw)
    }

    /// Raw handle value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A single execution lane with its assigned transactions and claimed
/// scopes.
///
/// Scope claims grow monotonically for the lifetime of the shard
/// within a block cycle; scopes are never removed.
pub struct Shard {
    id: ShardId,
    handle: ShardHandle,
    strand: StrandId,
    transactions: Vec<Transaction>,
    write_scopes: HashSet<ScopeName>,
    read_scopes: HashSet<ScopeName>,
}

impl Shard {
    /// Create an empty shard
    pub fn new(id: ShardId, handle: ShardHandle, strand: StrandId) -> Self {
        Self {
            id,
            handle,
            strand,
            transactions: Vec::new(),
            write_scopes: HashSet::new(),
            read_scopes: HashSet::new(),
        }
    }

    /// This shard's arena index
    pub fn id(&self) -> ShardId {
        self.id
    }

    /// The backing database-shard handle
    pub fn handle(&self) -> &ShardHandle {
        &self.handle
    }

    /// The strand serializing this shard's execution
    pub fn strand(&self) -> StrandId {
        self.strand
    }

    /// Append a transaction and extend the claimed scope sets
    pub fn assign(&mut self, tx: Transaction) {
        self.write_scopes.extend(tx.write_scopes.iter().cloned());
        self.read_scopes.extend(tx.read_scopes.iter().cloned());
        self.transactions.push(tx);
    }

    /// Transactions assigned so far, in assignment order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of transactions assigned
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Write scopes claimed by this shard
    pub fn write_scopes(&self) -> &HashSet<ScopeName> {
        &self.write_scopes
    }

    /// Read scopes used by this shard
    pub fn read_scopes(&self) -> &HashSet<ScopeName> {
        &self.read_scopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn tx(writes: &[&str], reads: &[&str]) -> Transaction {
        Transaction::new(
            writes.iter().map(|s| ScopeName::from(*s)),
            reads.iter().map(|s| ScopeName::from(*s)),
            Bytes::new(),
        )
    }

    #[test]
    fn test_assign_extends_scopes_monotonically() {
        let mut shard = Shard::new(ShardId(0), ShardHandle::new(1), StrandId(0));
        shard.assign(tx(&["a"], &["r"]));
        shard.assign(tx(&["b"], &[]));

        assert_eq!(shard.transaction_count(), 2);
        assert!(shard.write_scopes().contains(&ScopeName::from("a")));
        assert!(shard.write_scopes().contains(&ScopeName::from("b")));
        assert!(shard.read_scopes().contains(&ScopeName::from("r")));
    }

    #[test]
    fn test_assignment_order_preserved() {
        let mut shard = Shard::new(ShardId(0), ShardHandle::new(1), StrandId(0));
        for name in ["x", "y", "z"] {
            shard.assign(tx(&[name], &[]));
        }
        let first: Vec<_> = shard
            .transactions()
            .iter()
            .map(|t| t.write_scopes[0].as_str().to_string())
            .collect();
        assert_eq!(first, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_shard_handle_is_opaque_round_trip() {
        let handle = ShardHandle::new(99);
        assert_eq!(handle.raw(), 99);
        assert_eq!(handle, ShardHandle::new(99));
    }
}
