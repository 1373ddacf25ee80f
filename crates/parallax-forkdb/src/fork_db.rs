//! The fork database
//!
//! Three indexes over the same set of meta-blocks: by id (unique), by
//! previous-id (children lookup), and by block number. The indexes must
//! never disagree; any divergence is index corruption and panics rather
//! than propagating as an error value.

use crate::error::{ForkDbError, ForkDbResult};
use crate::meta::MetaBlock;
use parallax_primitives::BlockId;
use parallax_types::BlockHeader;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// How far out of order a block may arrive, relative to the current
/// head, before it is rejected outright as unlinkable. Bounds memory
/// growth from speculative or adversarial out-of-order pushes.
pub const MAX_BLOCK_REORDERING: u64 = 1024 * 256;

/// Default capacity hint for the block indexes
pub const DEFAULT_SIZE_HINT: usize = 1024;

/// In-memory multi-indexed tree of candidate blocks.
///
/// Single-writer: all methods take `&mut self` or `&self` under the
/// caller's synchronization. Callers needing shared access wrap the
/// database in a `parking_lot::RwLock`.
pub struct ForkDatabase {
    by_id: HashMap<BlockId, Arc<MetaBlock>>,
    /// Children lookup. Keys are parent ids and may refer to blocks
    /// outside the index (the root's parent, dangling parents).
    by_previous: HashMap<BlockId, Vec<BlockId>>,
    by_number: BTreeMap<u64, Vec<BlockId>>,
    head: Option<BlockId>,
    root: Option<BlockId>,
    max_reordering: u64,
}

impl ForkDatabase {
    /// Create a fork database with default bounds
    pub fn new() -> Self {
        Self::with_config(MAX_BLOCK_REORDERING, DEFAULT_SIZE_HINT)
    }

    /// Create a fork database with explicit bounds
    pub fn with_config(max_reordering: u64, size_hint: usize) -> Self {
        Self {
            by_id: HashMap::with_capacity(size_hint),
            by_previous: HashMap::with_capacity(size_hint),
            by_number: BTreeMap::new(),
            head: None,
            root: None,
            max_reordering,
        }
    }

    /// Ingest a validated block header and return the (possibly
    /// unchanged) head.
    ///
    /// The first block pushed becomes root and head. A block whose
    /// parent is unknown is admitted dangling (excluded from head
    /// selection until its parent arrives) while its number lies within
    /// the reordering window of the head; beyond the window it is
    /// rejected as [`ForkDbError::Unlinkable`] with no index mutation.
    /// Pushing an id already present is a no-op.
    pub fn push_block(&mut self, header: BlockHeader) -> ForkDbResult<Arc<MetaBlock>> {
        let meta = Arc::new(MetaBlock::new(header));
        let id = meta.id();

        if self.by_id.contains_key(&id) {
            return Ok(self.head_block());
        }

        if self.by_id.is_empty() {
            meta.link(0);
            self.insert_indexes(Arc::clone(&meta));
            self.root = Some(id);
            self.head = Some(id);
            tracing::info!(number = meta.number(), %id, "fork database rooted");
            return Ok(meta);
        }

        let previous = meta.previous();
        let parent_weight = match self.by_id.get(&previous) {
            Some(parent) => parent.chain_weight(),
            None => {
                let head_num = self.head_block().number();
                let num = meta.number();
                if num > head_num + self.max_reordering || num + self.max_reordering < head_num {
                    return Err(ForkDbError::Unlinkable { id, previous });
                }
                tracing::debug!(number = num, %id, "buffered out-of-order block");
                self.insert_indexes(meta);
                return Ok(self.head_block());
            }
        };

        self.insert_indexes(Arc::clone(&meta));
        if let Some(weight) = parent_weight {
            // Parent reachable from the root: link this block and any
            // dangling descendants that were waiting on it.
            self.link_subtree(id, weight);
        }
        Ok(self.head_block())
    }

    /// Current head (greatest linked chain weight)
    pub fn head(&self) -> Option<Arc<MetaBlock>> {
        self.head.map(|id| Arc::clone(&self.by_id[&id]))
    }

    /// Last irreversible block (the tree root)
    pub fn root(&self) -> Option<Arc<MetaBlock>> {
        self.root.map(|id| Arc::clone(&self.by_id[&id]))
    }

    /// Block by id
    pub fn fetch_block(&self, id: &BlockId) -> Option<Arc<MetaBlock>> {
        self.by_id.get(id).cloned()
    }

    /// All blocks at height `number`; non-unique across competing forks
    pub fn fetch_block_by_number(&self, number: u64) -> Vec<Arc<MetaBlock>> {
        self.by_number
            .get(&number)
            .map(|ids| ids.iter().map(|id| Arc::clone(&self.by_id[id])).collect())
            .unwrap_or_default()
    }

    /// Walk both chains backward to their common ancestor and return
    /// the two divergent suffixes, most recent first, ancestor
    /// excluded. `branch_a` holds blocks to un-apply, `branch_b` blocks
    /// to apply, when switching head from `first` to `second`.
    pub fn fetch_branch_from(
        &self,
        first: BlockId,
        second: BlockId,
    ) -> ForkDbResult<(Vec<Arc<MetaBlock>>, Vec<Arc<MetaBlock>>)> {
        let mut a = self
            .fetch_block(&first)
            .ok_or(ForkDbError::UnknownBlock(first))?;
        let mut b = self
            .fetch_block(&second)
            .ok_or(ForkDbError::UnknownBlock(second))?;

        let missing = || ForkDbError::NoCommonAncestor { first, second };

        let mut branch_a = Vec::new();
        let mut branch_b = Vec::new();

        while a.number() > b.number() {
            branch_a.push(Arc::clone(&a));
            a = self.fetch_block(&a.previous()).ok_or_else(missing)?;
        }
        while b.number() > a.number() {
            branch_b.push(Arc::clone(&b));
            b = self.fetch_block(&b.previous()).ok_or_else(missing)?;
        }
        while a.id() != b.id() {
            branch_a.push(Arc::clone(&a));
            branch_b.push(Arc::clone(&b));
            a = self.fetch_block(&a.previous()).ok_or_else(missing)?;
            b = self.fetch_block(&b.previous()).ok_or_else(missing)?;
        }

        Ok((branch_a, branch_b))
    }

    /// Excise a block and, cascading, its entire descendant subtree.
    ///
    /// The root cannot be removed. If the head falls in the removed
    /// subtree a new head is selected among the remaining linked
    /// blocks.
    pub fn remove(&mut self, id: BlockId) -> ForkDbResult<()> {
        if !self.by_id.contains_key(&id) {
            return Err(ForkDbError::UnknownBlock(id));
        }
        if self.root == Some(id) {
            return Err(ForkDbError::CannotRemoveRoot(id));
        }

        let doomed = self.subtree(id);
        for d in &doomed {
            self.unindex(*d);
        }
        if let Some(h) = self.head {
            if doomed.contains(&h) {
                self.recompute_head();
            }
        }
        tracing::debug!(count = doomed.len(), %id, "removed block subtree");
        Ok(())
    }

    /// Advance the last-irreversible root to `id` and prune every block
    /// not descended from it.
    pub fn set_irreversible(&mut self, id: BlockId) -> ForkDbResult<Arc<MetaBlock>> {
        let meta = self
            .fetch_block(&id)
            .ok_or(ForkDbError::UnknownBlock(id))?;
        if !meta.is_linked() {
            return Err(ForkDbError::NotLinked(id));
        }

        let keep = self.subtree(id);
        let doomed: Vec<BlockId> = self
            .by_id
            .keys()
            .filter(|b| !keep.contains(b))
            .copied()
            .collect();
        for d in doomed {
            self.unindex(d);
        }
        self.root = Some(id);
        match self.head {
            Some(h) if self.by_id.contains_key(&h) => {}
            _ => self.recompute_head(),
        }
        tracing::info!(number = meta.number(), %id, "irreversible block advanced");
        Ok(meta)
    }

    /// Clear all indexes and the head pointer back to an empty state
    pub fn reset(&mut self) {
        self.by_id.clear();
        self.by_previous.clear();
        self.by_number.clear();
        self.head = None;
        self.root = None;
        tracing::debug!("fork database reset");
    }

    /// Number of blocks currently indexed
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Assert that the three indexes agree. Index corruption is a
    /// programmer error, so every violation panics.
    pub fn check_invariants(&self) {
        if let Some(h) = self.head {
            let head = self.by_id.get(&h).expect("head missing from id index");
            assert!(head.is_linked(), "head is not linked to the root");
        } else {
            assert!(self.by_id.is_empty(), "non-empty index without a head");
        }
        if let Some(r) = self.root {
            assert!(self.by_id.contains_key(&r), "root missing from id index");
        }

        for (id, meta) in &self.by_id {
            assert_eq!(*id, meta.id(), "id index key disagrees with block id");
            assert_eq!(
                meta.number(),
                meta.previous().number() + 1,
                "block number must equal num_from_id(previous) + 1"
            );
            let siblings = self
                .by_number
                .get(&meta.number())
                .expect("block missing from number index");
            assert!(siblings.contains(id), "block missing from number index entry");
            let children = self
                .by_previous
                .get(&meta.previous())
                .expect("block missing from previous-id index");
            assert!(children.contains(id), "block missing from children list");

            if let Some(parent) = self.by_id.get(&meta.previous()) {
                if let (Some(pw), Some(w)) = (parent.chain_weight(), meta.chain_weight()) {
                    assert_eq!(
                        w,
                        pw + meta.header().weight,
                        "chain weight disagrees with parent"
                    );
                }
            } else if Some(*id) != self.root {
                assert!(!meta.is_linked(), "linked block with missing parent");
            }
        }

        for (prev, children) in &self.by_previous {
            for child in children {
                let meta = self
                    .by_id
                    .get(child)
                    .expect("previous-id index references unknown block");
                assert_eq!(meta.previous(), *prev, "previous-id index key mismatch");
            }
        }
        for (number, ids) in &self.by_number {
            for id in ids {
                let meta = self
                    .by_id
                    .get(id)
                    .expect("number index references unknown block");
                assert_eq!(meta.number(), *number, "number index key mismatch");
            }
        }
    }

    fn head_block(&self) -> Arc<MetaBlock> {
        let id = self.head.expect("fork database is empty");
        Arc::clone(&self.by_id[&id])
    }

    fn insert_indexes(&mut self, meta: Arc<MetaBlock>) {
        let id = meta.id();
        self.by_previous.entry(meta.previous()).or_default().push(id);
        self.by_number.entry(meta.number()).or_default().push(id);
        self.by_id.insert(id, meta);
    }

    fn unindex(&mut self, id: BlockId) {
        let meta = self.by_id.remove(&id).expect("unindex of unknown block");

        let previous = meta.previous();
        let mut drop_children = false;
        if let Some(children) = self.by_previous.get_mut(&previous) {
            children.retain(|c| *c != id);
            drop_children = children.is_empty();
        }
        if drop_children {
            self.by_previous.remove(&previous);
        }

        let number = meta.number();
        let mut drop_numbers = false;
        if let Some(ids) = self.by_number.get_mut(&number) {
            ids.retain(|c| *c != id);
            drop_numbers = ids.is_empty();
        }
        if drop_numbers {
            self.by_number.remove(&number);
        }
    }

    /// Link `start` (whose parent carries `parent_weight`) and every
    /// dangling descendant now reachable through it, advancing the head
    /// as better branches appear.
    fn link_subtree(&mut self, start: BlockId, parent_weight: u64) {
        let mut stack = vec![(start, parent_weight)];
        while let Some((id, pw)) = stack.pop() {
            let meta = Arc::clone(&self.by_id[&id]);
            meta.link(pw);
            self.maybe_advance_head(&meta);
            let weight = meta.chain_weight().expect("block was just linked");
            if let Some(children) = self.by_previous.get(&id) {
                for child in children.clone() {
                    if !self.by_id[&child].is_linked() {
                        stack.push((child, weight));
                    }
                }
            }
        }
    }

    /// Greater chain weight wins; on an exact tie the numerically lower
    /// id wins, keeping head selection deterministic across nodes.
    fn maybe_advance_head(&mut self, candidate: &Arc<MetaBlock>) {
        let current = self.head_block();
        if candidate.id() == current.id() {
            return;
        }
        let cw = candidate.chain_weight().expect("head candidate is linked");
        let hw = current.chain_weight().expect("head is always linked");
        if cw > hw || (cw == hw && candidate.id() < current.id()) {
            tracing::info!(
                old = %current.id(),
                new = %candidate.id(),
                number = candidate.number(),
                "head switched"
            );
            self.head = Some(candidate.id());
        }
    }

    fn recompute_head(&mut self) {
        self.head = self
            .by_id
            .values()
            .filter(|m| m.is_linked())
            .max_by(|a, b| {
                a.chain_weight()
                    .cmp(&b.chain_weight())
                    .then_with(|| b.id().cmp(&a.id()))
            })
            .map(|m| m.id());
    }

    fn subtree(&self, start: BlockId) -> HashSet<BlockId> {
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(children) = self.by_previous.get(&id) {
                stack.extend(children.iter().copied());
            }
        }
        seen
    }
}

impl Default for ForkDatabase {
    fn default() -> Self {
        Self::new()
    }
}
