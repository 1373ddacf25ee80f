//! Meta-blocks
//!
//! An in-memory wrapper around a validated block header carrying the
//! content-derived id and the cumulative chain weight used for head
//! selection. The weight is set exactly once, when the block becomes
//! reachable from the root; a block pushed out of order stays unlinked
//! (and excluded from head selection) until its parent arrives.

use parallax_primitives::BlockId;
use parallax_types::BlockHeader;
use std::sync::OnceLock;

/// Indexable wrapper around a block header.
#[derive(Debug)]
pub struct MetaBlock {
    id: BlockId,
    header: BlockHeader,
    /// Cumulative validated chain weight from the genesis ancestor;
    /// unset while the block is dangling.
    chain_weight: OnceLock<u64>,
}

impl MetaBlock {
    /// Wrap a header, computing its id
    pub fn new(header: BlockHeader) -> Self {
        Self {
            id: header.id(),
            header,
            chain_weight: OnceLock::new(),
        }
    }

    /// Content-derived block id
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// The wrapped header
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Parent block id
    pub fn previous(&self) -> BlockId {
        self.header.previous
    }

    /// Block number (height)
    pub fn number(&self) -> u64 {
        self.header.number()
    }

    /// Cumulative chain weight, or `None` while dangling
    pub fn chain_weight(&self) -> Option<u64> {
        self.chain_weight.get().copied()
    }

    /// Whether the block is reachable from the root
    pub fn is_linked(&self) -> bool {
        self.chain_weight.get().is_some()
    }

    /// Mark the block reachable, recording its cumulative weight.
    /// Linking the same block twice is an index bug.
    pub(crate) fn link(&self, parent_weight: u64) {
        self.chain_weight
            .set(parent_weight + self.header.weight)
            .expect("meta block linked twice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_primitives::H256;

    fn header(previous: BlockId, weight: u64) -> BlockHeader {
        BlockHeader {
            previous,
            timestamp: 1_700_000_000,
            weight,
            transactions_root: H256::ZERO,
        }
    }

    #[test]
    fn test_new_meta_block_is_unlinked() {
        let meta = MetaBlock::new(header(BlockId::ZERO, 1));
        assert!(!meta.is_linked());
        assert_eq!(meta.chain_weight(), None);
        assert_eq!(meta.number(), 1);
    }

    #[test]
    fn test_link_accumulates_weight() {
        let meta = MetaBlock::new(header(BlockId::ZERO, 3));
        meta.link(10);
        assert!(meta.is_linked());
        assert_eq!(meta.chain_weight(), Some(13));
    }

    #[test]
    #[should_panic(expected = "meta block linked twice")]
    fn test_double_link_panics() {
        let meta = MetaBlock::new(header(BlockId::ZERO, 1));
        meta.link(0);
        meta.link(0);
    }

    #[test]
    fn test_id_matches_header() {
        let h = header(BlockId::ZERO, 1);
        let meta = MetaBlock::new(h.clone());
        assert_eq!(meta.id(), h.id());
        assert_eq!(meta.previous(), BlockId::ZERO);
    }
}
