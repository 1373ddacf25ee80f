//! Block types for Parallax

use crate::transaction::Transaction;
use parallax_primitives::{BlockId, H256};
use sha3::{Digest, Keccak256};

/// Block header
///
/// The header is assumed already validated by the block-validation
/// collaborator before it reaches the fork database; nothing here
/// checks signatures or consensus rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Parent block id
    pub previous: BlockId,
    /// Block timestamp (Unix seconds)
    pub timestamp: u64,
    /// Validated chain-weight contribution of this block.
    ///
    /// Head selection sums these along a branch; a plain longest-chain
    /// rule is weight 1 per block.
    pub weight: u64,
    /// Transactions trie root
    pub transactions_root: H256,
}

impl BlockHeader {
    /// Block number (height), defined as `num_from_id(previous) + 1`.
    pub fn number(&self) -> u64 {
        self.previous.number() + 1
    }

    /// Content-derived block id with the block number stamped into the
    /// first four bytes.
    pub fn id(&self) -> BlockId {
        let mut hasher = Keccak256::new();
        hasher.update(self.previous.as_hash().as_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.weight.to_be_bytes());
        hasher.update(self.transactions_root.as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        BlockId::stamp(H256::from_bytes(digest), self.number())
    }
}

/// Complete block (header + transactions)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Block header
    pub header: BlockHeader,
    /// Transactions carried by the block
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block from a header and its transactions
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// The block's id (delegates to the header)
    pub fn id(&self) -> BlockId {
        self.header.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(previous: BlockId, weight: u64) -> BlockHeader {
        BlockHeader {
            previous,
            timestamp: 1_700_000_000,
            weight,
            transactions_root: H256::ZERO,
        }
    }

    #[test]
    fn test_number_derives_from_previous() {
        let genesis = header(BlockId::ZERO, 1);
        assert_eq!(genesis.number(), 1);

        let child = header(genesis.id(), 1);
        assert_eq!(child.number(), 2);
    }

    #[test]
    fn test_id_embeds_number() {
        let genesis = header(BlockId::ZERO, 1);
        let id = genesis.id();
        assert_eq!(id.number(), genesis.number());
    }

    #[test]
    fn test_id_is_content_derived() {
        let a = header(BlockId::ZERO, 1);
        let mut b = a.clone();
        b.timestamp += 1;
        assert_ne!(a.id(), b.id());
        // Same content, same id
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn test_sibling_ids_share_number() {
        let parent = header(BlockId::ZERO, 1);
        let c1 = header(parent.id(), 1);
        let mut c2 = header(parent.id(), 2);
        c2.timestamp += 7;
        assert_ne!(c1.id(), c2.id());
        assert_eq!(c1.id().number(), c2.id().number());
    }
}
