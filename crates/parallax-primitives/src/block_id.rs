//! Block identifiers
//!
//! A block id is a content-derived 256-bit hash whose first four bytes
//! are overwritten with the big-endian block number. This lets any
//! holder of an id recover the block height without a lookup, and makes
//! `num_from_id(previous) + 1` the defining equation for a header's
//! number.

use crate::hash::H256;
use std::fmt;

/// Content-derived block identifier with the block number stamped into
/// the first four bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockId(H256);

impl BlockId {
    /// Zero id, used as the parent of the genesis block.
    pub const ZERO: BlockId = BlockId(H256::ZERO);

    /// Build an id from a content hash and a block number.
    ///
    /// The number replaces the first four bytes of the hash; the
    /// remaining 28 bytes keep their content-derived value.
    pub fn stamp(mut hash: H256, number: u64) -> Self {
        let num = number as u32;
        hash.as_bytes_mut()[..4].copy_from_slice(&num.to_be_bytes());
        BlockId(hash)
    }

    /// Wrap a raw hash without stamping. Callers must guarantee the
    /// number prefix is already correct.
    pub const fn from_hash(hash: H256) -> Self {
        BlockId(hash)
    }

    /// The block number embedded in this id.
    pub fn number(&self) -> u64 {
        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&self.0.as_bytes()[..4]);
        u32::from_be_bytes(prefix) as u64
    }

    /// The underlying hash.
    pub fn as_hash(&self) -> &H256 {
        &self.0
    }

    /// Check if this is the zero id.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Recover the block number embedded in an id.
pub fn num_from_id(id: &BlockId) -> u64 {
    id.number()
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId(#{} {})", self.number(), self.0.to_hex())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl From<H256> for BlockId {
    fn from(hash: H256) -> Self {
        BlockId(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_embeds_number() {
        let id = BlockId::stamp(H256::from_bytes([0xff; 32]), 42);
        assert_eq!(id.number(), 42);
        assert_eq!(num_from_id(&id), 42);
        // Content bytes beyond the prefix survive
        assert_eq!(id.as_hash().as_bytes()[4], 0xff);
    }

    #[test]
    fn test_zero_id() {
        assert!(BlockId::ZERO.is_zero());
        assert_eq!(BlockId::ZERO.number(), 0);
    }

    #[test]
    fn test_ids_with_same_number_differ_by_content() {
        let a = BlockId::stamp(H256::from_bytes([0x01; 32]), 7);
        let b = BlockId::stamp(H256::from_bytes([0x02; 32]), 7);
        assert_ne!(a, b);
        assert_eq!(a.number(), b.number());
    }

    #[test]
    fn test_ordering_groups_by_number_first() {
        // The big-endian number prefix dominates lexicographic order.
        let low = BlockId::stamp(H256::from_bytes([0xff; 32]), 3);
        let high = BlockId::stamp(H256::from_bytes([0x00; 32]), 4);
        assert!(low < high);
    }

    #[test]
    fn test_large_number_truncates_to_u32() {
        let id = BlockId::stamp(H256::ZERO, (u32::MAX as u64) + 5);
        assert_eq!(id.number(), 4);
    }
}
