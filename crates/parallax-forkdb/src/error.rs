//! Error types for the fork database

use parallax_primitives::BlockId;
use thiserror::Error;

/// Fork database errors
///
/// `Unlinkable` is the recoverable, caller-visible case: the caller may
/// buffer the block and retry once its parent arrives, up to its own
/// policy. Index corruption is never an error value; it panics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForkDbError {
    /// Parent unknown and outside the reordering window
    #[error(
        "unlinkable block {id}: parent {previous} is unknown and the block \
         is outside the allowed reordering window"
    )]
    Unlinkable {
        /// Id of the rejected block
        id: BlockId,
        /// Its unknown parent id
        previous: BlockId,
    },

    /// Block id not present in the index
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),

    /// The two blocks do not share an ancestor in the index
    #[error("no common ancestor between {first} and {second}")]
    NoCommonAncestor {
        /// First queried id
        first: BlockId,
        /// Second queried id
        second: BlockId,
    },

    /// The irreversible root cannot be removed
    #[error("cannot remove the irreversible root {0}")]
    CannotRemoveRoot(BlockId),

    /// The block is still dangling (not reachable from the root)
    #[error("block {0} is not linked to the root")]
    NotLinked(BlockId),
}

/// Result type for fork database operations
pub type ForkDbResult<T> = Result<T, ForkDbError>;
