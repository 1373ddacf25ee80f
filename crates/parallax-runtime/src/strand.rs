//! Strand identifiers

use std::fmt;

/// Handle to a FIFO execution lane owned by a [`WorkerPool`].
///
/// Strands are created by the pool and referenced only through this id;
/// the underlying queue is never exposed.
///
/// [`WorkerPool`]: crate::WorkerPool
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrandId(pub u32);

impl StrandId {
    /// Raw index of this strand inside its pool
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrandId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_id_ordering() {
        assert!(StrandId(0) < StrandId(1));
        assert_eq!(StrandId(3).as_u32(), 3);
    }
}
