//! Configuration types for the Parallax core

use parallax_forkdb::{DEFAULT_SIZE_HINT, MAX_BLOCK_REORDERING};
use parallax_runtime::DEFAULT_WORKER_THREADS;

/// Core configuration: simple numeric parameters supplied at
/// construction. No dynamic reconfiguration mid-run.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Worker-pool thread count
    pub worker_threads: usize,
    /// How far out of order a block may arrive before rejection
    pub max_block_reordering: u64,
    /// Capacity hint for the fork database indexes
    pub fork_db_size_hint: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            max_block_reordering: MAX_BLOCK_REORDERING,
            fork_db_size_hint: DEFAULT_SIZE_HINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.worker_threads, 8);
        assert_eq!(config.max_block_reordering, 1024 * 256);
        assert_eq!(config.fork_db_size_hint, 1024);
    }
}
