//! Error types for the core pipeline

use parallax_forkdb::ForkDbError;
use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum CoreError {
    /// Fork database rejected the block
    #[error(transparent)]
    ForkDb(#[from] ForkDbError),

    /// The worker pool went away before signalling drain completion
    #[error("worker pool drain did not complete")]
    DrainFailed,
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
