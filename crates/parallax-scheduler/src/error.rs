//! Error types for the scheduler

use crate::shard::ShardId;
use parallax_types::ScopeName;
use thiserror::Error;

/// Scheduler errors
///
/// A scope conflict is the expected, frequent outcome of scheduling a
/// transaction whose scopes straddle two live shards. It is a value for
/// the caller to act on (defer to a later cycle or drop), never a
/// panic; nothing is retried automatically.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The transaction's scopes resolve to two distinct live shards
    #[error(
        "scope conflict: scope {scope} is owned by shard {second:?} \
         while the transaction is already bound to shard {first:?}"
    )]
    ScopeConflict {
        /// Shard the transaction was first bound to
        first: ShardId,
        /// The second, different shard a later scope resolved to
        second: ShardId,
        /// The scope that triggered the conflict
        scope: ScopeName,
    },
}

/// Result type for scheduler operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScheduleError::ScopeConflict {
            first: ShardId(0),
            second: ShardId(1),
            scope: ScopeName::from("alice"),
        };
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("conflict"));
    }
}
