//! Transaction types (scheduling view)

use bytes::Bytes;
use std::fmt;

/// An opaque resource-namespace identifier a transaction declares as
/// read or written (e.g. an account or table namespace).
///
/// Two transactions with intersecting write scopes must never execute
/// concurrently; the scheduler enforces this via the scope index.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeName(String);

impl ScopeName {
    /// Create a scope name
    pub fn new(name: impl Into<String>) -> Self {
        ScopeName(name.into())
    }

    /// The scope name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeName({:?})", self.0)
    }
}

impl fmt::Display for ScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScopeName {
    fn from(s: &str) -> Self {
        ScopeName(s.to_string())
    }
}

impl From<String> for ScopeName {
    fn from(s: String) -> Self {
        ScopeName(s)
    }
}

/// The scheduler's view of a transaction: its declared scope sets plus
/// an opaque executable payload.
///
/// Immutable once submitted. Consumed by exactly one shard; the
/// execution collaborator interprets the payload, this crate never does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Scopes this transaction writes, in declaration order
    pub write_scopes: Vec<ScopeName>,
    /// Scopes this transaction reads, in declaration order
    pub read_scopes: Vec<ScopeName>,
    /// Opaque executable payload
    pub payload: Bytes,
}

impl Transaction {
    /// Create a transaction from its declared scope sets and payload
    pub fn new(
        write_scopes: impl IntoIterator<Item = ScopeName>,
        read_scopes: impl IntoIterator<Item = ScopeName>,
        payload: Bytes,
    ) -> Self {
        Self {
            write_scopes: write_scopes.into_iter().collect(),
            read_scopes: read_scopes.into_iter().collect(),
            payload,
        }
    }

    /// Transaction that only writes the given scopes
    pub fn writing(scopes: impl IntoIterator<Item = ScopeName>) -> Self {
        Self::new(scopes, [], Bytes::new())
    }

    /// Check whether the transaction declares any scopes at all
    pub fn has_scopes(&self) -> bool {
        !self.write_scopes.is_empty() || !self.read_scopes.is_empty()
    }
}
