//! Error types for tola-reconcile.
//!
//! The diff algorithms themselves cannot fail. The only rejected input is a
//! snapshot whose keys are not unique within one level, which would make
//! identity matching ambiguous.

use std::fmt;

use thiserror::Error;

/// Collection level a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLevel {
    /// Section keys of a sectioned snapshot
    Section,
    /// Row keys, unique across all sections of one snapshot
    Row,
    /// Keys of a flat item list
    Item,
    /// Keys of a managed child list
    Child,
}

impl fmt::Display for KeyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Section => "section",
            Self::Row => "row",
            Self::Item => "item",
            Self::Child => "child",
        })
    }
}

/// Errors that can occur when reconciling two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The same key appears twice within one collection level
    #[error("duplicate {level} key {key} at positions {first} and {second}")]
    DuplicateKey {
        /// Level the duplicate was found in
        level: KeyLevel,
        /// Debug rendering of the offending key
        key: String,
        /// Flat position of the first occurrence
        first: usize,
        /// Flat position of the second occurrence
        second: usize,
    },
}

/// Result type alias for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

impl ReconcileError {
    /// Create a duplicate key error.
    pub fn duplicate(level: KeyLevel, key: &impl fmt::Debug, first: usize, second: usize) -> Self {
        Self::DuplicateKey {
            level,
            key: format!("{key:?}"),
            first,
            second,
        }
    }
}
