//! Reconciliation algorithms.
//!
//! - `sequence`: flat keyed list differ
//! - `moves`: move minimization over a permutation
//! - `sections`: two-level sections/rows differ with cross-section row moves
//! - `children`: visibility-state differ for managed child lists
//! - `batch`: many independent reconciliations in parallel (feature `parallel`)
//! - `hash`: stable hashing for content fingerprints

#[cfg(feature = "parallel")]
pub mod batch;
mod children;
mod hash;
mod moves;
mod sections;
mod sequence;

pub use children::{ChildDiff, diff_children};
pub use hash::StableHasher;
pub use moves::displaced;
pub use sections::{IndexPath, RowReload, SectionsDelta, SectionsStats, diff_sections};
pub use sequence::{
    Delete, Delta, DeltaStats, Insert, Move, MoveDetection, Reload, diff_items, diff_items_with,
};

pub(crate) use sections::{diff_sections_unchecked, validate_sections};
