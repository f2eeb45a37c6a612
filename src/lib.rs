//! tola-reconcile - Keyed list reconciliation for animated views
//!
//! ## Core Concepts
//!
//! **Keyed snapshots**: the application replaces its data model wholesale.
//! Every entry carries a unique key (identity), a rank (ordering token) and
//! an optional fingerprint (content). Two snapshots are matched by key only.
//!
//! **Minimal edit scripts**: the differs turn (old, new) into deletes,
//! inserts, moves and in-place reloads, addressed by index so that a host
//! renderer can animate them as one atomic batch.
//!
//! **Cost gating**: a device-calibrated budget decides whether a change is
//! animated or simply reloaded.
//!
//! ## Modules
//! - `model`: `Keyed`, `KeyedItem`, `Section`, `ChildRecord`
//! - `algo`: sequence, move-minimization, sections and child differs
//! - `cost` / `device`: strategy selection against a `DeviceBudget`
//! - `source`: `TableSource` driving a `TableRenderer`
//! - `stack`: `ChildStack` with deferred child removal
//! - `snapshot`: last-write-wins hand-off between threads
//!
//! ## Usage
//!
//! ```
//! use tola_reconcile::{diff_sections, IndexPath, KeyedItem, Section};
//!
//! let old = vec![
//!     Section::new("inbox", 0).with_rows([KeyedItem::new("a", 0), KeyedItem::new("b", 1)]),
//! ];
//! let new = vec![
//!     Section::new("inbox", 0).with_rows([KeyedItem::new("b", 0), KeyedItem::new("a", 1)]),
//! ];
//!
//! let delta = diff_sections(&old, &new).unwrap();
//! assert_eq!(delta.row_moves.len(), 2);
//! assert!(delta.row_moves.contains(&(IndexPath::new(0, 1), IndexPath::new(0, 0))));
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Snapshot data model: Keyed, KeyedItem, Section, ChildRecord
pub mod model;

/// Content identity: Fingerprint, ViewType
pub mod id;

/// Algorithms: sequence, moves, sections, children
pub mod algo;

/// Cost estimator and strategy selection
pub mod cost;

/// Device budgets
pub mod device;

/// Applying deltas to a host renderer
pub mod source;

/// Retained child lists
pub mod stack;

/// Thread-safe snapshot hand-off
pub mod snapshot;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Model
pub use model::{ChildEvent, ChildRecord, ChildState, Keyed, KeyedItem, Rows, Section};

// Identity
pub use id::{Fingerprint, ViewType};

// Algorithms
pub use algo::{
    ChildDiff, Delta, DeltaStats, IndexPath, MoveDetection, RowReload, SectionsDelta,
    SectionsStats, StableHasher, diff_children, diff_items, diff_items_with, diff_sections,
};

// Strategy
pub use cost::{CostModel, ReloadReason, Strategy, estimate_cost};
pub use device::{BudgetTable, DeviceBudget, DeviceClass};

// Caller side
pub use snapshot::{SnapshotSlot, Versioned};
pub use source::{Outcome, TableRenderer, TableSource};
pub use stack::ChildStack;

// Error types
pub use error::{KeyLevel, ReconcileError, ReconcileResult};

// =============================================================================
// Tests
// =============================================================================
