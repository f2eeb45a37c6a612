//! Prelude module for common imports.
//!
//! ```
//! use tola_reconcile::prelude::*;
//! ```

// Model
pub use crate::model::{ChildEvent, ChildRecord, ChildState, Keyed, KeyedItem, Section};

// Identity
pub use crate::id::{Fingerprint, ViewType};

// Algorithms
pub use crate::algo::{
    ChildDiff, Delta, IndexPath, MoveDetection, SectionsDelta, SectionsStats, diff_children,
    diff_items, diff_items_with, diff_sections,
};

// Strategy
pub use crate::cost::{CostModel, ReloadReason, Strategy, estimate_cost};
pub use crate::device::{BudgetTable, DeviceBudget, DeviceClass};

// Caller side
pub use crate::snapshot::SnapshotSlot;
pub use crate::source::{Outcome, TableRenderer, TableSource};
pub use crate::stack::ChildStack;

// Error
pub use crate::error::{ReconcileError, ReconcileResult};
