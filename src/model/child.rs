//! Child records for managed child lists with deferred removal
//!
//! A child that leaves the list is not removed at once: it first plays an
//! exit transition. The lifecycle is an explicit state machine:
//!
//! ```text
//!            excluded from snapshot          exit finished
//! Visible ─────────────────────────▶ Hiding ─────────────▶ Hidden
//!    ▲                                  │
//!    └──────── included again ──────────┘
//! ```
//!
//! A `Hidden` child that is included again is never revived in place; it is
//! discarded and a fresh child is created at its new position.

/// Visibility state of a managed child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChildState {
    /// On screen
    #[default]
    Visible,
    /// Excluded from the latest snapshot, exit transition running
    Hiding,
    /// Exit transition finished; kept only as a placeholder
    Hidden,
}

impl ChildState {
    /// Next state along the exit path. `Hidden` is terminal.
    #[inline]
    pub const fn advance(self) -> Self {
        match self {
            Self::Visible => Self::Hiding,
            Self::Hiding | Self::Hidden => Self::Hidden,
        }
    }

    /// Check if the child is visible.
    #[inline]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Check if the child has finished its exit.
    #[inline]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// A retained child: its key and its current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRecord<K> {
    /// Identity key
    pub key: K,
    /// Current visibility state
    pub state: ChildState,
}

impl<K> ChildRecord<K> {
    /// Create a record in the given state.
    pub fn new(key: K, state: ChildState) -> Self {
        Self { key, state }
    }

    /// Create a freshly inserted, visible record.
    pub fn visible(key: K) -> Self {
        Self::new(key, ChildState::Visible)
    }
}

/// Signal sent by the renderer back to the child list
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChildEvent<K> {
    /// The exit transition of this child completed
    ExitFinished(K),
}
