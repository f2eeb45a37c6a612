//! Snapshot data model.
//!
//! A snapshot is an ordered list of keyed entries, either flat
//! (`[KeyedItem]`), two levels deep (`[Section]` of rows), or a managed child
//! list (`[ChildRecord]`) that remembers each child's visibility state.
//!
//! All differs work through the [`Keyed`] trait, so callers can also diff
//! their own types without converting them first.

mod child;
mod item;
mod section;

pub use child::{ChildEvent, ChildRecord, ChildState};
pub use item::KeyedItem;
pub use section::Section;

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

use crate::id::Fingerprint;

/// An entry that can be matched across two snapshots.
///
/// - `key` is the sole identity. It must be unique within one level.
/// - `rank` is an ordering token supplied by the caller. A matched entry whose
///   rank is unchanged is not a move, even if its index shifted because
///   siblings were inserted or deleted.
/// - `fingerprint` summarizes mutable content. A matched entry with the same
///   rank but a different fingerprint is reported as a reload.
pub trait Keyed {
    /// Identity key type
    type Key: Eq + Hash + Clone + Debug;
    /// Ordering token type
    type Rank: PartialEq;

    /// Identity key
    fn key(&self) -> &Self::Key;

    /// Ordering token
    fn rank(&self) -> &Self::Rank;

    /// Content fingerprint, `None` when content is not tracked
    #[inline]
    fn fingerprint(&self) -> Option<Fingerprint> {
        None
    }
}

impl<T: Keyed + ?Sized> Keyed for &T {
    type Key = T::Key;
    type Rank = T::Rank;

    #[inline]
    fn key(&self) -> &Self::Key {
        (**self).key()
    }

    #[inline]
    fn rank(&self) -> &Self::Rank {
        (**self).rank()
    }

    #[inline]
    fn fingerprint(&self) -> Option<Fingerprint> {
        (**self).fingerprint()
    }
}

/// Type alias for the rows of a section.
pub type Rows<K, R = usize> = SmallVec<[KeyedItem<K, R>; 8]>;
