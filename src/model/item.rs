//! KeyedItem - a flat list entry or a section row

use crate::id::{Fingerprint, ViewType};

use super::Keyed;

/// A keyed, ranked entry with optional content tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedItem<K, R = usize> {
    /// Identity key, unique within its level
    pub key: K,
    /// Ordering token
    pub rank: R,
    /// Content fingerprint
    pub fingerprint: Option<Fingerprint>,
    /// Kind of view rendering this item
    pub view_type: Option<ViewType>,
}

impl<K, R> KeyedItem<K, R> {
    /// Create an item without content tracking.
    pub fn new(key: K, rank: R) -> Self {
        Self {
            key,
            rank,
            fingerprint: None,
            view_type: None,
        }
    }

    /// Set the content fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    /// Set the view type.
    pub fn with_view_type(mut self, view_type: impl Into<ViewType>) -> Self {
        self.view_type = Some(view_type.into());
        self
    }

    /// Whether `other` can be shown by updating this item's view in place.
    ///
    /// Two untyped items share the single default view kind.
    pub fn same_view_type(&self, other: &Self) -> bool {
        self.view_type == other.view_type
    }
}

impl<K, R> Keyed for KeyedItem<K, R>
where
    K: Eq + std::hash::Hash + Clone + std::fmt::Debug,
    R: PartialEq,
{
    type Key = K;
    type Rank = R;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    fn rank(&self) -> &R {
        &self.rank
    }

    #[inline]
    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }
}
