//! Visibility-State Differ (managed child lists)
//!
//! Diffs a retained list of [`ChildRecord`]s against the new ordered set of
//! child keys. Children that left the set are *not* removed here: they stay
//! in the list while their exit transition runs, and the caller drives their
//! state. This differ only classifies by current state and new key set.
//!
//! # Output (apply in this order)
//!
//! 1. `remove`: `Hidden` records whose key is back in the set. They are
//!    discarded rather than revived, so a fresh child can be created.
//! 2. `insert`: keys not yet in the list, with an insertion index that keeps
//!    already known keys in their relative order. The index is the position
//!    of the preceding known key plus the insertions made so far plus one,
//!    or 0 when no known key precedes.
//! 3. `moves`: an insertion-sort pass over the list by target rank, each
//!    relocation recorded as `(key, new_index)`. A key in the set ranks at its
//!    new index; a key outside it ranks with the nearest preceding key in the
//!    set, so a hiding child stays next to its old neighbour.
//!
//! After applying all three, the keys in the set appear in set order.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{KeyLevel, ReconcileResult};
use crate::model::ChildRecord;

use super::sequence::{index_keys, index_unique};

/// Result of a child visibility diff
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ChildDiff<K> {
    /// Stale `Hidden` records to discard, in old order
    pub remove: Vec<K>,
    /// `(key, index)` insertions, applied in order
    pub insert: Vec<(K, usize)>,
    /// `(key, index)` relocations, applied in order after the inserts
    pub moves: Vec<(K, usize)>,
}

impl<K> Default for ChildDiff<K> {
    fn default() -> Self {
        Self {
            remove: Vec::new(),
            insert: Vec::new(),
            moves: Vec::new(),
        }
    }
}

impl<K> ChildDiff<K> {
    /// Nothing to remove, insert or move
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.insert.is_empty() && self.moves.is_empty()
    }
}

/// Diff retained child records against the new ordered key set.
///
/// Fails if a key repeats in either input.
///
/// ```
/// use tola_reconcile::{diff_children, ChildRecord, ChildState};
///
/// let old = [ChildRecord::new("a", ChildState::Hidden)];
/// let diff = diff_children(&old, &["a"]).unwrap();
/// assert_eq!(diff.remove, vec!["a"]);
/// assert_eq!(diff.insert, vec![("a", 0)]);
/// ```
pub fn diff_children<K>(old: &[ChildRecord<K>], new: &[K]) -> ReconcileResult<ChildDiff<K>>
where
    K: Eq + Hash + Clone + Debug,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("diff_children", old = old.len(), new = new.len()).entered();

    index_keys(old.iter().map(|r| &r.key), KeyLevel::Child)?;
    let new_index = index_keys(new.iter(), KeyLevel::Child)?;

    let mut diff = ChildDiff::default();

    // 1. Discard stale placeholders
    let mut working: Vec<&K> = Vec::with_capacity(old.len() + new.len());
    for record in old {
        if record.state.is_hidden() && new_index.contains_key(&record.key) {
            diff.remove.push(record.key.clone());
        } else {
            working.push(&record.key);
        }
    }

    // 2. Insert unknown keys behind their preceding known key
    let known = index_unique(working.iter().copied());
    let mut at = 0;
    for key in new {
        if let Some(&position) = known.get(key) {
            at = position + diff.insert.len() + 1;
        } else {
            diff.insert.push((key.clone(), at));
            working.insert(at, key);
            at += 1;
        }
    }

    // 3. Insertion sort by target rank
    let mut rank = 0;
    let mut order: Vec<(&K, usize)> = working
        .into_iter()
        .map(|key| {
            if let Some(&index) = new_index.get(key) {
                rank = index;
            }
            (key, rank)
        })
        .collect();

    for i in 1..order.len() {
        let mut j = i;
        while j > 0 && order[j - 1].1 > order[j].1 {
            order.swap(j - 1, j);
            j -= 1;
        }
        if j != i {
            diff.moves.push((order[j].0.clone(), j));
        }
    }

    Ok(diff)
}
