//! Sequence Differ
//!
//! Single-level diff of two ordered, keyed lists. This is a pure algorithm
//! module: it never touches a renderer, it only describes what changed.
//!
//! # Algorithm
//!
//! 1. Index `old` by key (O(n))
//! 2. Walk `new` in order and look each key up:
//!    - not found: insert
//!    - found, rank changed: move
//!    - found, rank equal, fingerprint changed: reload
//!    - found, otherwise: unchanged
//! 3. Old entries never matched become deletes
//!
//! With [`MoveDetection::ByDisplacement`] ranks are ignored and the moved set
//! is chosen by [`displaced`](super::displaced) instead.
//!
//! # Ordering
//!
//! Moves, inserts and reloads are emitted in new order, deletes in old
//! order. Identical inputs give identical output.
//!
//! # Complexity
//!
//! - Time: O(n + m) by rank, O(n * d) by displacement
//! - Space: O(n + m)

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{KeyLevel, ReconcileError, ReconcileResult};
use crate::model::Keyed;

use super::moves::displaced;

// =============================================================================
// Public Types
// =============================================================================

/// How matched entries are classified as moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveDetection {
    /// A matched entry moved iff its rank changed
    #[default]
    ByRank,
    /// Ranks are ignored; the moved set is chosen so that the remaining
    /// matched entries keep their relative order
    ByDisplacement,
}

/// Entry removed from the old list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete<K> {
    pub key: K,
    pub old_idx: usize,
}

/// Entry added in the new list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert<K> {
    pub key: K,
    pub new_idx: usize,
}

/// Matched entry that changed position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move<K> {
    pub key: K,
    pub old_idx: usize,
    pub new_idx: usize,
}

/// Matched entry in place whose content changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reload<K> {
    pub key: K,
    pub old_idx: usize,
    pub new_idx: usize,
}

/// Statistics from a sequence diff
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeltaStats {
    /// Matched entries with nothing to do
    pub kept: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub moved: usize,
    pub reloaded: usize,
}

impl DeltaStats {
    /// Number of structural operations (reloads excluded)
    pub fn edit_count(&self) -> usize {
        self.inserted + self.deleted + self.moved
    }

    /// Check if there are no structural changes
    pub fn is_empty(&self) -> bool {
        self.edit_count() == 0
    }
}

/// Edit script turning one keyed list into another
///
/// Every key only in old is a delete, every key only in new is an insert,
/// and every key in both is exactly one of kept, moved or reloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Delta<K> {
    pub deletes: Vec<Delete<K>>,
    pub inserts: Vec<Insert<K>>,
    pub moves: Vec<Move<K>>,
    pub reloads: Vec<Reload<K>>,
    pub stats: DeltaStats,
}

impl<K> Default for Delta<K> {
    fn default() -> Self {
        Self {
            deletes: Vec::new(),
            inserts: Vec::new(),
            moves: Vec::new(),
            reloads: Vec::new(),
            stats: DeltaStats::default(),
        }
    }
}

impl<K> Delta<K> {
    /// No deletes, inserts or moves (reloads may remain)
    pub fn is_structurally_empty(&self) -> bool {
        self.deletes.is_empty() && self.inserts.is_empty() && self.moves.is_empty()
    }

    /// Nothing changed at all
    pub fn is_empty(&self) -> bool {
        self.is_structurally_empty() && self.reloads.is_empty()
    }

    /// Old indices to delete, ascending
    pub fn delete_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.deletes.iter().map(|d| d.old_idx)
    }

    /// New indices to insert at, ascending
    pub fn insert_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.inserts.iter().map(|i| i.new_idx)
    }

    /// `(old_idx, new_idx)` pairs of moved entries
    pub fn move_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.moves.iter().map(|m| (m.old_idx, m.new_idx))
    }

    /// Apply this delta to the old key order.
    ///
    /// Deleted and moved keys are taken out, moved and inserted keys are
    /// placed at their new index, and the remaining slots are filled with the
    /// surviving old keys in old order. Returns `None` if the delta does not
    /// fit `old`.
    ///
    /// ```
    /// use tola_reconcile::{diff_items, KeyedItem};
    ///
    /// let old = [KeyedItem::new("a", 0), KeyedItem::new("b", 1)];
    /// let new = [KeyedItem::new("b", 0), KeyedItem::new("c", 1), KeyedItem::new("a", 2)];
    /// let delta = diff_items(&old, &new).unwrap();
    /// assert_eq!(delta.replay(&["a", "b"]), Some(vec!["b", "c", "a"]));
    /// ```
    pub fn replay(&self, old: &[K]) -> Option<Vec<K>>
    where
        K: Clone,
    {
        let new_len = (old.len() + self.inserts.len()).checked_sub(self.deletes.len())?;
        let mut slots: Vec<Option<K>> = vec![None; new_len];
        let mut taken = vec![false; old.len()];

        for delete in &self.deletes {
            *taken.get_mut(delete.old_idx)? = true;
        }
        for mv in &self.moves {
            *taken.get_mut(mv.old_idx)? = true;
            *slots.get_mut(mv.new_idx)? = Some(mv.key.clone());
        }
        for insert in &self.inserts {
            *slots.get_mut(insert.new_idx)? = Some(insert.key.clone());
        }

        let mut survivors = old
            .iter()
            .zip(&taken)
            .filter(|(_, taken)| !**taken)
            .map(|(key, _)| key.clone());
        let replayed = slots
            .into_iter()
            .map(|slot| slot.or_else(|| survivors.next()))
            .collect::<Option<Vec<K>>>()?;

        survivors.next().is_none().then_some(replayed)
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two flat keyed lists, detecting moves by rank.
///
/// Fails if a key occurs twice in either list.
pub fn diff_items<T: Keyed>(old: &[T], new: &[T]) -> ReconcileResult<Delta<T::Key>> {
    diff_items_with(old, new, MoveDetection::default())
}

/// Diff two flat keyed lists with the given move detection.
pub fn diff_items_with<T: Keyed>(
    old: &[T],
    new: &[T],
    detection: MoveDetection,
) -> ReconcileResult<Delta<T::Key>> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("diff_items", old = old.len(), new = new.len()).entered();

    let old_index = index_keys(old.iter().map(Keyed::key), KeyLevel::Item)?;
    index_keys(new.iter().map(Keyed::key), KeyLevel::Item)?;
    Ok(diff_indexed(old, new, &old_index, detection))
}

// =============================================================================
// Internal
// =============================================================================

/// Map each key to its position, rejecting duplicates.
pub(crate) fn index_keys<'a, K, I>(
    keys: I,
    level: KeyLevel,
) -> ReconcileResult<FxHashMap<&'a K, usize>>
where
    K: Eq + Hash + std::fmt::Debug + 'a,
    I: IntoIterator<Item = &'a K>,
{
    let keys = keys.into_iter();
    let mut index = FxHashMap::with_capacity_and_hasher(keys.size_hint().0, Default::default());
    for (position, key) in keys.enumerate() {
        if let Some(first) = index.insert(key, position) {
            return Err(ReconcileError::duplicate(level, key, first, position));
        }
    }
    Ok(index)
}

/// Map each key to its position. Keys must already be unique.
pub(crate) fn index_unique<'a, K, I>(keys: I) -> FxHashMap<&'a K, usize>
where
    K: Eq + Hash + 'a,
    I: IntoIterator<Item = &'a K>,
{
    keys.into_iter().enumerate().map(|(i, k)| (k, i)).collect()
}

/// Diff with a prebuilt index of `old`. Keys must already be unique.
pub(crate) fn diff_indexed<T: Keyed>(
    old: &[T],
    new: &[T],
    old_index: &FxHashMap<&T::Key, usize>,
    detection: MoveDetection,
) -> Delta<T::Key> {
    if old.is_empty() && new.is_empty() {
        return Delta::default();
    }

    let moved = match detection {
        MoveDetection::ByRank => None,
        MoveDetection::ByDisplacement => Some(displaced_new_indices(new, old_index)),
    };

    let mut delta = Delta {
        deletes: Vec::with_capacity(old.len() / 2),
        inserts: Vec::with_capacity(new.len() / 2),
        moves: Vec::with_capacity(old.len() / 2),
        reloads: Vec::new(),
        stats: DeltaStats::default(),
    };
    let mut matched = vec![false; old.len()];

    for (new_idx, item) in new.iter().enumerate() {
        let key = item.key();
        let Some(&old_idx) = old_index.get(key) else {
            delta.inserts.push(Insert { key: key.clone(), new_idx });
            delta.stats.inserted += 1;
            continue;
        };
        debug_assert!(!matched[old_idx], "duplicate key in new list: {key:?}");
        matched[old_idx] = true;

        let prev = &old[old_idx];
        let is_move = match &moved {
            None => prev.rank() != item.rank(),
            Some(moved) => moved.get(new_idx).copied().unwrap_or(false),
        };

        if is_move {
            delta.moves.push(Move { key: key.clone(), old_idx, new_idx });
            delta.stats.moved += 1;
        } else if prev.fingerprint() != item.fingerprint() {
            delta.reloads.push(Reload { key: key.clone(), old_idx, new_idx });
            delta.stats.reloaded += 1;
        } else {
            delta.stats.kept += 1;
        }
    }

    for (old_idx, item) in old.iter().enumerate() {
        if !matched[old_idx] {
            delta.deletes.push(Delete { key: item.key().clone(), old_idx });
            delta.stats.deleted += 1;
        }
    }

    delta
}

/// Flags, per new index, whether the matched entry there must move
fn displaced_new_indices<T: Keyed>(new: &[T], old_index: &FxHashMap<&T::Key, usize>) -> Vec<bool> {
    // (old_idx, new_idx) of common entries, in new order
    let common: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(new_idx, item)| old_index.get(item.key()).map(|&old_idx| (old_idx, new_idx)))
        .collect();

    // common entries in old order, labelled with their rank among common entries in new order
    let mut by_old: Vec<(usize, usize)> = common
        .iter()
        .enumerate()
        .map(|(target, &(old_idx, _))| (old_idx, target))
        .collect();
    by_old.sort_unstable_by_key(|&(old_idx, _)| old_idx);
    let targets: Vec<usize> = by_old.iter().map(|&(_, target)| target).collect();

    let mut flags = vec![false; new.len()];
    for target in displaced(&targets) {
        flags[common[target].1] = true;
    }
    flags
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Fingerprint;
    use crate::model::KeyedItem;

    fn items(keys: &[&'static str]) -> Vec<KeyedItem<&'static str>> {
        keys.iter().enumerate().map(|(i, &k)| KeyedItem::new(k, i)).collect()
    }

    fn keys(list: &[KeyedItem<&'static str>]) -> Vec<&'static str> {
        list.iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_empty_sequences() {
        let delta = diff_items::<KeyedItem<&str>>(&[], &[]).unwrap();
        assert!(delta.is_empty());
        assert!(delta.stats.is_empty());
    }

    #[test]
    fn test_insert_all() {
        let delta = diff_items(&[], &items(&["a", "b", "c"])).unwrap();
        assert_eq!(delta.insert_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(delta.stats.inserted, 3);
        assert_eq!(delta.stats.deleted, 0);
    }

    #[test]
    fn test_delete_all() {
        let delta = diff_items(&items(&["a", "b", "c"]), &[]).unwrap();
        assert_eq!(delta.delete_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(delta.stats.deleted, 3);
    }

    #[test]
    fn test_identical_is_empty() {
        let list = items(&["a", "b", "c"]);
        let delta = diff_items(&list, &list).unwrap();
        assert!(delta.is_empty());
        assert_eq!(delta.stats.kept, 3);
    }

    #[test]
    fn test_reorder_swap() {
        let old = items(&["a", "b", "c"]);
        let new = items(&["b", "a", "c"]);
        let delta = diff_items(&old, &new).unwrap();

        assert_eq!(
            delta.moves,
            vec![
                Move { key: "b", old_idx: 1, new_idx: 0 },
                Move { key: "a", old_idx: 0, new_idx: 1 },
            ]
        );
        assert!(delta.deletes.is_empty());
        assert!(delta.inserts.is_empty());
        assert_eq!(delta.stats.kept, 1);
        assert_eq!(delta.replay(&keys(&old)), Some(keys(&new)));
    }

    #[test]
    fn test_same_rank_is_not_a_move() {
        // ranks are tokens, not indices: "c" keeps rank 30 although its index shifts
        let old = vec![KeyedItem::new("a", 10), KeyedItem::new("b", 20), KeyedItem::new("c", 30)];
        let new = vec![KeyedItem::new("a", 10), KeyedItem::new("c", 30)];
        let delta = diff_items(&old, &new).unwrap();

        assert_eq!(delta.deletes, vec![Delete { key: "b", old_idx: 1 }]);
        assert!(delta.moves.is_empty());
        assert_eq!(delta.stats.kept, 2);
        assert_eq!(delta.replay(&["a", "b", "c"]), Some(vec!["a", "c"]));
    }

    #[test]
    fn test_fingerprint_change_is_reload() {
        let old = vec![
            KeyedItem::new("a", 0).with_fingerprint(Fingerprint::of_str("one")),
            KeyedItem::new("b", 1).with_fingerprint(Fingerprint::of_str("two")),
        ];
        let new = vec![
            KeyedItem::new("a", 0).with_fingerprint(Fingerprint::of_str("one")),
            KeyedItem::new("b", 1).with_fingerprint(Fingerprint::of_str("TWO")),
        ];
        let delta = diff_items(&old, &new).unwrap();

        assert!(delta.is_structurally_empty());
        assert_eq!(delta.reloads, vec![Reload { key: "b", old_idx: 1, new_idx: 1 }]);
        assert_eq!(delta.stats.reloaded, 1);
    }

    #[test]
    fn test_moved_item_is_not_also_reloaded() {
        let old = vec![KeyedItem::new("a", 0).with_fingerprint(Fingerprint::of_str("x"))];
        let new = vec![KeyedItem::new("a", 1).with_fingerprint(Fingerprint::of_str("y"))];
        let delta = diff_items(&old, &new).unwrap();

        assert_eq!(delta.moves.len(), 1);
        assert!(delta.reloads.is_empty());
    }

    #[test]
    fn test_mixed_operations_order() {
        let old = items(&["a", "b", "c", "d"]);
        let new = items(&["a", "e", "c"]);
        let delta = diff_items(&old, &new).unwrap();

        // deletes in old order, inserts in new order
        assert_eq!(delta.delete_indices().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(delta.insert_indices().collect::<Vec<_>>(), vec![1]);
        assert_eq!(delta.stats.kept, 2);
        assert_eq!(delta.replay(&keys(&old)), Some(keys(&new)));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let old = items(&["a", "b", "a"]);
        let err = diff_items(&old, &items(&["a"])).unwrap_err();
        assert_eq!(err, ReconcileError::duplicate(KeyLevel::Item, &"a", 0, 2));

        let err = diff_items(&items(&["a"]), &items(&["b", "b"])).unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateKey { first: 0, second: 1, .. }));
    }

    #[test]
    fn test_by_displacement_ignores_rank_shift() {
        // every rank shifts after the insert, but only "d" is out of order
        let old = items(&["a", "b", "c", "d"]);
        let new = items(&["x", "d", "a", "b", "c"]);
        let delta = diff_items_with(&old, &new, MoveDetection::ByDisplacement).unwrap();

        assert_eq!(delta.moves, vec![Move { key: "d", old_idx: 3, new_idx: 1 }]);
        assert_eq!(delta.insert_indices().collect::<Vec<_>>(), vec![0]);
        assert_eq!(delta.stats.kept, 3);
        assert_eq!(delta.replay(&keys(&old)), Some(keys(&new)));

        let by_rank = diff_items(&old, &new).unwrap();
        assert_eq!(by_rank.stats.moved, 4);
    }

    #[test]
    fn test_replay_rejects_foreign_delta() {
        let delta = diff_items(&items(&["a", "b", "c"]), &items(&["c"])).unwrap();
        assert_eq!(delta.replay(&["a"]), None);
    }

    #[test]
    fn test_index_keys() {
        let keys = ["x", "y", "z"];
        let index = index_keys(keys.iter(), KeyLevel::Child).unwrap();
        assert_eq!(index[&"y"], 1);
        assert!(index_keys(["x", "x"].iter(), KeyLevel::Child).is_err());
    }
}
