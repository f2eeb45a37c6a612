//! ChildStack - a retained child list with deferred removal
//!
//! Holds the [`ChildRecord`]s of one container across snapshots. Each
//! [`ChildStack::update`] runs the visibility-state differ, applies its
//! output in order (remove, insert, move) and then moves every record to its
//! new state. Exit transitions finish asynchronously on the renderer side and
//! come back as [`ChildEvent`]s.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::algo::{ChildDiff, diff_children};
use crate::error::ReconcileResult;
use crate::model::{ChildEvent, ChildRecord, ChildState};

/// Ordered child records of one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildStack<K> {
    records: Vec<ChildRecord<K>>,
}

impl<K> Default for ChildStack<K> {
    fn default() -> Self {
        Self { records: Vec::new() }
    }
}

impl<K> ChildStack<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile with the new ordered key set and return the applied diff.
    ///
    /// Afterwards [`visible_children`](Self::visible_children) yields exactly
    /// `new_keys`. Children that left the set stay in place as `Hiding`.
    pub fn update(&mut self, new_keys: &[K]) -> ReconcileResult<ChildDiff<K>> {
        let diff = diff_children(&self.records, new_keys)?;

        if !diff.remove.is_empty() {
            let stale: FxHashSet<&K> = diff.remove.iter().collect();
            self.records
                .retain(|r| !(r.state.is_hidden() && stale.contains(&r.key)));
        }

        for (key, index) in &diff.insert {
            self.records.insert(*index, ChildRecord::visible(key.clone()));
        }

        for (key, index) in &diff.moves {
            if let Some(from) = self.position(key) {
                let record = self.records.remove(from);
                self.records.insert(*index, record);
            }
        }

        let included: FxHashSet<&K> = new_keys.iter().collect();
        for record in &mut self.records {
            if included.contains(&record.key) {
                record.state = ChildState::Visible;
            } else if record.state.is_visible() {
                record.state = ChildState::Hiding;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            removed = diff.remove.len(),
            inserted = diff.insert.len(),
            moved = diff.moves.len(),
            retained = self.records.len(),
            "child stack updated"
        );

        Ok(diff)
    }

    /// Apply a renderer signal. Returns whether any record changed.
    pub fn handle(&mut self, event: ChildEvent<K>) -> bool {
        match event {
            ChildEvent::ExitFinished(key) => match self.position(&key) {
                Some(index) if self.records[index].state == ChildState::Hiding => {
                    self.records[index].state = ChildState::Hiding.advance();
                    true
                }
                _ => false,
            },
        }
    }

    /// Drop finished `Hidden` records. Returns how many were dropped.
    pub fn purge_hidden(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.state.is_hidden());
        before - self.records.len()
    }

    pub fn state_of(&self, key: &K) -> Option<ChildState> {
        self.position(key).map(|i| self.records[i].state)
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.records.iter().position(|r| &r.key == key)
    }
}

impl<K> ChildStack<K> {
    /// All retained keys, in order
    pub fn children(&self) -> impl Iterator<Item = &K> + '_ {
        self.records.iter().map(|r| &r.key)
    }

    /// Keys of `Visible` records, in order
    pub fn visible_children(&self) -> impl Iterator<Item = &K> + '_ {
        self.records
            .iter()
            .filter(|r| r.state.is_visible())
            .map(|r| &r.key)
    }

    pub fn records(&self) -> &[ChildRecord<K>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
