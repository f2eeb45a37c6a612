//! Hierarchical Differ (sections of rows)
//!
//! Composes the sequence differ across two levels. Sections are matched by
//! key; rows are diffed per matched section and then reconciled globally so
//! that a row leaving one section and entering another becomes a single row
//! move instead of a delete plus an insert.
//!
//! # Per matched section
//!
//! | chrome | rows changed | rank changed | result |
//! |--------|--------------|--------------|--------|
//! | differs | - | - | section delete + insert |
//! | same | no | no | unchanged |
//! | same | no | yes | section move |
//! | same | yes | no | row deletes/inserts/moves |
//! | same | yes | yes | section delete + insert |
//!
//! "Chrome" is the presence of header and footer. "Rows changed" counts
//! structural row edits only; row reloads never force a section edit.
//!
//! # Complexity
//!
//! - Time: O(S + R) for S sections and R rows
//! - Space: O(S + R)

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{KeyLevel, ReconcileResult};
use crate::model::Section;

use super::sequence::{MoveDetection, diff_indexed, index_keys, index_unique};

// =============================================================================
// Public Types
// =============================================================================

/// Position of a row: section index, then row index within the section
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    /// Create an index path.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Row matched with unchanged rank but changed content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReload<K> {
    pub key: K,
    /// Position before the update
    pub from: IndexPath,
    /// Position after the update
    pub to: IndexPath,
}

/// Statistics from a hierarchical diff
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionsStats {
    pub sections_deleted: usize,
    pub sections_inserted: usize,
    pub sections_moved: usize,
    /// Matched sections turned into delete + insert
    pub sections_replaced: usize,
    /// Row deletes, including rows of deleted and replaced sections
    pub rows_deleted: usize,
    /// Row inserts, including rows of inserted and replaced sections
    pub rows_inserted: usize,
    pub rows_moved: usize,
    pub rows_reloaded: usize,
}

/// Edit script for a sectioned snapshot
///
/// Indices on the delete side refer to the old snapshot, indices on the
/// insert side to the new one. The whole script must be applied as one
/// batch: none of the indices is meaningful against a half-updated list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SectionsDelta<K> {
    /// Old section indices, ascending
    pub section_deletes: Vec<usize>,
    /// New section indices, ascending
    pub section_inserts: Vec<usize>,
    /// `(old, new)` section indices
    pub section_moves: Vec<(usize, usize)>,
    /// `(old, new)` section indices whose header/footer content changed
    pub section_updates: Vec<(usize, usize)>,
    /// Old row positions, ascending
    pub row_deletes: Vec<IndexPath>,
    /// New row positions, ascending
    pub row_inserts: Vec<IndexPath>,
    /// `(old, new)` row positions, possibly across sections
    pub row_moves: Vec<(IndexPath, IndexPath)>,
    /// Rows to update in place, in new order
    pub row_reloads: Vec<RowReload<K>>,
    pub stats: SectionsStats,
}

impl<K> Default for SectionsDelta<K> {
    fn default() -> Self {
        Self {
            section_deletes: Vec::new(),
            section_inserts: Vec::new(),
            section_moves: Vec::new(),
            section_updates: Vec::new(),
            row_deletes: Vec::new(),
            row_inserts: Vec::new(),
            row_moves: Vec::new(),
            row_reloads: Vec::new(),
            stats: SectionsStats::default(),
        }
    }
}

impl<K> SectionsDelta<K> {
    /// No section or row deletes, inserts or moves
    pub fn is_structurally_empty(&self) -> bool {
        self.section_deletes.is_empty()
            && self.section_inserts.is_empty()
            && self.section_moves.is_empty()
            && self.row_deletes.is_empty()
            && self.row_inserts.is_empty()
            && self.row_moves.is_empty()
    }

    /// Nothing changed at all
    pub fn is_empty(&self) -> bool {
        self.is_structurally_empty()
            && self.row_reloads.is_empty()
            && self.section_updates.is_empty()
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two sectioned snapshots.
///
/// Fails if a section key repeats, or if a row key repeats anywhere in one
/// snapshot (row keys are global so rows can be followed across sections).
///
/// ```
/// use tola_reconcile::{diff_sections, IndexPath, KeyedItem, Section};
///
/// let old = vec![
///     Section::new("todo", 0).with_rows([KeyedItem::new("milk", 0)]),
///     Section::new("done", 1),
/// ];
/// let new = vec![
///     Section::new("todo", 0),
///     Section::new("done", 1).with_rows([KeyedItem::new("milk", 0)]),
/// ];
/// let delta = diff_sections(&old, &new).unwrap();
/// assert_eq!(delta.row_moves, vec![(IndexPath::new(0, 0), IndexPath::new(1, 0))]);
/// assert!(delta.row_deletes.is_empty() && delta.row_inserts.is_empty());
/// ```
pub fn diff_sections<K, R>(
    old: &[Section<K, R>],
    new: &[Section<K, R>],
) -> ReconcileResult<SectionsDelta<K>>
where
    K: Eq + Hash + Clone + fmt::Debug,
    R: PartialEq,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("diff_sections", old = old.len(), new = new.len()).entered();

    validate_sections(old)?;
    validate_sections(new)?;
    Ok(diff_sections_unchecked(old, new))
}

/// Reject duplicate section keys and duplicate row keys in one snapshot.
pub(crate) fn validate_sections<K, R>(sections: &[Section<K, R>]) -> ReconcileResult<()>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    index_keys(sections.iter().map(|s| &s.key), KeyLevel::Section)?;
    index_keys(
        sections.iter().flat_map(|s| s.rows.iter().map(|r| &r.key)),
        KeyLevel::Row,
    )?;
    Ok(())
}

/// Diff two snapshots that already passed [`validate_sections`].
pub(crate) fn diff_sections_unchecked<K, R>(
    old: &[Section<K, R>],
    new: &[Section<K, R>],
) -> SectionsDelta<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
    R: PartialEq,
{
    let mut ctx = SectionsContext::new(old.len());
    let old_index = index_unique(old.iter().map(|s| &s.key));
    let mut matched = vec![false; old.len()];

    for (to_idx, to) in new.iter().enumerate() {
        let Some(&from_idx) = old_index.get(&to.key) else {
            ctx.insert_section(to_idx, to.len());
            continue;
        };
        matched[from_idx] = true;
        ctx.diff_section(from_idx, &old[from_idx], to_idx, to);
    }

    for (from_idx, from) in old.iter().enumerate() {
        if !matched[from_idx] {
            ctx.delete_section(from_idx, from.len());
        }
    }

    ctx.into_delta()
}

// =============================================================================
// Internal Context
// =============================================================================

struct SectionsContext<K> {
    delta: SectionsDelta<K>,
    /// Rows deleted from matched sections, waiting for a matching insert
    pending_deletes: FxHashMap<K, IndexPath>,
    /// Rows inserted into matched sections, waiting for a matching delete
    pending_inserts: FxHashMap<K, IndexPath>,
}

impl<K> SectionsContext<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn new(sections: usize) -> Self {
        let mut delta = SectionsDelta::default();
        delta.section_moves.reserve(sections / 2);
        Self {
            delta,
            pending_deletes: FxHashMap::default(),
            pending_inserts: FxHashMap::default(),
        }
    }

    fn insert_section(&mut self, to_idx: usize, rows: usize) {
        self.delta.section_inserts.push(to_idx);
        self.delta.stats.sections_inserted += 1;
        self.delta.stats.rows_inserted += rows;
    }

    fn delete_section(&mut self, from_idx: usize, rows: usize) {
        self.delta.section_deletes.push(from_idx);
        self.delta.stats.sections_deleted += 1;
        self.delta.stats.rows_deleted += rows;
    }

    fn replace_section(
        &mut self,
        from_idx: usize,
        from_rows: usize,
        to_idx: usize,
        to_rows: usize,
    ) {
        self.delta.section_deletes.push(from_idx);
        self.delta.section_inserts.push(to_idx);
        self.delta.stats.sections_replaced += 1;
        self.delta.stats.rows_deleted += from_rows;
        self.delta.stats.rows_inserted += to_rows;
    }

    /// Diff one matched section pair
    fn diff_section<R: PartialEq>(
        &mut self,
        from_idx: usize,
        from: &Section<K, R>,
        to_idx: usize,
        to: &Section<K, R>,
    ) {
        if !from.same_chrome(to) {
            self.replace_section(from_idx, from.len(), to_idx, to.len());
            return;
        }

        let row_index = index_unique(from.rows.iter().map(|r| &r.key));
        let rows = diff_indexed(&from.rows, &to.rows, &row_index, MoveDetection::ByRank);

        match (rows.is_structurally_empty(), from.rank == to.rank) {
            (true, true) => {}
            (true, false) => {
                self.delta.section_moves.push((from_idx, to_idx));
                self.delta.stats.sections_moved += 1;
            }
            (false, true) => {
                for delete in rows.deletes {
                    self.delete_row(delete.key, IndexPath::new(from_idx, delete.old_idx));
                }
                for insert in rows.inserts {
                    self.insert_row(insert.key, IndexPath::new(to_idx, insert.new_idx));
                }
                for mv in rows.moves {
                    self.delta.row_moves.push((
                        IndexPath::new(from_idx, mv.old_idx),
                        IndexPath::new(to_idx, mv.new_idx),
                    ));
                    self.delta.stats.rows_moved += 1;
                }
            }
            (false, false) => {
                self.replace_section(from_idx, from.len(), to_idx, to.len());
                return;
            }
        }

        for reload in rows.reloads {
            self.delta.row_reloads.push(RowReload {
                key: reload.key,
                from: IndexPath::new(from_idx, reload.old_idx),
                to: IndexPath::new(to_idx, reload.new_idx),
            });
            self.delta.stats.rows_reloaded += 1;
        }

        if from.fingerprint != to.fingerprint {
            self.delta.section_updates.push((from_idx, to_idx));
        }
    }

    fn delete_row(&mut self, key: K, from: IndexPath) {
        if let Some(to) = self.pending_inserts.remove(&key) {
            self.delta.row_moves.push((from, to));
            self.delta.stats.rows_moved += 1;
        } else {
            self.pending_deletes.insert(key, from);
        }
    }

    fn insert_row(&mut self, key: K, to: IndexPath) {
        if let Some(from) = self.pending_deletes.remove(&key) {
            self.delta.row_moves.push((from, to));
            self.delta.stats.rows_moved += 1;
        } else {
            self.pending_inserts.insert(key, to);
        }
    }

    fn into_delta(mut self) -> SectionsDelta<K> {
        let delta = &mut self.delta;

        delta.row_deletes.extend(self.pending_deletes.into_values());
        delta.row_inserts.extend(self.pending_inserts.into_values());
        delta.stats.rows_deleted += delta.row_deletes.len();
        delta.stats.rows_inserted += delta.row_inserts.len();

        delta.section_deletes.sort_unstable();
        delta.section_inserts.sort_unstable();
        delta.row_deletes.sort_unstable();
        delta.row_inserts.sort_unstable();

        self.delta
    }
}

// =============================================================================
// Tests
// =============================================================================
