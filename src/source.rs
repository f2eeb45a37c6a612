//! Table source: applies reconciliation results to a host renderer.
//!
//! [`TableSource`] owns the current sectioned snapshot and a
//! [`TableRenderer`]. Each [`TableSource::set_data`] call moves the renderer
//! from the current snapshot to the new one in exactly one of three ways:
//!
//! - nothing to do
//! - one atomic [`TableRenderer::commit`] of the structural delta, followed by
//!   in-place content updates
//! - one non-animated [`TableRenderer::reload_all`]
//!
//! The source always ends up holding the new snapshot (last write wins).
//!
//! # Content policy
//!
//! A matched row whose content changed (a row reload, or a moved row with a
//! new fingerprint) is updated in place when old and new share a
//! [`ViewType`](crate::ViewType). Otherwise its view cannot be reused, and it
//! becomes a row delete at the old position plus a row insert at the new
//! position inside the same batch.
//!
//! A row present in both snapshots without a fingerprint on either side can
//! not be checked for content changes, so such an update is always a full
//! reload.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::algo::{
    IndexPath, SectionsDelta, SectionsStats, diff_sections_unchecked, validate_sections,
};
use crate::cost::{CostModel, ReloadReason, Strategy, row_count};
use crate::device::DeviceBudget;
use crate::error::ReconcileResult;
use crate::model::{KeyedItem, Section};

// =============================================================================
// Public Types
// =============================================================================

/// Host side of a table: receives batches, reloads and in-place updates.
pub trait TableRenderer<K, R = usize> {
    /// Apply a structural delta as one transaction.
    ///
    /// `sections` is the new snapshot; insert-side indices refer to it.
    fn commit(&mut self, delta: &SectionsDelta<K>, sections: &[Section<K, R>]);

    /// Discard all views and redraw `sections` without animation.
    fn reload_all(&mut self, sections: &[Section<K, R>]);

    /// Redraw the row at `at` (new snapshot position) with new content.
    fn update_row(&mut self, at: IndexPath, row: &KeyedItem<K, R>);

    /// Redraw the header and footer of section `index` (new snapshot position).
    fn update_section(&mut self, index: usize, section: &Section<K, R>);
}

/// What [`TableSource::set_data`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Snapshots were equivalent
    Unchanged,
    /// Batch committed and/or content updated in place
    Animated(SectionsStats),
    /// Full reload
    Reloaded(ReloadReason),
    /// Data replaced during an interactive move; renderer untouched
    Deferred,
}

impl Outcome {
    pub fn is_reload(&self) -> bool {
        matches!(self, Self::Reloaded(_))
    }
}

// =============================================================================
// TableSource
// =============================================================================

/// Current snapshot plus the renderer showing it
pub struct TableSource<K, R, V> {
    sections: Vec<Section<K, R>>,
    renderer: V,
    budget: DeviceBudget,
    cost: CostModel,
    interactive_move: bool,
}

impl<K, R, V> fmt::Debug for TableSource<K, R, V>
where
    K: fmt::Debug,
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSource")
            .field("sections", &self.sections)
            .field("budget", &self.budget)
            .field("cost", &self.cost)
            .field("interactive_move", &self.interactive_move)
            .finish_non_exhaustive()
    }
}

impl<K, R, V> TableSource<K, R, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    R: PartialEq,
    V: TableRenderer<K, R>,
{
    /// Validate `sections` and draw them with a full reload.
    pub fn new(
        mut renderer: V,
        sections: Vec<Section<K, R>>,
        budget: DeviceBudget,
    ) -> ReconcileResult<Self> {
        validate_sections(&sections)?;
        renderer.reload_all(&sections);
        Ok(Self {
            sections,
            renderer,
            budget,
            cost: CostModel::default(),
            interactive_move: false,
        })
    }

    /// Replace the cost model.
    pub fn with_cost_model(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    pub fn sections(&self) -> &[Section<K, R>] {
        &self.sections
    }

    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut V {
        &mut self.renderer
    }

    pub fn budget(&self) -> DeviceBudget {
        self.budget
    }

    pub fn set_budget(&mut self, budget: DeviceBudget) {
        self.budget = budget;
    }

    /// The user started dragging a row. The renderer already shows the
    /// result of the drag, so incoming data must not be diffed against it.
    pub fn begin_interactive_move(&mut self) {
        self.interactive_move = true;
    }

    pub fn end_interactive_move(&mut self) {
        self.interactive_move = false;
    }

    /// Move the renderer to `new`.
    ///
    /// Fails without touching the source or the renderer if `new` has
    /// duplicate section or row keys.
    pub fn set_data(
        &mut self,
        new: Vec<Section<K, R>>,
        animated: bool,
    ) -> ReconcileResult<Outcome> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("set_data", sections = new.len(), animated).entered();

        validate_sections(&new)?;

        if self.interactive_move {
            self.sections = new;
            return Ok(Outcome::Deferred);
        }
        if !animated {
            return Ok(self.reload(new, ReloadReason::NotAnimated));
        }

        let pre = self
            .cost
            .pre_check(row_count(&self.sections), row_count(&new), self.budget);
        if let Strategy::Reload(reason) = pre {
            return Ok(self.reload(new, reason));
        }

        let untracked = untracked_rows(&self.sections, &new);
        if untracked > 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(untracked, "matched rows without fingerprint, reloading");
            return Ok(self.reload(new, ReloadReason::UntrackedContent { rows: untracked }));
        }

        let mut delta = diff_sections_unchecked(&self.sections, &new);
        let in_place = apply_content_policy(&self.sections, &new, &mut delta);

        if let Strategy::Reload(reason) = self.cost.post_check(&delta.stats, self.budget) {
            return Ok(self.reload(new, reason));
        }
        if delta.is_structurally_empty()
            && in_place.is_empty()
            && delta.section_updates.is_empty()
        {
            self.sections = new;
            return Ok(Outcome::Unchanged);
        }

        if !delta.is_structurally_empty() {
            self.renderer.commit(&delta, &new);
        }
        for path in in_place {
            if let Some(row) = row_at(&new, path) {
                self.renderer.update_row(path, row);
            }
        }
        for &(_, index) in &delta.section_updates {
            if let Some(section) = new.get(index) {
                self.renderer.update_section(index, section);
            }
        }

        self.sections = new;
        Ok(Outcome::Animated(delta.stats))
    }

    fn reload(&mut self, new: Vec<Section<K, R>>, reason: ReloadReason) -> Outcome {
        self.renderer.reload_all(&new);
        self.sections = new;
        Outcome::Reloaded(reason)
    }
}

// =============================================================================
// Content Policy
// =============================================================================

fn row_at<K, R>(sections: &[Section<K, R>], path: IndexPath) -> Option<&KeyedItem<K, R>> {
    sections.get(path.section)?.rows.get(path.row)
}

/// Number of rows matched by key whose old or new fingerprint is missing.
fn untracked_rows<K, R>(old: &[Section<K, R>], new: &[Section<K, R>]) -> usize
where
    K: Eq + Hash,
{
    let old_tracked: FxHashMap<&K, bool> = old
        .iter()
        .flat_map(|s| s.rows.iter())
        .map(|row| (&row.key, row.fingerprint.is_some()))
        .collect();

    new.iter()
        .flat_map(|s| s.rows.iter())
        .filter(|row| match old_tracked.get(&row.key) {
            Some(&tracked) => !tracked || row.fingerprint.is_none(),
            None => false,
        })
        .count()
}

/// Split content changes into in-place updates and delete + insert pairs.
///
/// Returns the new positions of the rows to update in place, ascending.
fn apply_content_policy<K, R>(
    old: &[Section<K, R>],
    new: &[Section<K, R>],
    delta: &mut SectionsDelta<K>,
) -> Vec<IndexPath> {
    let mut in_place = Vec::new();
    let mut replaced = Vec::new();

    let reloads = std::mem::take(&mut delta.row_reloads);
    for reload in reloads {
        let reusable = match (row_at(old, reload.from), row_at(new, reload.to)) {
            (Some(from), Some(to)) => from.same_view_type(to),
            _ => true,
        };
        if reusable {
            in_place.push(reload.to);
            delta.row_reloads.push(reload);
        } else {
            delta.stats.rows_reloaded -= 1;
            replaced.push((reload.from, reload.to));
        }
    }

    let moves = std::mem::take(&mut delta.row_moves);
    for (from_path, to_path) in moves {
        match (row_at(old, from_path), row_at(new, to_path)) {
            (Some(from), Some(to))
                if from.fingerprint != to.fingerprint && !from.same_view_type(to) =>
            {
                delta.stats.rows_moved -= 1;
                replaced.push((from_path, to_path));
            }
            (Some(from), Some(to)) if from.fingerprint != to.fingerprint => {
                in_place.push(to_path);
                delta.row_moves.push((from_path, to_path));
            }
            _ => delta.row_moves.push((from_path, to_path)),
        }
    }

    if !replaced.is_empty() {
        delta.stats.rows_deleted += replaced.len();
        delta.stats.rows_inserted += replaced.len();
        for (from, to) in replaced {
            delta.row_deletes.push(from);
            delta.row_inserts.push(to);
        }
        delta.row_deletes.sort_unstable();
        delta.row_inserts.sort_unstable();
    }

    in_place.sort_unstable();
    in_place
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KeyLevel, ReconcileError};
    use crate::id::Fingerprint;

    type Row = KeyedItem<&'static str>;
    type S = Section<&'static str>;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Commit(SectionsDelta<&'static str>),
        ReloadAll(usize),
        UpdateRow(IndexPath),
        UpdateSection(usize),
    }

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl TableRenderer<&'static str> for Recorder {
        fn commit(&mut self, delta: &SectionsDelta<&'static str>, _sections: &[S]) {
            self.calls.push(Call::Commit(delta.clone()));
        }

        fn reload_all(&mut self, sections: &[S]) {
            self.calls.push(Call::ReloadAll(sections.len()));
        }

        fn update_row(&mut self, at: IndexPath, _row: &Row) {
            self.calls.push(Call::UpdateRow(at));
        }

        fn update_section(&mut self, index: usize, _section: &S) {
            self.calls.push(Call::UpdateSection(index));
        }
    }

    fn row(key: &'static str, rank: usize, text: &str, view: &str) -> Row {
        KeyedItem::new(key, rank)
            .with_fingerprint(Fingerprint::of_str(text))
            .with_view_type(view)
    }

    /// Section of rows fingerprinted by their key
    fn plain(key: &'static str, rows: &[&'static str]) -> S {
        Section::new(key, 0).with_rows(rows.iter().enumerate().map(|(i, &k)| {
            KeyedItem::new(k, i).with_fingerprint(Fingerprint::of_str(k))
        }))
    }

    fn source(sections: Vec<S>) -> TableSource<&'static str, usize, Recorder> {
        let mut source =
            TableSource::new(Recorder::default(), sections, DeviceBudget::DEFAULT).unwrap();
        source.renderer_mut().calls.clear();
        source
    }

    #[test]
    fn test_new_reloads() {
        let sections = vec![plain("a", &["1"])];
        let source =
            TableSource::new(Recorder::default(), sections, DeviceBudget::DEFAULT).unwrap();
        assert_eq!(source.renderer().calls, vec![Call::ReloadAll(1)]);
    }

    #[test]
    fn test_unchanged() {
        let mut source = source(vec![plain("a", &["1", "2"])]);
        let outcome = source.set_data(vec![plain("a", &["1", "2"])], true).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert!(source.renderer().calls.is_empty());
    }

    #[test]
    fn test_not_animated_reloads() {
        let mut source = source(vec![plain("a", &["1"])]);
        let outcome = source.set_data(vec![plain("a", &["2"])], false).unwrap();
        assert_eq!(outcome, Outcome::Reloaded(ReloadReason::NotAnimated));
        assert_eq!(source.renderer().calls, vec![Call::ReloadAll(1)]);
        assert_eq!(source.sections()[0].rows[0].key, "2");
    }

    #[test]
    fn test_structural_change_commits_once() {
        let mut source = source(vec![plain("a", &["1", "2"])]);
        let outcome = source.set_data(vec![plain("a", &["1", "3"])], true).unwrap();

        let Outcome::Animated(stats) = outcome else {
            panic!("expected animation, got {outcome:?}");
        };
        assert_eq!((stats.rows_deleted, stats.rows_inserted), (1, 1));
        let [Call::Commit(delta)] = source.renderer().calls.as_slice() else {
            panic!("expected one commit: {:?}", source.renderer().calls);
        };
        assert_eq!(delta.row_deletes, vec![IndexPath::new(0, 1)]);
        assert_eq!(delta.row_inserts, vec![IndexPath::new(0, 1)]);
    }

    #[test]
    fn test_same_view_type_updates_in_place() {
        let old = vec![Section::new("a", 0).with_rows([row("1", 0, "old", "Text")])];
        let new = vec![Section::new("a", 0).with_rows([row("1", 0, "new", "Text")])];
        let mut source = source(old);

        let outcome = source.set_data(new, true).unwrap();
        assert!(matches!(outcome, Outcome::Animated(s) if s.rows_reloaded == 1));
        assert_eq!(source.renderer().calls, vec![Call::UpdateRow(IndexPath::new(0, 0))]);
    }

    #[test]
    fn test_changed_view_type_becomes_delete_insert() {
        let old = vec![Section::new("a", 0).with_rows([row("1", 0, "off", "Text")])];
        let new = vec![Section::new("a", 0).with_rows([row("1", 0, "on", "Switch")])];
        let mut source = source(old);

        let Outcome::Animated(stats) = source.set_data(new, true).unwrap() else {
            panic!("expected animation");
        };
        assert_eq!(stats.rows_reloaded, 0);
        assert_eq!((stats.rows_deleted, stats.rows_inserted), (1, 1));

        let [Call::Commit(delta)] = source.renderer().calls.as_slice() else {
            panic!("expected one commit: {:?}", source.renderer().calls);
        };
        assert_eq!(delta.row_deletes, vec![IndexPath::new(0, 0)]);
        assert_eq!(delta.row_inserts, vec![IndexPath::new(0, 0)]);
        assert!(delta.row_reloads.is_empty());
    }

    #[test]
    fn test_moved_row_with_new_content() {
        let old = vec![
            Section::new("a", 0).with_rows([row("1", 0, "x", "Text")]),
            Section::new("b", 1).with_rows([row("2", 0, "y", "Text")]),
        ];
        let new = vec![
            Section::new("a", 0),
            Section::new("b", 1).with_rows([row("2", 0, "y", "Text"), row("1", 1, "x2", "Text")]),
        ];
        let mut source = source(old);

        let _ = source.set_data(new, true).unwrap();
        let calls = &source.renderer().calls;
        assert_eq!(calls.len(), 2, "{calls:?}");
        let Call::Commit(delta) = &calls[0] else {
            panic!("expected commit first: {calls:?}");
        };
        assert_eq!(delta.row_moves, vec![(IndexPath::new(0, 0), IndexPath::new(1, 1))]);
        assert_eq!(calls[1], Call::UpdateRow(IndexPath::new(1, 1)));
    }

    #[test]
    fn test_section_update() {
        let old = vec![plain("a", &["1"]).with_titles(Some("Inbox"), None)];
        let new = vec![plain("a", &["1"]).with_titles(Some("Inbox (1)"), None)];
        let mut source = source(old);

        let _ = source.set_data(new, true).unwrap();
        assert_eq!(source.renderer().calls, vec![Call::UpdateSection(0)]);
    }

    #[test]
    fn test_untracked_rows_reload() {
        let untracked = || vec![Section::new("s", 0).with_rows([KeyedItem::new("a", 0)])];
        let mut source = source(untracked());

        let outcome = source.set_data(untracked(), true).unwrap();
        assert_eq!(
            outcome,
            Outcome::Reloaded(ReloadReason::UntrackedContent { rows: 1 })
        );
        assert_eq!(source.renderer().calls, vec![Call::ReloadAll(1)]);
    }

    #[test]
    fn test_fingerprint_dropped_on_one_side_reloads() {
        let mut source = source(vec![plain("s", &["a", "b"])]);
        let new = vec![Section::new("s", 0).with_rows([
            KeyedItem::new("a", 0).with_fingerprint(Fingerprint::of_str("a")),
            KeyedItem::new("b", 1),
        ])];

        let outcome = source.set_data(new, true).unwrap();
        assert_eq!(
            outcome,
            Outcome::Reloaded(ReloadReason::UntrackedContent { rows: 1 })
        );
    }

    #[test]
    fn test_untracked_rows_without_match_animate() {
        // only the inserted row lacks a fingerprint
        let mut source = source(vec![plain("s", &["a"])]);
        let new = vec![Section::new("s", 0).with_rows([
            KeyedItem::new("a", 0).with_fingerprint(Fingerprint::of_str("a")),
            KeyedItem::new("b", 1),
        ])];

        let outcome = source.set_data(new, true).unwrap();
        assert!(matches!(outcome, Outcome::Animated(s) if s.rows_inserted == 1));
    }

    #[test]
    fn test_over_budget_reloads() {
        let rows: Vec<&'static str> = vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];
        let mut source = source(vec![plain("a", &rows)]);
        source.set_budget(DeviceBudget::new(14));

        let outcome = source.set_data(vec![plain("a", &[])], true).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Reloaded(ReloadReason::Estimate { estimate: 14, .. })
        ));
        assert_eq!(source.renderer().calls, vec![Call::ReloadAll(1)]);
    }

    #[test]
    fn test_post_check_reloads() {
        // two sections swap all rows: pre-estimate is small, real cost is not
        let old = vec![plain("a", &["1", "2", "3"]), plain("b", &["4"])];
        let new = vec![
            Section::new("c", 0).with_rows(["5", "6", "7"].into_iter().enumerate().map(|(i, k)| {
                KeyedItem::new(k, i).with_fingerprint(Fingerprint::of_str(k))
            })),
            plain("b", &["4"]),
        ];
        let mut source = source(old).with_cost_model(CostModel::new(1, 13, 3));
        // pre: (4 + 4) / 1 = 8, post: (3 * 13 + 3 * 3) / 1 = 48
        source.set_budget(DeviceBudget::new(9));

        let outcome = source.set_data(new, true).unwrap();
        assert_eq!(
            outcome,
            Outcome::Reloaded(ReloadReason::AnimationCost {
                cost: 48,
                budget: DeviceBudget::new(9),
            })
        );
        assert_eq!(source.renderer().calls, vec![Call::ReloadAll(2)]);
    }

    #[test]
    fn test_duplicate_rejected_without_side_effects() {
        let mut source = source(vec![plain("a", &["1"])]);
        let err = source
            .set_data(vec![plain("a", &["1"]), plain("b", &["1"])], true)
            .unwrap_err();

        assert_eq!(err, ReconcileError::duplicate(KeyLevel::Row, &"1", 0, 1));
        assert!(source.renderer().calls.is_empty());
        assert_eq!(source.sections().len(), 1);
    }

    #[test]
    fn test_interactive_move_defers() {
        let mut source = source(vec![plain("a", &["1", "2"])]);
        source.begin_interactive_move();

        let outcome = source.set_data(vec![plain("a", &["2", "1"])], true).unwrap();
        assert_eq!(outcome, Outcome::Deferred);
        assert!(source.renderer().calls.is_empty());
        assert_eq!(source.sections()[0].rows[0].key, "2");

        source.end_interactive_move();
        let outcome = source.set_data(vec![plain("a", &["2", "1"])], true).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }
}
