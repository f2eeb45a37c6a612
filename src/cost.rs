//! Cost Estimator / Strategy Selector
//!
//! Decides between an animated batch update and a full non-animated reload.
//! Two gates run against the same [`DeviceBudget`]:
//!
//! 1. **Pre-estimate**, before any diff, from key counts alone:
//!    `(old + new + max(min_deletes * delete_weight, min_inserts * insert_weight)) / divisor`.
//!    An estimate at or above the budget skips the diff entirely.
//! 2. **Post-diff check**, from the real row counts of a computed delta:
//!    `(rows_deleted * delete_weight + rows_inserted * insert_weight) / divisor`.
//!    A cost above the budget discards the delta.
//!
//! Deletes weigh about four times as much as inserts because removal
//! animations are the more expensive ones to run.

use std::fmt;

use crate::algo::SectionsStats;
use crate::device::DeviceBudget;
use crate::model::Section;

/// Tuning constants of the cost formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    /// Divides every raw cost before comparing with the budget.
    /// Default: 10
    pub divisor: u32,
    /// Weight of one deleted row.
    /// Default: 13
    pub delete_weight: u32,
    /// Weight of one inserted row.
    /// Default: 3
    pub insert_weight: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(10, 13, 3)
    }
}

impl CostModel {
    /// Create a model with custom constants.
    pub const fn new(divisor: u32, delete_weight: u32, insert_weight: u32) -> Self {
        Self {
            divisor,
            delete_weight,
            insert_weight,
        }
    }

    /// Model that animates larger changes before reloading.
    pub const fn eager() -> Self {
        Self::new(20, 13, 3)
    }

    /// Model that falls back to reload sooner.
    pub const fn conservative() -> Self {
        Self::new(5, 13, 3)
    }

    /// Cheap estimate from key counts, before diffing.
    pub fn pre_estimate(&self, old_keys: usize, new_keys: usize) -> u64 {
        let min_deletes = old_keys.saturating_sub(new_keys) as u64;
        let min_inserts = new_keys.saturating_sub(old_keys) as u64;
        let diff_cost = old_keys as u64 + new_keys as u64;
        let animation_cost = (min_deletes * u64::from(self.delete_weight))
            .max(min_inserts * u64::from(self.insert_weight));
        (diff_cost + animation_cost) / self.divisor()
    }

    /// Animation cost of a computed delta.
    pub fn animation_cost(&self, stats: &SectionsStats) -> u64 {
        let deletes = stats.rows_deleted as u64 * u64::from(self.delete_weight);
        let inserts = stats.rows_inserted as u64 * u64::from(self.insert_weight);
        (deletes + inserts) / self.divisor()
    }

    /// Gate before diffing: reload when the estimate reaches the budget.
    pub fn pre_check(&self, old_keys: usize, new_keys: usize, budget: DeviceBudget) -> Strategy {
        let estimate = self.pre_estimate(old_keys, new_keys);
        if estimate >= u64::from(budget.get()) {
            #[cfg(feature = "tracing")]
            tracing::debug!(estimate, budget = budget.get(), "estimate over budget, reloading");
            Strategy::Reload(ReloadReason::Estimate { estimate, budget })
        } else {
            Strategy::Proceed
        }
    }

    /// Gate after diffing: reload when the animation cost exceeds the budget.
    pub fn post_check(&self, stats: &SectionsStats, budget: DeviceBudget) -> Strategy {
        let cost = self.animation_cost(stats);
        if cost > u64::from(budget.get()) {
            #[cfg(feature = "tracing")]
            tracing::debug!(cost, budget = budget.get(), "animation over budget, reloading");
            Strategy::Reload(ReloadReason::AnimationCost { cost, budget })
        } else {
            Strategy::Proceed
        }
    }

    #[inline]
    fn divisor(&self) -> u64 {
        u64::from(self.divisor.max(1))
    }
}

/// Outcome of a cost gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Strategy {
    /// Diff and animate
    Proceed,
    /// Skip animation and reload everything
    Reload(ReloadReason),
}

impl Strategy {
    pub fn is_reload(&self) -> bool {
        matches!(self, Self::Reload(_))
    }

    pub fn reload_reason(&self) -> Option<ReloadReason> {
        match self {
            Self::Proceed => None,
            Self::Reload(reason) => Some(*reason),
        }
    }
}

/// Why a full reload was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The caller asked for a non-animated update
    NotAnimated,
    /// Pre-estimate reached the budget
    Estimate { estimate: u64, budget: DeviceBudget },
    /// Real animation cost of the delta exceeded the budget
    AnimationCost { cost: u64, budget: DeviceBudget },
    /// Rows present in both snapshots carry no fingerprint, so a content
    /// change in them cannot be detected
    UntrackedContent { rows: usize },
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnimated => f.write_str("update not animated"),
            Self::Estimate { estimate, budget } => {
                write!(f, "estimated cost {estimate} reaches device budget {budget}")
            }
            Self::AnimationCost { cost, budget } => {
                write!(f, "animation cost {cost} exceeds device budget {budget}")
            }
            Self::UntrackedContent { rows } => {
                write!(f, "{rows} matched rows without fingerprint")
            }
        }
    }
}

/// Pre-estimate two sectioned snapshots with the default [`CostModel`].
///
/// Counts row keys across all sections.
///
/// ```
/// use tola_reconcile::{estimate_cost, DeviceBudget, KeyedItem, Section, Strategy};
///
/// let old = vec![Section::new(0, 0).with_rows((1..=10).map(|i| KeyedItem::new(i, i as usize)))];
/// let new = vec![Section::new(0, 0)];
/// assert_eq!(estimate_cost(&old, &new, DeviceBudget::DEFAULT), Strategy::Proceed);
/// assert!(estimate_cost(&old, &new, DeviceBudget::new(14)).is_reload());
/// ```
pub fn estimate_cost<K, R>(
    old: &[Section<K, R>],
    new: &[Section<K, R>],
    budget: DeviceBudget,
) -> Strategy {
    CostModel::default().pre_check(row_count(old), row_count(new), budget)
}

pub(crate) fn row_count<K, R>(sections: &[Section<K, R>]) -> usize {
    sections.iter().map(|s| s.rows.len()).sum()
}
