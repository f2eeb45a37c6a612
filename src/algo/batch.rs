//! Parallel batch reconciliation
//!
//! Independent (old, new) snapshot pairs, e.g. one per open table, share no
//! state, so each pair is validated and diffed on the rayon pool. Results keep
//! the input order; one failing pair does not affect the others.

use std::fmt;
use std::hash::Hash;

use rayon::prelude::*;

use crate::error::ReconcileResult;
use crate::model::Section;

use super::sections::{SectionsDelta, diff_sections};

/// Reconcile many independent snapshot pairs in parallel.
pub fn diff_sections_many<K, R>(
    pairs: &[(&[Section<K, R>], &[Section<K, R>])],
) -> Vec<ReconcileResult<SectionsDelta<K>>>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync,
    R: PartialEq + Sync,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("diff_sections_many", pairs = pairs.len()).entered();

    pairs
        .par_iter()
        .map(|&(old, new)| diff_sections(old, new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyedItem;

    type S = Section<u32>;

    fn table(seed: u32) -> Vec<S> {
        (0..4)
            .map(|s| {
                Section::new(seed * 100 + s, s as usize).with_rows(
                    (0..8).map(|r| KeyedItem::new(seed * 10_000 + s * 100 + r, r as usize)),
                )
            })
            .collect()
    }

    #[test]
    fn test_matches_sequential() {
        let olds: Vec<Vec<S>> = (0..16).map(table).collect();
        let news: Vec<Vec<S>> = olds
            .iter()
            .map(|t| {
                let mut t = t.clone();
                t.reverse();
                for (rank, section) in t.iter_mut().enumerate() {
                    section.rank = rank;
                }
                t
            })
            .collect();
        let pairs: Vec<(&[S], &[S])> = olds
            .iter()
            .zip(&news)
            .map(|(o, n)| (o.as_slice(), n.as_slice()))
            .collect();

        let parallel = diff_sections_many(&pairs);
        assert_eq!(parallel.len(), pairs.len());
        for (result, &(old, new)) in parallel.into_iter().zip(&pairs) {
            assert_eq!(result.unwrap(), diff_sections(old, new).unwrap());
        }
    }

    #[test]
    fn test_failure_is_isolated() {
        let good = table(1);
        let bad = vec![Section::new(1, 0), Section::new(1, 1)];
        let pairs = [
            (good.as_slice(), good.as_slice()),
            (good.as_slice(), bad.as_slice()),
        ];

        let results = diff_sections_many(&pairs);
        assert!(results[0].as_ref().is_ok_and(|d| d.is_empty()));
        assert!(results[1].is_err());
    }
}
