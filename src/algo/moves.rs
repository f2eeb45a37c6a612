//! Move minimization for permutations
//!
//! Given the elements common to two sequences, listed in old order and
//! labelled with their target index in new order, pick a set of elements to
//! "move" such that the rest are already in relative order. Animating only
//! the moved set then reproduces the new order.
//!
//! # Algorithm
//!
//! Greedy displacement reduction: repeatedly take the element whose
//! displacement `|index - target|` is largest (the last one on ties), splice
//! it into its target slot, record it, and stop once nothing is displaced.
//!
//! Elements that are never spliced only ever shift by one as others pass
//! them, so their relative order is the original one. The loop ends with a
//! sorted array, hence the unmoved elements were in order from the start.
//!
//! # Minimality
//!
//! The result is not guaranteed minimal. The optimum is the complement of a
//! longest increasing subsequence; `[2, 0, 4, 1, 3]` yields three moves here
//! where two suffice. Replacing the heuristic changes which elements animate,
//! so any switch has to be re-validated against the replay property.
//!
//! # Complexity
//!
//! - Time: O(n * m) where m is the number of splices (observed m < 1.5n)
//! - Space: O(n)

use std::collections::BTreeSet;

/// Target indices of the elements to move, ascending.
///
/// `targets[i]` is the new index of the element currently at `i`; `targets`
/// must be a permutation of `0..targets.len()`.
///
/// ```
/// use tola_reconcile::algo::displaced;
///
/// // b and a swapped, c stays
/// assert_eq!(displaced(&[1, 0, 2]), vec![0]);
/// ```
pub fn displaced(targets: &[usize]) -> Vec<usize> {
    debug_assert!(is_permutation(targets), "targets must be a permutation");

    let mut working = targets.to_vec();
    let mut moved = BTreeSet::new();

    while let Some((offset, target)) = most_displaced(&working) {
        let element = working.remove(offset);
        working.insert(target, element);
        moved.insert(target);
    }

    moved.into_iter().collect()
}

/// Position and target of the element with the largest non-zero displacement
fn most_displaced(working: &[usize]) -> Option<(usize, usize)> {
    let mut max = 0;
    let mut found = None;
    for (offset, &target) in working.iter().enumerate() {
        let distance = offset.abs_diff(target);
        if distance >= max {
            max = distance;
            found = Some((offset, target));
        }
    }
    found.filter(|_| max != 0)
}

fn is_permutation(targets: &[usize]) -> bool {
    let mut seen = vec![false; targets.len()];
    targets.iter().all(|&t| {
        t < seen.len() && !std::mem::replace(&mut seen[t], true)
    })
}
