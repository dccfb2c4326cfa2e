//! Random feature subspaces for boosting rounds.
//!
//! Each boosting round sees a fixed subset of the input features. Subspace
//! sizes are given as a percentage of the feature count; on low-dimensional
//! streams every k-combination is enumerated so rounds avoid sharing a
//! subspace, on high-dimensional streams subsets are drawn at random.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::constants::LOW_DIMENSIONALITY_THRESHOLD;
use crate::core::types::FeatureIndex;

/// Ordered set of feature indices assigned to one boosting round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subspace(Vec<FeatureIndex>);

impl Subspace {
    /// Create a subspace from feature indices
    pub fn new(indices: Vec<FeatureIndex>) -> Self {
        Subspace(indices)
    }

    /// Subspace covering features `0..n`
    pub fn full(n: usize) -> Self {
        Subspace((0..n).collect())
    }

    /// Feature indices
    pub fn indices(&self) -> &[FeatureIndex] {
        &self.0
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the subspace has no features
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over feature indices
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureIndex> {
        self.0.iter()
    }
}

/// Round half up, matching the usual rounding of percentages.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Resolve a signed percentage into a subspace size for `n` features.
///
/// Negative percentages select the complement (`100 + k_raw` percent).
/// Sizes that round below 2 are bumped by one. The result may be 0 or
/// exceed `n`, both meaning "no subspacing".
pub fn resolve_subspace_size(k_raw: i32, n: usize) -> usize {
    let percent = if k_raw < 0 {
        f64::from(100 + k_raw) / 100.0
    } else {
        f64::from(k_raw) / 100.0
    };
    let rounded = round_half_up(n as f64 * percent);
    let mut k = if rounded < 2 { rounded + 1 } else { rounded };
    if k < 0 {
        k += n as i64;
    }
    k.max(0) as usize
}

/// Every k-combination of `0..n` in lexicographic order.
pub fn all_k_combinations(k: usize, n: usize) -> Vec<Subspace> {
    let mut result = Vec::new();
    if k > n {
        return result;
    }
    let mut current: Vec<FeatureIndex> = (0..k).collect();
    loop {
        result.push(Subspace::new(current.clone()));

        // rightmost position that can still be advanced
        let Some(pos) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            break;
        };
        current[pos] += 1;
        for i in pos + 1..k {
            current[i] = current[i - 1] + 1;
        }
    }
    result
}

/// `count` independent k-subsets of `0..n`, each sorted.
///
/// Indices are distinct within a subset; subsets may repeat.
pub fn random_k_combinations<R: Rng + ?Sized>(
    k: usize,
    n: usize,
    count: usize,
    rng: &mut R,
) -> Vec<Subspace> {
    let k = k.min(n);
    (0..count)
        .map(|_| {
            let mut indices = index::sample(rng, n, k).into_vec();
            indices.sort_unstable();
            Subspace::new(indices)
        })
        .collect()
}

/// Draws one feature subspace per boosting round.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSubspaceSampler;

impl FeatureSubspaceSampler {
    /// Candidate subspaces from which the rounds' subspaces are selected.
    ///
    /// The pool holds at least `rounds` entries. On the enumeration path it
    /// starts with every combination, padded with cyclic copies.
    pub fn candidate_pool<R: Rng + ?Sized>(
        k_raw: i32,
        n: usize,
        rounds: usize,
        rng: &mut R,
    ) -> Vec<Subspace> {
        let mut k = resolve_subspace_size(k_raw, n);

        if k != 0 && k < n {
            if n <= LOW_DIMENSIONALITY_THRESHOLD || k < 2 {
                if k == 1 && n > 2 {
                    k = 2;
                }
                let mut pool = all_k_combinations(k, n);
                let distinct = pool.len();
                let mut i = 0;
                while pool.len() < rounds {
                    pool.push(pool[i % distinct].clone());
                    i += 1;
                }
                pool
            } else {
                random_k_combinations(k, n, rounds, rng)
            }
        } else if k == n {
            random_k_combinations(k, n, rounds, rng)
        } else {
            vec![Subspace::full(n); rounds]
        }
    }

    /// Generate `rounds` subspaces over `n` features.
    ///
    /// Each round takes a different slot of the candidate pool.
    pub fn generate<R: Rng + ?Sized>(
        k_raw: i32,
        n: usize,
        rounds: usize,
        rng: &mut R,
    ) -> Vec<Subspace> {
        let pool = Self::candidate_pool(k_raw, n, rounds, rng);
        let slots = index::sample(rng, pool.len(), rounds.min(pool.len()));
        slots.iter().map(|slot| pool[slot].clone()).collect()
    }
}
