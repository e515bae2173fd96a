//! Sorting, normalisation and diagnostics of computed modes
use itertools::Itertools;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::solver::EigenPairs;

/// Convention fixing the arbitrary complex factor of every mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The shallowest entry that is not round-off is real and positive
    Surface,
    /// The entry of largest magnitude is real and positive
    LargestMagnitude,
}

/// Sorted and normalised eigenpairs, `Σ |φ|² = 1` for every mode
#[derive(Debug, Clone)]
pub struct ModeSet {
    /// Eigenvalues
    pub values: Vec<Complex64>,
    /// Modes, one per column
    pub vectors: DMatrix<Complex64>,
}

impl ModeSet {
    /// Number of modes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no modes
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sort by decreasing `key`, then normalise every mode and fix its phase
pub fn process(pairs: EigenPairs, key: impl Fn(&Complex64) -> f64, phase: Phase) -> ModeSet {
    let n = pairs.vectors.nrows();
    let mut order: Vec<usize> = (0..pairs.values.len()).collect();
    order.sort_by(|&a, &b| key(&pairs.values[b]).total_cmp(&key(&pairs.values[a])));

    let values = order.iter().map(|&i| pairs.values[i]).collect();
    let mut vectors = DMatrix::from_fn(n, order.len(), |r, c| pairs.vectors[(r, order[c])]);

    for mut column in vectors.column_iter_mut() {
        let norm = column.norm();

        if norm == 0. {
            continue;
        }

        let largest = column.iter().map(|x| x.norm()).fold(0., f64::max);
        let pivot = match phase {
            Phase::Surface => column
                .iter()
                .find(|x| x.norm() > 1e3 * f64::EPSILON * largest)
                .copied(),
            Phase::LargestMagnitude => column
                .iter()
                .copied()
                .reduce(|a, b| if b.norm() > a.norm() { b } else { a }),
        };

        let rotation = pivot.map_or(Complex64::new(1., 0.), |p| p.conj() / p.norm());

        column *= rotation / norm;
    }

    ModeSet { values, vectors }
}

/// Deformation radii `1 / sqrt(λ)` of neutral modes sorted by decreasing radius. The first mode
/// is barotropic and has an infinite radius.
pub fn deformation_radius(values: &[Complex64]) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, lambda)| {
            if i == 0 {
                f64::INFINITY
            } else {
                lambda.re.sqrt().recip()
            }
        })
        .collect()
}

/// Number of sign changes of `phi`.
///
/// Exact zeros are skipped, so `[1, 0, -1]` has one crossing and `[1, 0, 1]` none. Counting
/// `Σ |Δ sign| / 2` instead would give a zero half a crossing on each side, and a non-integer for
/// a zero at either end.
pub fn zero_crossings(phi: &[f64]) -> usize {
    phi.iter()
        .filter(|x| **x != 0.)
        .map(|x| x.is_sign_positive())
        .tuple_windows()
        .filter(|(a, b)| a != b)
        .count()
}
