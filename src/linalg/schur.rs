use nalgebra::DMatrix;
use num_complex::Complex64;

/// Eigenvalues and eigenvectors of the upper-triangular factor `t` of a complex Schur
/// decomposition `A = Q T Q^H`. The eigenvectors of `A` are `Q * y`.
///
/// Column `j` of `y` solves `(T - t_jj) y = 0` with `y_j = 1` and `y_i = 0` for `i > j`. Near
/// degenerate diagonal entries are perturbed to `eps * |T|`, as done in LAPACK's `ztrevc`.
///
/// Returns `None` if `t` has a non-negligible entry below the diagonal.
pub(crate) fn triangular_eigenvectors(
    t: &DMatrix<Complex64>,
) -> Option<(Vec<Complex64>, DMatrix<Complex64>)> {
    let n = t.nrows();
    assert_eq!(n, t.ncols());

    let norm = t.iter().map(|x| x.norm()).fold(0., f64::max);
    let small = f64::max(f64::EPSILON * norm, f64::MIN_POSITIVE);

    for c in 0..n.saturating_sub(1) {
        for r in (c + 1)..n {
            if t[(r, c)].norm() > 1e3 * small {
                return None;
            }
        }
    }

    let eigenvalues: Vec<Complex64> = (0..n).map(|i| t[(i, i)]).collect();
    let mut y = DMatrix::from_element(n, n, Complex64::new(0., 0.));

    for j in 0..n {
        let lambda = eigenvalues[j];
        y[(j, j)] = Complex64::new(1., 0.);

        for i in (0..j).rev() {
            let mut sum = Complex64::new(0., 0.);

            for m in (i + 1)..=j {
                sum += t[(i, m)] * y[(m, j)];
            }

            let mut denominator = t[(i, i)] - lambda;

            if denominator.norm() < small {
                denominator = Complex64::new(small, 0.);
            }

            y[(i, j)] = -sum / denominator;
        }
    }

    Some((eigenvalues, y))
}
