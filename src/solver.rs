//! Eigensolvers for the discretised problems
use std::fmt::Display;
use std::str::FromStr;

use clap::ValueEnum;
use nalgebra::{DMatrix, Schur, SymmetricEigen};
use num_complex::Complex64;
use tracing::{debug, trace};

use crate::error::{invalid, ModeError};
use crate::linalg::schur::triangular_eigenvectors;
use crate::linalg::Tridiagonal;

const MAX_ITERATIONS: usize = 10_000;

/// Part of the spectrum to return, using the codes of ARPACK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Which {
    /// Largest magnitude
    #[value(name = "LM")]
    LargestMagnitude,
    /// Smallest magnitude
    #[value(name = "SM")]
    SmallestMagnitude,
    /// Largest real part
    #[value(name = "LR")]
    LargestReal,
    /// Smallest real part
    #[value(name = "SR")]
    SmallestReal,
    /// Largest imaginary part, i.e. fastest growing modes
    #[default]
    #[value(name = "LI")]
    LargestImaginary,
    /// Smallest imaginary part
    #[value(name = "SI")]
    SmallestImaginary,
}

impl Which {
    /// Key that is largest for the eigenvalues that should come first
    pub fn key(self) -> fn(&Complex64) -> f64 {
        match self {
            Which::LargestMagnitude => |x: &Complex64| x.norm(),
            Which::SmallestMagnitude => |x: &Complex64| -x.norm(),
            Which::LargestReal => |x: &Complex64| x.re,
            Which::SmallestReal => |x: &Complex64| -x.re,
            Which::LargestImaginary => |x: &Complex64| x.im,
            Which::SmallestImaginary => |x: &Complex64| -x.im,
        }
    }

    fn code(self) -> &'static str {
        match self {
            Which::LargestMagnitude => "LM",
            Which::SmallestMagnitude => "SM",
            Which::LargestReal => "LR",
            Which::SmallestReal => "SR",
            Which::LargestImaginary => "LI",
            Which::SmallestImaginary => "SI",
        }
    }
}

impl FromStr for Which {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Which::value_variants()
            .iter()
            .find(|which| which.code().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| invalid(format!("unknown sort order `{s}`")))
    }
}

impl Display for Which {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Implementation used for the dense and banded eigenvalue problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Pure Rust, based on nalgebra
    #[default]
    Native,
    /// LAPACK `dstevr` and `dggev3`
    #[cfg(feature = "lapack")]
    Lapack,
}

/// Eigenvalues and the matching eigenvectors, one per column
#[derive(Debug, Clone)]
pub struct EigenPairs {
    /// Eigenvalues
    pub values: Vec<Complex64>,
    /// Eigenvectors, column `i` belongs to `values[i]`
    pub vectors: DMatrix<Complex64>,
}

fn check_num(num: usize, n: usize) -> Result<(), ModeError> {
    if num == 0 || num > n {
        return Err(invalid(format!(
            "cannot compute {num} modes on a grid of {n} points"
        )));
    }

    Ok(())
}

/// The `num` smallest eigenpairs of `S x = λ M x`, with `S` symmetric and `M = diag(mass)`
/// positive definite
pub fn solve_symmetric(
    stiffness: &Tridiagonal,
    mass: &[f64],
    num: usize,
    backend: Backend,
) -> Result<EigenPairs, ModeError> {
    let n = stiffness.dim();
    check_num(num, n)?;
    assert_eq!(mass.len(), n);

    if !stiffness.is_symmetric() {
        return Err(invalid("stiffness matrix is not symmetric"));
    }

    if let Some(i) = mass.iter().position(|w| w.is_nan() || *w <= 0.) {
        return Err(invalid(format!("mass matrix is not positive at {i}")));
    }

    let inv_sqrt: Vec<f64> = mass.iter().map(|w| w.sqrt().recip()).collect();
    let reduced = stiffness.congruence(&inv_sqrt);

    debug!(n, num, ?backend, "Solving symmetric eigenvalue problem");

    let (values, vectors) = match backend {
        Backend::Native => {
            let decomposition =
                SymmetricEigen::try_new(reduced.to_dense(), f64::EPSILON, MAX_ITERATIONS)
                    .ok_or_else(|| {
                        ModeError::Convergence(
                            "symmetric eigensolver did not converge".to_string(),
                        )
                    })?;

            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| {
                decomposition.eigenvalues[a].total_cmp(&decomposition.eigenvalues[b])
            });
            order.truncate(num);

            let values: Vec<f64> = order.iter().map(|&i| decomposition.eigenvalues[i]).collect();
            let vectors =
                DMatrix::from_fn(n, num, |r, c| decomposition.eigenvectors[(r, order[c])]);

            (values, vectors)
        }
        #[cfg(feature = "lapack")]
        Backend::Lapack => {
            crate::linalg::lapack::tridiagonal_smallest(&reduced.diag, &reduced.lower, num)?
        }
    };

    if values.iter().any(|x| !x.is_finite()) {
        return Err(ModeError::Convergence(
            "symmetric eigensolver returned non-finite eigenvalues".to_string(),
        ));
    }

    trace!(?values, "Symmetric eigenvalues");

    let vectors =
        DMatrix::from_fn(n, num, |r, c| Complex64::new(vectors[(r, c)] * inv_sqrt[r], 0.));
    let values = values.into_iter().map(|x| Complex64::new(x, 0.)).collect();

    Ok(EigenPairs { values, vectors })
}

/// The `num` eigenpairs of `R x = ω P x` that come first according to `which`. `P` must be
/// symmetric positive definite.
pub fn solve_general(
    r: &Tridiagonal,
    p: &Tridiagonal,
    num: usize,
    which: Which,
    backend: Backend,
) -> Result<EigenPairs, ModeError> {
    let n = r.dim();
    check_num(num, n)?;
    assert_eq!(p.dim(), n);

    debug!(n, num, %which, ?backend, "Solving general eigenvalue problem");

    let (values, vectors) = match backend {
        Backend::Native => {
            let cholesky = p.to_dense().cholesky().ok_or_else(|| {
                ModeError::Convergence("right hand side is not positive definite".to_string())
            })?;
            let reduced = cholesky.solve(&r.to_dense()).map(|x| Complex64::new(x, 0.));

            let (q, t) = Schur::try_new(reduced, f64::EPSILON, MAX_ITERATIONS)
                .ok_or_else(|| {
                    ModeError::Convergence("Schur decomposition did not converge".to_string())
                })?
                .unpack();

            let (values, y) = triangular_eigenvectors(&t).ok_or_else(|| {
                ModeError::Convergence("Schur factor is not triangular".to_string())
            })?;

            (values, q * y)
        }
        #[cfg(feature = "lapack")]
        Backend::Lapack => crate::linalg::lapack::generalized(r.to_dense(), p.to_dense())?,
    };

    trace!(?values, "General eigenvalues");

    let key = which.key();
    let mut order: Vec<usize> = (0..values.len())
        .filter(|&i| values[i].re.is_finite() && values[i].im.is_finite())
        .collect();

    if order.len() < num {
        return Err(ModeError::Convergence(format!(
            "only {} finite eigenvalues, {num} requested",
            order.len()
        )));
    }

    order.sort_by(|&a, &b| key(&values[b]).total_cmp(&key(&values[a])));
    order.truncate(num);

    Ok(EigenPairs {
        values: order.iter().map(|&i| values[i]).collect(),
        vectors: DMatrix::from_fn(n, num, |row, col| vectors[(row, order[col])]),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    use super::{solve_general, solve_symmetric, Backend, Which};
    use crate::error::ModeError;
    use crate::linalg::Tridiagonal;

    #[test]
    fn test_parse_which() {
        assert_eq!("LI".parse::<Which>().unwrap(), Which::LargestImaginary);
        assert_eq!("sm".parse::<Which>().unwrap(), Which::SmallestMagnitude);
        assert_eq!(Which::LargestReal.to_string(), "LR");
        assert!("XX".parse::<Which>().is_err());
        assert_eq!(Which::default(), Which::LargestImaginary);
    }

    #[test]
    fn test_keys() {
        let a = Complex64::new(1., -3.);
        let b = Complex64::new(-2., 1.);

        assert!(Which::LargestMagnitude.key()(&a) > Which::LargestMagnitude.key()(&b));
        assert!(Which::LargestReal.key()(&a) > Which::LargestReal.key()(&b));
        assert!(Which::LargestImaginary.key()(&b) > Which::LargestImaginary.key()(&a));
        assert!(Which::SmallestImaginary.key()(&a) > Which::SmallestImaginary.key()(&b));
    }

    #[test]
    fn test_symmetric() {
        // S = [[1, -1], [-1, 1]], M = diag(1, 2): λ = 0 and 3/2
        let stiffness = Tridiagonal {
            lower: [-1.].into(),
            diag: [1., 1.].into(),
            upper: [-1.].into(),
        };
        let mass = [1., 2.];

        let pairs = solve_symmetric(&stiffness, &mass, 2, Backend::Native).unwrap();

        assert_relative_eq!(pairs.values[0].re, 0., epsilon = 1e-12);
        assert_relative_eq!(pairs.values[1].re, 1.5, epsilon = 1e-12);

        let v = pairs.vectors.column(0);
        assert_relative_eq!(v[0].re, v[1].re, epsilon = 1e-12);

        let v = pairs.vectors.column(1);
        let residual = stiffness.mul_vec(&[v[0].re, v[1].re]);
        assert_relative_eq!(residual[0], 1.5 * mass[0] * v[0].re, epsilon = 1e-12);
        assert_relative_eq!(residual[1], 1.5 * mass[1] * v[1].re, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_num() {
        let stiffness = Tridiagonal::from_diagonal(&[1., 2.]);

        assert!(matches!(
            solve_symmetric(&stiffness, &[1., 1.], 0, Backend::Native),
            Err(ModeError::InvalidInput(_))
        ));
        assert!(matches!(
            solve_symmetric(&stiffness, &[1., 1.], 3, Backend::Native),
            Err(ModeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_general_selects_by_which() {
        let r = Tridiagonal::from_diagonal(&[2., -1., 3.]);
        let p = Tridiagonal::from_diagonal(&[1., 1., 1.]);

        let pairs = solve_general(&r, &p, 2, Which::LargestReal, Backend::Native).unwrap();
        assert_relative_eq!(pairs.values[0].re, 3., epsilon = 1e-12);
        assert_relative_eq!(pairs.values[1].re, 2., epsilon = 1e-12);

        let pairs = solve_general(&r, &p, 1, Which::SmallestReal, Backend::Native).unwrap();
        assert_relative_eq!(pairs.values[0].re, -1., epsilon = 1e-12);
    }

    #[test]
    fn test_general_complex_pair() {
        // Rotation generator: ω = ±i
        let r = Tridiagonal {
            lower: [1.].into(),
            diag: [0., 0.].into(),
            upper: [-1.].into(),
        };
        let p = Tridiagonal::from_diagonal(&[1., 1.]);

        let pairs = solve_general(&r, &p, 1, Which::LargestImaginary, Backend::Native).unwrap();
        let omega = pairs.values[0];

        assert_relative_eq!(omega.im, 1., epsilon = 1e-12);
        assert_relative_eq!(omega.re, 0., epsilon = 1e-12);

        let v = pairs.vectors.column(0);
        let residual = (r.to_dense().map(|x| Complex64::new(x, 0.)) * v) - v * omega;
        assert!(residual.norm() < 1e-12 * v.norm());
    }

    #[test]
    fn test_general_rejects_indefinite() {
        let r = Tridiagonal::from_diagonal(&[1., 1.]);
        let p = Tridiagonal::from_diagonal(&[1., -1.]);

        assert!(matches!(
            solve_general(&r, &p, 1, Which::LargestReal, Backend::Native),
            Err(ModeError::Convergence(_))
        ));
    }
}
