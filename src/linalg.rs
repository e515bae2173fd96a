//! Banded storage for the finite-volume operators and the small dense kernels built on top

use nalgebra::DMatrix;

/// Square tridiagonal matrix in banded storage
#[derive(Debug, Clone, PartialEq)]
pub struct Tridiagonal {
    /// Sub-diagonal, `lower[i]` is the entry at `(i + 1, i)`
    pub lower: Box<[f64]>,
    /// Main diagonal
    pub diag: Box<[f64]>,
    /// Super-diagonal, `upper[i]` is the entry at `(i, i + 1)`
    pub upper: Box<[f64]>,
}

impl Tridiagonal {
    /// Zero matrix of dimension `n`
    pub fn zeros(n: usize) -> Self {
        Tridiagonal {
            lower: vec![0.; n.saturating_sub(1)].into(),
            diag: vec![0.; n].into(),
            upper: vec![0.; n.saturating_sub(1)].into(),
        }
    }

    /// Diagonal matrix with the given entries
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let mut matrix = Self::zeros(diag.len());
        matrix.diag.copy_from_slice(diag);
        matrix
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.diag.len()
    }

    /// Matrix-vector product
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let n = self.dim();
        assert_eq!(x.len(), n);

        let mut y = vec![0.; n];

        for i in 0..n {
            y[i] = self.diag[i] * x[i];

            if i > 0 {
                y[i] += self.lower[i - 1] * x[i - 1];
            }

            if i + 1 < n {
                y[i] += self.upper[i] * x[i + 1];
            }
        }

        y
    }

    /// Multiply from the left with `diag(scale)`
    pub fn scale_rows(&mut self, scale: &[f64]) {
        let n = self.dim();
        assert_eq!(scale.len(), n);

        for i in 0..n {
            self.diag[i] *= scale[i];

            if i > 0 {
                self.lower[i - 1] *= scale[i];
            }

            if i + 1 < n {
                self.upper[i] *= scale[i];
            }
        }
    }

    /// Add `diag(values)`
    pub fn add_diagonal(&mut self, values: &[f64]) {
        assert_eq!(values.len(), self.dim());

        for (d, v) in self.diag.iter_mut().zip(values) {
            *d += v;
        }
    }

    /// `diag(d) T diag(d)`, which keeps a symmetric matrix symmetric
    pub fn congruence(&self, d: &[f64]) -> Self {
        let n = self.dim();
        assert_eq!(d.len(), n);

        let mut matrix = self.clone();

        for i in 0..n {
            matrix.diag[i] *= d[i] * d[i];
        }

        for i in 0..n.saturating_sub(1) {
            matrix.lower[i] *= d[i + 1] * d[i];
            matrix.upper[i] *= d[i] * d[i + 1];
        }

        matrix
    }

    /// Exact symmetry of the off-diagonal bands
    pub fn is_symmetric(&self) -> bool {
        self.lower == self.upper
    }

    /// Column-major dense copy
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.dim();

        DMatrix::from_fn(n, n, |r, c| {
            if r == c {
                self.diag[r]
            } else if r == c + 1 {
                self.lower[c]
            } else if c == r + 1 {
                self.upper[r]
            } else {
                0.
            }
        })
    }
}

/// Eigenvectors of an upper-triangular matrix by back-substitution
pub(crate) mod schur;

#[cfg(feature = "lapack")]
pub(crate) mod lapack;

#[cfg(test)]
mod tests {
    use super::Tridiagonal;

    fn example() -> Tridiagonal {
        Tridiagonal {
            lower: [1., 2.].into(),
            diag: [4., 5., 6.].into(),
            upper: [-1., -2.].into(),
        }
    }

    #[test]
    fn test_mul_vec_matches_dense() {
        let matrix = example();
        let x = [1., -2., 3.];
        let dense = matrix.to_dense() * nalgebra::DVector::from_column_slice(&x);

        for (banded, dense) in matrix.mul_vec(&x).iter().zip(dense.iter()) {
            assert_eq!(banded, dense);
        }
    }

    #[test]
    fn test_scale_rows() {
        let mut matrix = example();
        matrix.scale_rows(&[1., 2., 3.]);

        assert_eq!(&*matrix.diag, &[4., 10., 18.]);
        assert_eq!(&*matrix.lower, &[2., 6.]);
        assert_eq!(&*matrix.upper, &[-1., -4.]);
        assert!(!matrix.is_symmetric());
    }

    #[test]
    fn test_congruence() {
        let mut matrix = example();
        matrix.upper = matrix.lower.clone();

        let d = [1., 0.5, 2.];
        let result = matrix.congruence(&d);

        assert!(result.is_symmetric());
        assert_eq!(&*result.diag, &[4., 1.25, 24.]);
        assert_eq!(&*result.lower, &[0.5, 2.]);
    }

    #[test]
    fn test_single_point() {
        let matrix = Tridiagonal::from_diagonal(&[3.]);

        assert_eq!(matrix.dim(), 1);
        assert!(matrix.lower.is_empty());
        assert_eq!(matrix.mul_vec(&[2.]), vec![6.]);
    }
}
