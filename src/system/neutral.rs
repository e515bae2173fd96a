use super::StaggeredGrid;
use crate::error::{invalid, ModeError};
use crate::linalg::Tridiagonal;

/// Generalised symmetric problem `S φ = λ M φ` of the neutral modes, with `λ = 1 / Rd²`.
///
/// `S` is the symmetric positive semi-definite stiffness matrix of `-d/dz(f0² / N² d/dz)` with
/// no-flux conditions at the surface and the bottom. Its null space is the constant vector, the
/// barotropic mode. `M` is the diagonal of face widths.
#[derive(Debug, Clone)]
pub struct NeutralSystem {
    /// Grid the operators are defined on
    pub grid: StaggeredGrid,
    /// `f0² / (N² h)` at every cell centre
    pub coupling: Box<[f64]>,
    /// Stiffness matrix `S`
    pub stiffness: Tridiagonal,
    /// Diagonal of the mass matrix `M`
    pub mass: Box<[f64]>,
}

impl NeutralSystem {
    /// Assemble the operators for N² given at the centres of `grid`. N² must be positive, which
    /// keeps `S` positive semi-definite.
    pub fn build(grid: StaggeredGrid, n2: &[f64], f0: f64) -> Result<Self, ModeError> {
        let nz = grid.nz();

        if n2.len() != nz {
            return Err(invalid(format!(
                "unequal lengths: {nz} cells for {} N² samples",
                n2.len()
            )));
        }

        if !f0.is_finite() || f0 == 0. {
            return Err(invalid(format!("Coriolis parameter must be finite and nonzero, got {f0}")));
        }

        if let Some(i) = n2.iter().position(|n2| !n2.is_finite() || *n2 <= 0.) {
            return Err(invalid(format!(
                "N² must be positive and finite, got {} at index {i}",
                n2[i]
            )));
        }

        let coupling: Box<[f64]> = n2
            .iter()
            .zip(grid.spacing.iter())
            .map(|(n2, h)| f0 * f0 / (n2 * h))
            .collect();

        let mut stiffness = Tridiagonal::zeros(nz + 1);

        for i in 0..nz {
            stiffness.diag[i] += coupling[i];
            stiffness.diag[i + 1] += coupling[i];
            stiffness.lower[i] = -coupling[i];
            stiffness.upper[i] = -coupling[i];
        }

        let mass = grid.widths.clone();

        Ok(NeutralSystem {
            grid,
            coupling,
            stiffness,
            mass,
        })
    }

    /// The stretching operator `L = -M⁻¹ S`
    pub fn stretching(&self) -> Tridiagonal {
        let mut operator = self.stiffness.clone();
        let scale: Vec<f64> = self.mass.iter().map(|w| -1. / w).collect();

        operator.scale_rows(&scale);
        operator
    }

    /// Apply the stretching operator, `(Lφ)_j = (q_j - q_{j-1}) / w_j` with the flux
    /// `q_i = f0² / N²_i (φ_{i+1} - φ_i) / h_i` vanishing at the surface and the bottom
    pub fn stretch(&self, phi: &[f64]) -> Vec<f64> {
        let nz = self.grid.nz();
        assert_eq!(phi.len(), nz + 1);

        let flux: Vec<f64> = (0..nz)
            .map(|i| self.coupling[i] * (phi[i + 1] - phi[i]))
            .collect();

        (0..=nz)
            .map(|j| {
                let above = if j > 0 { flux[j - 1] } else { 0. };
                let below = if j < nz { flux[j] } else { 0. };

                (below - above) / self.mass[j]
            })
            .collect()
    }
}
