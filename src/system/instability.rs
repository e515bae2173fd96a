use super::neutral::NeutralSystem;
use super::StaggeredGrid;
use crate::error::{invalid, ModeError};
use crate::linalg::Tridiagonal;

/// Linearised quasi-geostrophic potential vorticity equation about a mean flow `(ubar, vbar)`.
///
/// For a wave `exp(i(kx + ly - ωt))` the vertical structure satisfies `A φ = ω B φ` with
/// `B = L - K²` and `A = diag(k ubar + l vbar) B + diag(k Q_y - l Q_x)`, where `Q_y = beta - L
/// ubar` and `Q_x = L vbar` are the mean potential vorticity gradients including the sloping
/// boundary terms.
#[derive(Debug, Clone)]
pub struct InstabilitySystem {
    /// Stretching operator of the background stratification
    pub neutral: NeutralSystem,
    /// Zonal mean flow on the faces
    pub ubar: Box<[f64]>,
    /// Meridional mean flow on the faces
    pub vbar: Box<[f64]>,
    /// Meridional mean potential vorticity gradient on the faces
    pub qy: Box<[f64]>,
    /// Zonal mean potential vorticity gradient on the faces
    pub qx: Box<[f64]>,
    /// Laplacian horizontal viscosity
    pub horizontal_viscosity: f64,
}

/// Real generalised problem `R φ = ω P φ` at a single wavenumber, with `P = -M B` symmetric
/// positive definite and `R = -M A`
#[derive(Debug, Clone)]
pub struct Pencil {
    /// Left hand side, not symmetric
    pub r: Tridiagonal,
    /// Right hand side
    pub p: Tridiagonal,
    /// Squared horizontal wavenumber
    pub k2: f64,
}

impl InstabilitySystem {
    /// Assemble the mean potential vorticity gradients.
    ///
    /// `ubar` and `vbar` are given on the faces of the grid. `etax` and `etay` are the slopes of
    /// the surface and the bottom, in that order.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        neutral: NeutralSystem,
        f0: f64,
        beta: f64,
        ubar: &[f64],
        vbar: &[f64],
        etax: [f64; 2],
        etay: [f64; 2],
        horizontal_viscosity: f64,
    ) -> Result<Self, ModeError> {
        let m = neutral.grid.len();

        for (name, profile) in [("ubar", ubar), ("vbar", vbar)] {
            if profile.len() != m {
                return Err(invalid(format!(
                    "unequal lengths: {m} faces for {} {name} samples",
                    profile.len()
                )));
            }

            if let Some(i) = profile.iter().position(|u| !u.is_finite()) {
                return Err(invalid(format!("{name} is not finite at face {i}")));
            }
        }

        let scalars = [f0, beta, etax[0], etax[1], etay[0], etay[1]];

        if scalars.iter().any(|x| !x.is_finite()) {
            return Err(invalid("f0, beta and the boundary slopes must be finite"));
        }

        if !horizontal_viscosity.is_finite() || horizontal_viscosity < 0. {
            return Err(invalid(format!(
                "horizontal viscosity must be finite and non-negative, got {horizontal_viscosity}"
            )));
        }

        let mut qy: Box<[f64]> = neutral.stretch(ubar).iter().map(|lu| beta - lu).collect();
        let mut qx: Box<[f64]> = neutral.stretch(vbar).into();

        let (top, bottom) = (neutral.mass[0], neutral.mass[m - 1]);

        qy[0] -= f0 * etay[0] / top;
        qy[m - 1] += f0 * etay[1] / bottom;
        qx[0] -= f0 * etax[0] / top;
        qx[m - 1] += f0 * etax[1] / bottom;

        Ok(InstabilitySystem {
            neutral,
            ubar: ubar.into(),
            vbar: vbar.into(),
            qy,
            qx,
            horizontal_viscosity,
        })
    }

    /// Grid the modes live on
    pub fn grid(&self) -> &StaggeredGrid {
        &self.neutral.grid
    }

    /// Pencil at wavenumber `(k, l)`. `None` if `k = l = 0`, where `B` is singular.
    pub fn pencil(&self, k: f64, l: f64) -> Option<Pencil> {
        let k2 = k * k + l * l;

        if k2 == 0. {
            return None;
        }

        let mut p = self.neutral.stiffness.clone();
        let shift: Vec<f64> = self.neutral.mass.iter().map(|w| k2 * w).collect();
        p.add_diagonal(&shift);

        let advection: Vec<f64> = self
            .ubar
            .iter()
            .zip(self.vbar.iter())
            .map(|(u, v)| k * u + l * v)
            .collect();

        let gradient: Vec<f64> = (0..self.grid().len())
            .map(|j| -self.neutral.mass[j] * (k * self.qy[j] - l * self.qx[j]))
            .collect();

        let mut r = p.clone();
        r.scale_rows(&advection);
        r.add_diagonal(&gradient);

        Some(Pencil { r, p, k2 })
    }

    /// Imaginary shift `Ah K²` of every eigenvalue due to horizontal viscosity
    pub fn damping(&self, k2: f64) -> f64 {
        self.horizontal_viscosity * k2
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    use super::InstabilitySystem;
    use crate::system::neutral::NeutralSystem;
    use crate::system::StaggeredGrid;

    fn eady(nz: usize) -> InstabilitySystem {
        let centers: Vec<f64> = (0..nz).map(|i| (i as f64 + 0.5) / nz as f64).collect();
        let grid = StaggeredGrid::new(&centers, 1.).unwrap();
        let ubar = grid.faces.clone();
        let vbar = vec![0.; grid.len()];
        let neutral = NeutralSystem::build(grid, &vec![1.; nz], 1.).unwrap();

        InstabilitySystem::build(neutral, 1., 0., &ubar, &vbar, [0.; 2], [0.; 2], 0.).unwrap()
    }

    #[test]
    fn test_eady_gradient_lives_on_boundaries() {
        let system = eady(10);
        let m = system.grid().len();

        assert_relative_eq!(system.qy[0], -20., max_relative = 1e-12);
        assert_relative_eq!(system.qy[m - 1], 20., max_relative = 1e-12);

        for j in 1..m - 1 {
            assert_relative_eq!(system.qy[j], 0., epsilon = 1e-10);
        }

        assert!(system.qx.iter().all(|q| *q == 0.));
    }

    #[test]
    fn test_pencil_matches_dense_operators() {
        let centers = [0.5, 1.5, 2., 4., 7.];
        let grid = StaggeredGrid::new(&centers, 8.).unwrap();
        let ubar: Vec<f64> = grid.faces.iter().map(|z| 0.1 * z.cos()).collect();
        let vbar: Vec<f64> = grid.faces.iter().map(|z| 0.02 * z).collect();
        let neutral = NeutralSystem::build(grid, &[2., 1.5, 1., 0.5, 0.25], 0.3).unwrap();
        let system = InstabilitySystem::build(
            neutral,
            0.3,
            1e-2,
            &ubar,
            &vbar,
            [1e-3, -2e-3],
            [5e-4, 1e-3],
            0.,
        )
        .unwrap();

        let (k, l) = (0.7, -0.4);
        let pencil = system.pencil(k, l).unwrap();
        let m = system.grid().len();

        let stretching = system.neutral.stretching().to_dense();
        let b = &stretching - DMatrix::identity(m, m) * (k * k + l * l);
        let advection = DMatrix::from_fn(m, m, |r, c| {
            if r == c {
                k * ubar[r] + l * vbar[r]
            } else {
                0.
            }
        });
        let gradient = DMatrix::from_fn(m, m, |r, c| {
            if r == c {
                k * system.qy[r] - l * system.qx[r]
            } else {
                0.
            }
        });
        let a = &advection * &b + gradient;
        let mass = DMatrix::from_fn(m, m, |r, c| if r == c { system.neutral.mass[r] } else { 0. });

        let expected_r = -&mass * &a;
        let expected_p = -&mass * &b;

        assert!(pencil.p.is_symmetric());
        assert_relative_eq!(pencil.r.to_dense(), expected_r, epsilon = 1e-12, max_relative = 1e-10);
        assert_relative_eq!(pencil.p.to_dense(), expected_p, epsilon = 1e-12, max_relative = 1e-10);
    }

    #[test]
    fn test_no_pencil_at_zero_wavenumber() {
        assert!(eady(4).pencil(0., 0.).is_none());
        assert!(eady(4).pencil(0., 1.).is_some());
    }

    #[test]
    fn test_rejects_bad_mean_flow() {
        let grid = StaggeredGrid::new(&[0.5, 1.5], 2.).unwrap();
        let neutral = NeutralSystem::build(grid, &[1., 1.], 1.).unwrap();

        let short = InstabilitySystem::build(
            neutral.clone(),
            1.,
            0.,
            &[0., 1.],
            &[0., 0., 0.],
            [0.; 2],
            [0.; 2],
            0.,
        );
        let viscous = InstabilitySystem::build(
            neutral,
            1.,
            0.,
            &[0., 1., 2.],
            &[0., 0., 0.],
            [0.; 2],
            [0.; 2],
            -1.,
        );

        assert!(short.is_err());
        assert!(viscous.is_err());
    }
}
