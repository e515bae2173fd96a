//! Neutral modes and linear instability analysis of N² profiles
use ndarray::{Array1, Array2, Array3, Array4};
use num_complex::Complex64;
use num_traits::Zero;
use tracing::{debug, warn};

use crate::error::{invalid, ModeError};
use crate::model::interpolate::interpolate_onto;
use crate::model::topography::{check_coordinate, check_depth};
use crate::model::{OceanProfile, Samples};
use crate::postprocessing::{deformation_radius, process, ModeSet, Phase};
use crate::solver::{solve_general, solve_symmetric, Backend, Which};
use crate::system::instability::InstabilitySystem;
use crate::system::neutral::NeutralSystem;
use crate::system::{Problem, StaggeredGrid};

pub use crate::model::topography::maybe_truncate_above_topography;

/// Options of [neutral_modes_from_n2_profile]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutralOptions {
    /// Depth of the flat bottom. Defaults to half a grid spacing below the deepest valid sample
    pub depth: Option<f64>,
    /// Number of modes, including the barotropic mode
    pub num: usize,
    /// Eigensolver implementation
    pub backend: Backend,
}

impl Default for NeutralOptions {
    fn default() -> Self {
        NeutralOptions {
            depth: None,
            num: 6,
            backend: Backend::default(),
        }
    }
}

/// Options of [instability_analysis_from_n2_profile]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstabilityOptions {
    /// Depth of the flat bottom. Defaults to half a grid spacing below the deepest valid sample
    pub depth: Option<f64>,
    /// Which modes to keep at every wavenumber
    pub sort: Which,
    /// Number of modes per wavenumber
    pub num: usize,
    /// Laplacian horizontal viscosity
    pub horizontal_viscosity: f64,
    /// Eigensolver implementation
    pub backend: Backend,
}

impl Default for InstabilityOptions {
    fn default() -> Self {
        InstabilityOptions {
            depth: None,
            sort: Which::LargestImaginary,
            num: 4,
            horizontal_viscosity: 0.,
            backend: Backend::default(),
        }
    }
}

/// Neutral baroclinic modes, sorted by decreasing deformation radius
#[derive(Debug, Clone)]
pub struct NeutralModes {
    /// Depth of the cell faces the modes are given on
    pub z: Array1<f64>,
    /// Deformation radius of every mode, infinite for the barotropic mode
    pub deformation_radius: Array1<f64>,
    /// Modes with shape `(z.len(), num)`, normalised to `Σ φ² = 1` with a positive surface value
    pub modes: Array2<f64>,
}

/// Linearly unstable modes on a grid of horizontal wavenumbers
#[derive(Debug, Clone)]
pub struct InstabilityModes {
    /// Depth of the cell faces the modes are given on
    pub z: Array1<f64>,
    /// Complex frequency with shape `(num, k.len(), l.len())`. The imaginary part is the growth
    /// rate.
    pub growth_rate: Array3<Complex64>,
    /// Modes with shape `(z.len(), num, k.len(), l.len())`, normalised to `Σ |φ|² = 1`
    pub vertical_modes: Array4<Complex64>,
}

fn check_lengths(z: &[f64], field: usize, name: &str) -> Result<(), ModeError> {
    if z.len() != field {
        return Err(invalid(format!(
            "unequal lengths: {} coordinates for {field} {name} samples",
            z.len()
        )));
    }

    Ok(())
}

fn check_downward(z: &[f64], name: &str) -> Result<(), ModeError> {
    if !check_coordinate(z)? {
        return Err(invalid(format!(
            "{name} must be depth, increasing downward from the surface"
        )));
    }

    Ok(())
}

/// Truncate the profile, place the bottom and assemble the stretching operator
fn prepare<S: Samples + ?Sized>(
    z: &[f64],
    n2: &S,
    f0: f64,
    depth: Option<f64>,
) -> Result<NeutralSystem, ModeError> {
    let profile = maybe_truncate_above_topography(z, n2)?;
    let depth = check_depth(&profile.z, depth)?;
    let grid = StaggeredGrid::new(&profile.z, depth)?;

    debug!(nz = grid.nz(), depth, "Built staggered grid");

    NeutralSystem::build(grid, &profile.field, f0)
}

/// Drop the mean flow below the topography and interpolate the rest onto the faces of `grid`
fn onto_faces<U: Samples + ?Sized>(
    z: &[f64],
    field: &U,
    grid: &StaggeredGrid,
) -> Result<Box<[f64]>, ModeError> {
    let profile = maybe_truncate_above_topography(z, field)?;

    interpolate_onto(&profile.z, &profile.field, &grid.faces)
}

/// Solve one problem and turn the eigenpairs into sorted, normalised modes
fn solve(problem: Problem<'_>, num: usize, backend: Backend) -> Result<ModeSet, ModeError> {
    match problem {
        Problem::Neutral(system) => {
            let pairs = solve_symmetric(&system.stiffness, &system.mass, num, backend)?;

            Ok(process(pairs, |lambda| -lambda.re, Phase::Surface))
        }
        Problem::Instability {
            system,
            k,
            l,
            which,
        } => match system.pencil(k, l) {
            Some(pencil) => {
                debug!(k, l, "Solving instability problem");

                let mut pairs = solve_general(&pencil.r, &pencil.p, num, which, backend)?;
                let damping = system.damping(pencil.k2);

                for omega in pairs.values.iter_mut() {
                    omega.im -= damping;
                }

                Ok(process(pairs, which.key(), Phase::LargestMagnitude))
            }
            None => {
                warn!("Zero horizontal wavenumber, using neutral modes without growth");

                let neutral = solve(Problem::Neutral(&system.neutral), num, backend)?;

                Ok(ModeSet {
                    values: vec![Complex64::zero(); num],
                    vectors: neutral.vectors,
                })
            }
        },
    }
}

/// Neutral quasi-geostrophic baroclinic modes of the N² profile `n2` given at depths `z`.
///
/// Missing N² samples below the topography are dropped. The modes are returned on the cell faces
/// around `z`, which include the surface and the bottom.
///
/// N² must be positive on every retained sample. Observed profiles with weakly negative N² in the
/// mixed layer have to be clipped to a small positive floor before the call.
pub fn neutral_modes_from_n2_profile<S: Samples + ?Sized>(
    z: &[f64],
    n2: &S,
    f0: f64,
    options: &NeutralOptions,
) -> Result<NeutralModes, ModeError> {
    check_lengths(z, n2.len(), "N²")?;
    check_downward(z, "z")?;

    if options.num == 0 {
        return Err(invalid("need at least one mode"));
    }

    let system = prepare(z, n2, f0, options.depth)?;
    let m = system.grid.len();
    let modes = solve(Problem::Neutral(&system), options.num, options.backend)?;

    Ok(NeutralModes {
        z: Array1::from(system.grid.faces.to_vec()),
        deformation_radius: Array1::from(deformation_radius(&modes.values)),
        modes: Array2::from_shape_fn((m, modes.len()), |(r, c)| modes.vectors[(r, c)].re),
    })
}

/// Growth rates and vertical structure of the linearly unstable modes of the mean flow `(ubar,
/// vbar)` on every wavenumber pair of `k × l`.
///
/// N² is given at depths `z_n2`, the mean flow at depths `z_u`, and is interpolated linearly onto
/// the cell faces. Missing samples below the topography are dropped from N² and from both mean
/// flow components. `etax` and `etay` are the slopes of the surface and the bottom, in that order.
///
/// N² must be positive on every retained sample; profiles with a statically unstable layer are
/// rejected.
#[allow(clippy::too_many_arguments)]
pub fn instability_analysis_from_n2_profile<S, U>(
    z_n2: &[f64],
    n2: &S,
    f0: f64,
    beta: f64,
    k: &[f64],
    l: &[f64],
    z_u: &[f64],
    ubar: &U,
    vbar: &U,
    etax: [f64; 2],
    etay: [f64; 2],
    options: &InstabilityOptions,
) -> Result<InstabilityModes, ModeError>
where
    S: Samples + ?Sized,
    U: Samples + ?Sized,
{
    check_lengths(z_n2, n2.len(), "N²")?;
    check_lengths(z_u, ubar.len(), "ubar")?;
    check_lengths(z_u, vbar.len(), "vbar")?;
    check_downward(z_n2, "z_n2")?;
    check_coordinate(z_u)?;

    if let Some(x) = k.iter().chain(l).find(|x| !x.is_finite()) {
        return Err(invalid(format!("wavenumbers must be finite, got {x}")));
    }

    if options.num == 0 {
        return Err(invalid("need at least one mode"));
    }

    let neutral = prepare(z_n2, n2, f0, options.depth)?;
    let m = neutral.grid.len();

    if options.num > m {
        return Err(invalid(format!(
            "cannot compute {} modes on a grid of {m} points",
            options.num
        )));
    }

    let ubar = onto_faces(z_u, ubar, &neutral.grid)?;
    let vbar = onto_faces(z_u, vbar, &neutral.grid)?;
    let system = InstabilitySystem::build(
        neutral,
        f0,
        beta,
        &ubar,
        &vbar,
        etax,
        etay,
        options.horizontal_viscosity,
    )?;

    let num = options.num;
    let mut growth_rate = Array3::zeros((num, k.len(), l.len()));
    let mut vertical_modes = Array4::zeros((m, num, k.len(), l.len()));

    debug!(nk = k.len(), nl = l.len(), num, "Running instability analysis");

    for (i, &k) in k.iter().enumerate() {
        for (j, &l) in l.iter().enumerate() {
            let problem = Problem::Instability {
                system: &system,
                k,
                l,
                which: options.sort,
            };
            let modes = solve(problem, num, options.backend)?;

            for n in 0..num {
                growth_rate[[n, i, j]] = modes.values[n];

                for r in 0..m {
                    vertical_modes[[r, n, i, j]] = modes.vectors[(r, n)];
                }
            }
        }
    }

    Ok(InstabilityModes {
        z: Array1::from(system.grid().faces.to_vec()),
        growth_rate,
        vertical_modes,
    })
}

/// Wavenumbers `0, 1, ..., -1` of a discrete Fourier transform of `n` samples with spacing `d`,
/// reordered to increase monotonically
pub fn fft_wavenumbers(n: usize, d: f64) -> Vec<f64> {
    let lowest = (n / 2) as f64;

    (0..n).map(|i| (i as f64 - lowest) / (d * n as f64)).collect()
}

/// Growth rate of the Eady problem with shear `u_max / H` for `N = f0 = H = 1` at wavenumber `k`
pub fn eady_growth_rate(k: f64, u_max: f64) -> f64 {
    let half = 0.5 * k.abs();

    if half == 0. {
        return 0.;
    }

    let product = (half.tanh().recip() - half) * (half - half.tanh());

    if product < 0. {
        0.
    } else {
        u_max * product.sqrt()
    }
}

impl OceanProfile {
    /// Neutral modes of this profile
    pub fn neutral_modes(&self, options: &NeutralOptions) -> Result<NeutralModes, ModeError> {
        neutral_modes_from_n2_profile(&self.z_n2, &self.n2, self.f0, options)
    }

    /// Instability analysis of the mean flow of this profile
    pub fn instability_analysis(
        &self,
        k: &[f64],
        l: &[f64],
        etax: [f64; 2],
        etay: [f64; 2],
        options: &InstabilityOptions,
    ) -> Result<InstabilityModes, ModeError> {
        instability_analysis_from_n2_profile(
            &self.z_n2, &self.n2, self.f0, self.beta, k, l, &self.z_u, &self.ubar, &self.vbar,
            etax, etay, options,
        )
    }
}
