//! Finite-volume discretisation of the quasi-geostrophic stretching operator
use crate::error::{invalid, ModeError};
use crate::solver::Which;

/// Staggered vertical grid. N² lives on the `nz` cell centres, the modal amplitude on the `nz + 1`
/// cell faces, which include the surface and the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct StaggeredGrid {
    /// Depth of the cell centres, strictly increasing
    pub centers: Box<[f64]>,
    /// Depth of the cell faces, `[0, midpoints of the centres, depth]`
    pub faces: Box<[f64]>,
    /// Control volume width of each face
    pub widths: Box<[f64]>,
    /// Distance between consecutive faces, one per centre
    pub spacing: Box<[f64]>,
}

impl StaggeredGrid {
    /// Build the faces around `centers` for a bottom at `depth`.
    ///
    /// The centres must be strictly increasing and lie strictly between the surface and `depth`.
    pub fn new(centers: &[f64], depth: f64) -> Result<Self, ModeError> {
        let nz = centers.len();

        if nz == 0 {
            return Err(invalid("grid needs at least one cell"));
        }

        if centers[0] <= 0. {
            return Err(invalid(format!(
                "shallowest sample at {} does not lie below the surface",
                centers[0]
            )));
        }

        if let Some(i) = (1..nz).find(|&i| centers[i] <= centers[i - 1]) {
            return Err(ModeError::NonMonotonic { index: i });
        }

        if depth.is_nan() || depth <= centers[nz - 1] {
            return Err(invalid(format!(
                "depth {depth} does not lie below the deepest sample at {}",
                centers[nz - 1]
            )));
        }

        let mut faces = Vec::with_capacity(nz + 1);
        faces.push(0.);
        faces.extend(centers.windows(2).map(|c| 0.5 * (c[0] + c[1])));
        faces.push(depth);

        let mut widths = Vec::with_capacity(nz + 1);
        widths.push(centers[0]);
        widths.extend(centers.windows(2).map(|c| c[1] - c[0]));
        widths.push(depth - centers[nz - 1]);

        let spacing = faces.windows(2).map(|f| f[1] - f[0]).collect();

        Ok(StaggeredGrid {
            centers: centers.into(),
            faces: faces.into(),
            widths: widths.into(),
            spacing,
        })
    }

    /// Number of cells
    pub fn nz(&self) -> usize {
        self.centers.len()
    }

    /// Number of faces, the length of a mode
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Always false, a grid has at least two faces
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The kind of eigenvalue problem to solve, with the data it needs
#[derive(Debug, Clone, Copy)]
pub enum Problem<'a> {
    /// Neutral baroclinic modes, sorted by decreasing deformation radius
    Neutral(&'a neutral::NeutralSystem),
    /// Unstable modes at a single horizontal wavenumber
    Instability {
        /// Operators shared by all wavenumbers
        system: &'a instability::InstabilitySystem,
        /// Zonal wavenumber
        k: f64,
        /// Meridional wavenumber
        l: f64,
        /// Sort policy
        which: Which,
    },
}

impl Problem<'_> {
    /// Grid the modes live on
    pub fn grid(&self) -> &StaggeredGrid {
        match self {
            Problem::Neutral(system) => &system.grid,
            Problem::Instability { system, .. } => system.grid(),
        }
    }
}

/// Neutral modes: stiffness and mass matrices of the stretching operator
pub mod neutral;

/// Linear instability of a mean flow
pub mod instability;

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::StaggeredGrid;

    #[test]
    fn test_uniform_grid() {
        let centers = [0.25, 0.75];
        let grid = StaggeredGrid::new(&centers, 1.).unwrap();

        assert_eq!(&*grid.faces, &[0., 0.5, 1.]);
        assert_eq!(&*grid.widths, &[0.25, 0.5, 0.25]);
        assert_eq!(&*grid.spacing, &[0.5, 0.5]);
        assert_eq!(grid.len(), grid.nz() + 1);
    }

    #[test]
    fn test_irregular_grid_widths_sum_to_depth() {
        let centers = [1., 3., 7., 15.];
        let grid = StaggeredGrid::new(&centers, 20.).unwrap();

        assert_relative_eq!(grid.widths.iter().sum::<f64>(), 20.);
        assert_relative_eq!(grid.spacing.iter().sum::<f64>(), 20.);
        assert_eq!(&*grid.faces, &[0., 2., 5., 11., 20.]);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(StaggeredGrid::new(&[0., 1.], 2.).is_err());
        assert!(StaggeredGrid::new(&[1., 2.], 2.).is_err());
        assert!(StaggeredGrid::new(&[2., 1.], 3.).is_err());
        assert!(StaggeredGrid::new(&[], 3.).is_err());
    }
}
