use std::path::PathBuf;

use hdf5::{File, H5Type};

use super::{OceanProfile, ProfileSource};
use crate::error::ModeError;

/// Profile stored in an HDF5 file.
///
/// The file holds the datasets `z_N2`, `N2`, `z_u`, `u_at_Tpoints`, `v_at_Tpoints` and optionally
/// `Rossby_radii`, and the scalar attributes `f0` and `beta`. Missing N² samples below the
/// topography are stored as NaN.
#[derive(Debug, Clone)]
pub struct Hdf5Profile {
    path: PathBuf,
    negate_depth: bool,
}

impl Hdf5Profile {
    /// Profile stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Hdf5Profile {
            path: path.into(),
            negate_depth: false,
        }
    }

    /// The file stores heights (negative below the surface) instead of depths
    pub fn with_heights(mut self) -> Self {
        self.negate_depth = true;
        self
    }

    fn read_coordinate(&self, file: &File, name: &str) -> Result<Box<[f64]>, ModeError> {
        let z = read_dataset(file, name)?;

        Ok(if self.negate_depth {
            z.iter().map(|z| -z).collect()
        } else {
            z
        })
    }
}

fn read_attr<T: H5Type>(file: &File, attr: &str) -> Result<T, ModeError> {
    file.attr(attr)
        .and_then(|res| res.read_scalar())
        .map_err(|err| ModeError::Hdf5(attr.to_owned(), err))
}

fn read_dataset(file: &File, name: &str) -> Result<Box<[f64]>, ModeError> {
    file.dataset(name)
        .and_then(|res| res.read_raw::<f64>())
        .map(Vec::into_boxed_slice)
        .map_err(|err| ModeError::Hdf5(name.to_owned(), err))
}

impl ProfileSource for Hdf5Profile {
    type Error = ModeError;

    fn load(&self) -> Result<OceanProfile, ModeError> {
        let file = &File::open(&self.path)
            .map_err(|err| ModeError::Hdf5(self.path.display().to_string(), err))?;

        let rossby_radii = if file.link_exists("Rossby_radii") {
            Some(read_dataset(file, "Rossby_radii")?)
        } else {
            None
        };

        Ok(OceanProfile {
            z_n2: self.read_coordinate(file, "z_N2")?,
            n2: read_dataset(file, "N2")?,
            z_u: self.read_coordinate(file, "z_u")?,
            ubar: read_dataset(file, "u_at_Tpoints")?,
            vbar: read_dataset(file, "v_at_Tpoints")?,
            f0: read_attr(file, "f0")?,
            beta: read_attr(file, "beta")?,
            rossby_radii,
        })
    }
}
