//! Ocean profiles and the sampled-field abstraction used to locate missing data

use crate::error::{invalid, ModeError};

/// A sampled field with a single notion of a missing sample.
///
/// Plain slices mark missing samples with NaN, [MaskedArray] carries an explicit mask.
pub trait Samples {
    /// Number of samples, valid or not
    fn len(&self) -> usize;
    /// Sample value. Only meaningful if the sample is not invalid
    fn value(&self, idx: usize) -> f64;
    /// Whether the sample is missing
    fn is_invalid(&self, idx: usize) -> bool;

    /// Whether there are no samples
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Samples for [f64] {
    fn len(&self) -> usize {
        <[f64]>::len(self)
    }

    fn value(&self, idx: usize) -> f64 {
        self[idx]
    }

    fn is_invalid(&self, idx: usize) -> bool {
        self[idx].is_nan()
    }
}

impl Samples for Vec<f64> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn value(&self, idx: usize) -> f64 {
        self[idx]
    }

    fn is_invalid(&self, idx: usize) -> bool {
        self[idx].is_nan()
    }
}

impl Samples for Box<[f64]> {
    fn len(&self) -> usize {
        <[f64]>::len(self)
    }

    fn value(&self, idx: usize) -> f64 {
        self[idx]
    }

    fn is_invalid(&self, idx: usize) -> bool {
        self[idx].is_nan()
    }
}

/// Field with an explicit validity mask. `mask[i] == true` marks sample `i` as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    data: Box<[f64]>,
    mask: Box<[bool]>,
}

impl MaskedArray {
    /// Combine data and mask of equal length
    pub fn new(data: impl Into<Box<[f64]>>, mask: impl Into<Box<[bool]>>) -> Result<Self, ModeError> {
        let data = data.into();
        let mask = mask.into();

        if data.len() != mask.len() {
            return Err(invalid(format!(
                "mask has {} entries for {} samples",
                mask.len(),
                data.len()
            )));
        }

        Ok(MaskedArray { data, mask })
    }

    /// Masked array without any masked sample
    pub fn unmasked(data: impl Into<Box<[f64]>>) -> Self {
        let data = data.into();
        let mask = vec![false; data.len()].into();

        MaskedArray { data, mask }
    }

    /// Mark sample `idx` as missing
    pub fn set_masked(&mut self, idx: usize) {
        self.mask[idx] = true;
    }

    /// Underlying data, including masked samples
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Validity mask
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }
}

impl Samples for MaskedArray {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn value(&self, idx: usize) -> f64 {
        self.data[idx]
    }

    // A NaN under an unset mask entry is still missing
    fn is_invalid(&self, idx: usize) -> bool {
        self.mask[idx] || self.data[idx].is_nan()
    }
}

/// Field sampled on a strictly monotonic vertical coordinate, ordered from the surface downward
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalProfile {
    /// Depth of the samples
    pub z: Box<[f64]>,
    /// Sampled values
    pub field: Box<[f64]>,
}

impl VerticalProfile {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.z.len()
    }

    /// Whether the profile holds no samples
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

/// Everything needed to run the neutral and instability analyses for one location
#[derive(Debug, Clone)]
pub struct OceanProfile {
    /// Depth of the N² samples \[m\]
    pub z_n2: Box<[f64]>,
    /// Squared buoyancy frequency, NaN below the topography \[s^-2\]
    pub n2: Box<[f64]>,
    /// Depth of the mean flow samples \[m\]
    pub z_u: Box<[f64]>,
    /// Zonal mean flow \[m/s\]
    pub ubar: Box<[f64]>,
    /// Meridional mean flow \[m/s\]
    pub vbar: Box<[f64]>,
    /// Coriolis parameter \[s^-1\]
    pub f0: f64,
    /// Meridional gradient of the Coriolis parameter \[m^-1 s^-1\]
    pub beta: f64,
    /// Reference deformation radii, barotropic first, if the source provides them \[m\]
    pub rossby_radii: Option<Box<[f64]>>,
}

/// Anything that can produce an [OceanProfile], e.g. a file loader
pub trait ProfileSource {
    /// Error produced by the loader
    type Error;

    /// Load the profile
    fn load(&self) -> Result<OceanProfile, Self::Error>;
}

impl ProfileSource for OceanProfile {
    type Error = ModeError;

    fn load(&self) -> Result<OceanProfile, Self::Error> {
        Ok(self.clone())
    }
}

/// Removing missing data below the sea floor
pub mod topography;

/// Linear interpolation of mean-flow profiles onto the model grid
pub mod interpolate;

/// Profiles stored in HDF5 files
#[cfg(feature = "hdf5")]
pub mod hdf5;

#[cfg(test)]
mod tests {
    use super::{MaskedArray, Samples};

    #[test]
    fn test_nan_is_invalid() {
        let data = vec![1., f64::NAN, 3.];

        assert!(!data.is_invalid(0));
        assert!(data.is_invalid(1));
        assert!(data.as_slice().is_invalid(1));
    }

    #[test]
    fn test_masked_array() {
        let mut masked = MaskedArray::new([1., 2., f64::NAN], [false, false, false]).unwrap();

        assert!(!masked.is_invalid(1));
        assert!(masked.is_invalid(2));

        masked.set_masked(1);

        assert!(masked.is_invalid(1));
        assert_eq!(masked.value(1), 2.);
    }

    #[test]
    fn test_masked_array_length_mismatch() {
        assert!(MaskedArray::new([1., 2.], [false]).is_err());
    }
}
