//! Error taxonomy shared by every stage of the mode computation

use thiserror::Error;

/// Errors that can be returned while computing vertical modes.
///
/// Every error is fatal to the call that produced it; no partial results are returned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ModeError {
    /// Input arrays are inconsistent, e.g. unequal lengths, a `depth` that is incompatible with
    /// the valid data range, non-physical stratification or an unsatisfiable number of modes.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Missing data does not form a single contiguous run at the bottom of the profile.
    ///
    /// The parameter is the index of the first invalid sample that lies outside of the bottom
    /// run.
    #[error("Invalid topography mask: sample {index} is missing but lies above valid data")]
    Topography {
        /// Offending sample
        index: usize,
    },
    /// The vertical coordinate is not strictly monotonic.
    ///
    /// The parameter is the index at which the direction of the coordinate first breaks.
    #[error("Vertical coordinate is not strictly monotonic at index {index}")]
    NonMonotonic {
        /// Offending coordinate
        index: usize,
    },
    /// The eigensolver did not deliver the requested eigenpairs.
    #[error("Eigensolver failed: {0}")]
    Convergence(String),
    /// Failed to read a profile from an HDF5 file.
    ///
    /// The first parameter is the dataset or attribute that failed to be read, the second
    /// parameter is the error the hdf5 crate returned.
    #[cfg(feature = "hdf5")]
    #[error("Could not read `{0}` from profile file")]
    Hdf5(String, #[source] hdf5::Error),
}

pub(crate) fn invalid(message: impl Into<String>) -> ModeError {
    ModeError::InvalidInput(message.into())
}
