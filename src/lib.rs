//! Vertical normal modes and linear baroclinic instability of stratified ocean profiles.
//!
//! Given a profile of the squared buoyancy frequency N², this crate computes
//!
//! - the neutral quasi-geostrophic baroclinic modes and their deformation radii
//!   ([baroclinic::neutral_modes_from_n2_profile]), and
//! - the complex growth rates and vertical structure of linearly unstable modes for a given mean
//!   flow, planetary vorticity gradient and boundary slopes, on a grid of horizontal wavenumbers
//!   ([baroclinic::instability_analysis_from_n2_profile]).
//!
//! The vertical coordinate is depth, positive downward and increasing with the array index. N²
//! is given at cell centres and the modes are returned at the cell faces, which include the
//! surface `z = 0` and the bottom.
#![allow(clippy::needless_range_loop)] // Makes math code less readable
#![warn(missing_docs)]

pub mod baroclinic;
pub mod error;
pub mod linalg;
pub mod model;
pub mod postprocessing;
pub mod solver;
pub mod system;

pub use baroclinic::{
    instability_analysis_from_n2_profile, maybe_truncate_above_topography,
    neutral_modes_from_n2_profile, InstabilityModes, InstabilityOptions, NeutralModes,
    NeutralOptions,
};
pub use error::ModeError;
pub use model::{MaskedArray, OceanProfile, ProfileSource, Samples, VerticalProfile};
pub use solver::{Backend, Which};
