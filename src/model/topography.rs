use tracing::debug;

use super::{Samples, VerticalProfile};
use crate::error::{invalid, ModeError};

/// Smallest number of retained N² samples the drivers accept
pub const MIN_POINTS: usize = 2;

/// Check that `z` is strictly monotonic, in either direction.
///
/// Returns `true` if `z` increases. A single sample counts as increasing.
pub fn check_coordinate(z: &[f64]) -> Result<bool, ModeError> {
    if let Some(index) = z.iter().position(|x| !x.is_finite()) {
        return Err(invalid(format!("vertical coordinate is not finite at index {index}")));
    }

    if z.len() < 2 {
        return Ok(true);
    }

    let increasing = z[1] > z[0];

    for i in 1..z.len() {
        let step = z[i] - z[i - 1];

        if step == 0. || (step > 0.) != increasing {
            return Err(ModeError::NonMonotonic { index: i });
        }
    }

    Ok(increasing)
}

/// Drop the samples below the topography, i.e. the run of missing samples at the bottom (last
/// index) of the profile.
///
/// Missing samples anywhere else are an error, as is a profile without valid samples. The
/// returned profile is a fresh copy; a profile without missing samples is returned unchanged.
pub fn maybe_truncate_above_topography<S: Samples + ?Sized>(
    z: &[f64],
    field: &S,
) -> Result<VerticalProfile, ModeError> {
    if z.len() != field.len() {
        return Err(invalid(format!(
            "unequal lengths: {} coordinates for {} samples",
            z.len(),
            field.len()
        )));
    }

    check_coordinate(z)?;

    let n = z.len();
    let retained = (0..n)
        .rev()
        .find(|&i| !field.is_invalid(i))
        .map(|i| i + 1)
        .ok_or_else(|| invalid("profile has no valid samples"))?;

    if let Some(index) = (0..retained).find(|&i| field.is_invalid(i)) {
        return Err(ModeError::Topography { index });
    }

    if retained < n {
        debug!("Dropping {} samples below the topography", n - retained);
    }

    Ok(VerticalProfile {
        z: z[..retained].into(),
        field: (0..retained).map(|i| field.value(i)).collect(),
    })
}

/// Bottom depth of the model for the retained centres `z`.
///
/// An explicit depth must lie strictly below the deepest centre. Without one, the bottom sits half
/// a spacing below the deepest centre.
pub fn check_depth(z: &[f64], depth: Option<f64>) -> Result<f64, ModeError> {
    let n = z.len();

    if n < MIN_POINTS {
        return Err(invalid(format!(
            "need at least {MIN_POINTS} valid samples, got {n}"
        )));
    }

    let deepest = z[n - 1];

    match depth {
        Some(depth) if depth.is_finite() && depth > deepest => Ok(depth),
        Some(depth) => Err(invalid(format!(
            "depth {depth} does not lie below the deepest sample at {deepest}"
        ))),
        None => Ok(deepest + (deepest - z[n - 2]) / 2.),
    }
}
