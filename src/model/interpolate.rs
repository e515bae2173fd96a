use super::topography::check_coordinate;
use crate::error::{invalid, ModeError};

/// Piecewise linear interpolation of a field given on a strictly monotonic grid. Values outside
/// of the grid are held constant at the nearest end.
pub struct LinearInterpolator<'profile> {
    z: &'profile [f64],
    field: &'profile [f64],
    increasing: bool,
}

impl<'profile> LinearInterpolator<'profile> {
    /// Wrap a profile. Fails on unequal lengths, an empty profile or a non-monotonic grid
    pub fn new(z: &'profile [f64], field: &'profile [f64]) -> Result<Self, ModeError> {
        if z.len() != field.len() {
            return Err(invalid(format!(
                "unequal lengths: {} coordinates for {} samples",
                z.len(),
                field.len()
            )));
        }

        if z.is_empty() {
            return Err(invalid("cannot interpolate an empty profile"));
        }

        let increasing = check_coordinate(z)?;

        Ok(LinearInterpolator {
            z,
            field,
            increasing,
        })
    }

    // Index i such that pos lies between z[i] and z[i + 1]
    fn bracket(&self, pos: f64) -> usize {
        let below = if self.increasing {
            self.z.partition_point(|&z| z <= pos)
        } else {
            self.z.partition_point(|&z| z >= pos)
        };

        below.saturating_sub(1).min(self.z.len() - 2)
    }

    /// Evaluate at `pos`
    pub fn eval(&self, pos: f64) -> f64 {
        let n = self.z.len();

        if n == 1 {
            return self.field[0];
        }

        let (first, last) = (self.z[0], self.z[n - 1]);
        let before = if self.increasing { pos <= first } else { pos >= first };
        let after = if self.increasing { pos >= last } else { pos <= last };

        if before {
            return self.field[0];
        }

        if after {
            return self.field[n - 1];
        }

        let idx = self.bracket(pos);
        let t = (pos - self.z[idx]) / (self.z[idx + 1] - self.z[idx]);

        self.field[idx] + t * (self.field[idx + 1] - self.field[idx])
    }
}

/// Interpolate the profile `(z, field)` onto `grid`
pub fn interpolate_onto(z: &[f64], field: &[f64], grid: &[f64]) -> Result<Box<[f64]>, ModeError> {
    let interpolator = LinearInterpolator::new(z, field)?;

    Ok(grid.iter().map(|&pos| interpolator.eval(pos)).collect())
}
