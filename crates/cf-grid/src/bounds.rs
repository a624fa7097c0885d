//! Cell edge resolution for axis variables.

use netcdf_parser::NetCdfReader;
use tracing::{debug, warn};

use crate::cleanse::read_numeric;
use crate::error::Result;
use crate::types::{Axis, AxisBounds, BoundsMode};

/// Synthesize `[lower, upper]` pairs from cell centres.
///
/// Each value is widened by half the distance to its predecessor (to its
/// successor for the first value). Assumes the values are ordered. A single
/// value yields a degenerate cell.
pub fn interpolate(values: &[f64]) -> Vec<f64> {
    let mut bounds = Vec::with_capacity(values.len() * 2);
    for (i, &v) in values.iter().enumerate() {
        let delta = match i {
            0 if values.len() > 1 => values[1] - values[0],
            0 => 0.0,
            _ => v - values[i - 1],
        };
        let half = delta / 2.0;
        bounds.push(v - half);
        bounds.push(v + half);
    }
    bounds
}

/// Resolve the bounds of the axis variable `variable`.
///
/// A `bounds` attribute naming a numeric variable with exactly two values
/// per axis value gives definitive bounds. Anything else falls back to
/// interpolation.
pub fn resolve_bounds(reader: &NetCdfReader, axis: Axis, variable: &str) -> Result<AxisBounds> {
    let values = read_numeric(reader, variable)?;
    let info = reader.variable(variable)?;

    if let Some(reference) = info
        .attribute_ignore_case("bounds")
        .and_then(|a| a.value.as_text())
    {
        match read_numeric(reader, reference) {
            Ok(bounds) if bounds.len() == values.len() * 2 => {
                debug!(axis = %axis, variable, bounds = reference, "Using definitive bounds");
                return Ok(AxisBounds {
                    axis,
                    variable: variable.to_string(),
                    mode: BoundsMode::Definitive,
                    bounds,
                });
            }
            Ok(bounds) => warn!(
                axis = %axis,
                variable,
                bounds = reference,
                expected = values.len() * 2,
                found = bounds.len(),
                "Bounds variable has the wrong length, interpolating"
            ),
            Err(e) => warn!(
                axis = %axis,
                variable,
                bounds = reference,
                error = %e,
                "Bounds variable unreadable, interpolating"
            ),
        }
    }

    Ok(AxisBounds {
        axis,
        variable: variable.to_string(),
        mode: BoundsMode::Interpolated,
        bounds: interpolate(&values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_regular_axis() {
        assert_eq!(
            interpolate(&[10.0, 20.0, 30.0]),
            vec![5.0, 15.0, 15.0, 25.0, 25.0, 35.0]
        );
    }

    #[test]
    fn test_interpolate_descending_axis() {
        assert_eq!(interpolate(&[50.0, 40.0]), vec![55.0, 45.0, 45.0, 35.0]);
    }

    #[test]
    fn test_interpolate_irregular_uses_predecessor() {
        assert_eq!(
            interpolate(&[0.0, 2.0, 6.0]),
            vec![-1.0, 1.0, 1.0, 3.0, 4.0, 8.0]
        );
    }

    #[test]
    fn test_interpolate_degenerate() {
        assert_eq!(interpolate(&[7.0]), vec![7.0, 7.0]);
        assert!(interpolate(&[]).is_empty());
    }
}
