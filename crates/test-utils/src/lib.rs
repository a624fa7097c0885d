//! Test support for the cf-grid workspace.
//!
//! - [`builder`]: writes synthetic NetCDF classic files
//! - [`fixtures`]: canned CF datasets with documented expected values
//! - [`generators`]: coordinate and field values
//! - [`paths`]: optional sample files and scratch files
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, simple_grid_fixture};
//!
//! let bytes = simple_grid_fixture().build();
//! ```

pub mod builder;
pub mod fixtures;
pub mod generators;
pub mod paths;

pub use builder::*;
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a sample file with [`find_test_file`], or return from the
/// calling test after printing why it was skipped.
///
/// ```ignore
/// #[test]
/// fn test_sample() {
///     let path = require_test_file!("sample_classic.nc");
///     let bytes = std::fs::read(path).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        let Some(path) = $crate::find_test_file($name) else {
            eprintln!(
                "skipping: sample {} not found (searched {:?})",
                $name,
                $crate::testdata_dirs()
            );
            return;
        };
        path
    }};
}

/// Assert two numbers differ by at most `epsilon`, comparing as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        assert!(
            (left - right).abs() <= epsilon,
            "assertion failed: {} is not within {} of {}",
            left,
            epsilon,
            right
        );
    }};
}

/// [`assert_approx_eq!`] on both members of a coordinate pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_epsilon() {
        assert_approx_eq!(10.1, 101.0 * 0.1, 1e-9);
        assert_approx_eq!(-0.5f32, -0.5f64, 0.0);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_approx_eq_outside_epsilon() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_coords_approx_eq() {
        assert_coords_approx_eq!((16.0, -2.0), (16.0 + 1e-13, -2.0), 1e-12);
    }
}
