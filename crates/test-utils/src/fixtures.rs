//! Canned CF datasets for tests.
//!
//! Each function returns the bytes of a small NetCDF classic file covering
//! one scenario. The expected values quoted in the docs are what the tests
//! across the workspace assert against.

use crate::builder::{FixtureVariable, NetCdfFixture};
use crate::generators::{create_test_grid, transpose_grid};

/// A 4 x 3 packed grid with a fill value.
///
/// - `lon(lon)` = `[0, 10, 20, 30]`, `axis = "X"`
/// - `lat(lat)` = `[40, 45, 50]`, `standard_name = "latitude"`
/// - `temperature(lat, lon)`: shorts with `_FillValue = -999`,
///   `scale_factor = 0.5`, `add_offset = 100`; cleansed values are
///   `[100, 101, 102, 103, 104, null, 106, 107, 108, 109, 110, 111]`
/// - `interlaced(lat, band, lon)`: spatial axes not trailing
/// - `source(nchar)`: the text `"model"`
pub fn simple_grid_fixture() -> NetCdfFixture {
    NetCdfFixture::new()
        .dimension("lon", 4)
        .dimension("lat", 3)
        .dimension("band", 2)
        .dimension("nchar", 5)
        .attribute("title", "simple grid")
        .attribute("Conventions", "CF-1.6")
        .variable(
            FixtureVariable::new("lon", &["lon"], vec![0.0f64, 10.0, 20.0, 30.0])
                .attribute("axis", "X")
                .attribute("units", "degrees_east"),
        )
        .variable(
            FixtureVariable::new("lat", &["lat"], vec![40.0f64, 45.0, 50.0])
                .attribute("standard_name", "latitude")
                .attribute("units", "degrees_north"),
        )
        .variable(FixtureVariable::new("band", &["band"], vec![1i32, 2]))
        .variable(
            FixtureVariable::new(
                "temperature",
                &["lat", "lon"],
                vec![0i16, 2, 4, 6, 8, -999, 12, 14, 16, 18, 20, 22],
            )
            .attribute("_FillValue", -999i16)
            .attribute("scale_factor", 0.5f64)
            .attribute("add_offset", 100.0f64)
            .attribute("units", "K"),
        )
        .variable(FixtureVariable::new(
            "interlaced",
            &["lat", "band", "lon"],
            (0..24).map(|v| v as f32).collect::<Vec<f32>>(),
        ))
        .variable(FixtureVariable::new("source", &["nchar"], "model"))
}

/// Three records of a 2 x 2 grid on a single pressure level.
///
/// - `time(time)` = `[0, 6, 12]` (record variable, `axis = "T"`)
/// - `level(level)` = `[850]`
/// - `lat(lat)` = `[10, 20]`, `lon(lon)` = `[100, 110]`
/// - `precip(time, level, lat, lon)`: shorts `t * 100 + k` for record `t`
///   and cell `k`, `scale_factor = 0.1`
/// - `flag(time)` = `[1, -1, 3]` (byte)
///
/// Record variables of three widths share the record stride (20 bytes).
pub fn time_series_fixture() -> NetCdfFixture {
    let precip: Vec<i16> = (0..3)
        .flat_map(|t| (0..4).map(move |k| (t * 100 + k) as i16))
        .collect();

    NetCdfFixture::new()
        .unlimited("time", 3)
        .dimension("level", 1)
        .dimension("lat", 2)
        .dimension("lon", 2)
        .variable(
            FixtureVariable::new("time", &["time"], vec![0.0f64, 6.0, 12.0])
                .attribute("axis", "T")
                .attribute("units", "hours since 2024-01-01 00:00:00"),
        )
        .variable(FixtureVariable::new("level", &["level"], vec![850.0f64]))
        .variable(FixtureVariable::new("lat", &["lat"], vec![10.0f32, 20.0]).attribute("axis", "Y"))
        .variable(FixtureVariable::new("lon", &["lon"], vec![100.0f32, 110.0]).attribute("axis", "X"))
        .variable(
            FixtureVariable::new("precip", &["time", "level", "lat", "lon"], precip)
                .attribute("scale_factor", 0.1f64),
        )
        .variable(FixtureVariable::new("flag", &["time"], vec![1i8, -1, 3]))
}

/// Variables carrying competing axis hints.
///
/// The expected binding is `X = "x"` (via `AXIS`, ahead of the earlier
/// `nav_lon` matched by `standard_name`), `Y = "grid_y"` (via
/// `cartesian_axis`, ahead of `nav_lat` via `_CoordinateAxisType`) and
/// `T = "t"`. `lat2d` has two dimensions and never qualifies.
pub fn conflicting_axis_fixture() -> NetCdfFixture {
    NetCdfFixture::new()
        .dimension("a", 3)
        .dimension("b", 2)
        .dimension("c", 1)
        .variable(
            FixtureVariable::new("nav_lon", &["a"], vec![1.0f64, 2.0, 3.0])
                .attribute("standard_name", "Longitude"),
        )
        .variable(
            FixtureVariable::new("lat2d", &["a", "b"], vec![0.0f64; 6])
                .attribute("axis", "Y")
                .attribute("standard_name", "latitude"),
        )
        .variable(
            FixtureVariable::new("nav_lat", &["b"], vec![0.0f64, 1.0])
                .attribute("_CoordinateAxisType", "Lat"),
        )
        .variable(
            FixtureVariable::new("x", &["a"], vec![10.0f64, 20.0, 30.0])
                .attribute("AXIS", "X")
                .attribute("standard_name", "longitude"),
        )
        .variable(
            FixtureVariable::new("grid_y", &["b"], vec![5.0f64, 15.0])
                .attribute("Cartesian_Axis", "Y"),
        )
        .variable(
            FixtureVariable::new("t", &["c"], vec![0.0f64]).attribute("_CoordinateAxisType", "Time"),
        )
}

/// A 3 x 2 grid whose axes carry `bounds` references.
///
/// - `lon` = `[10, 20, 30]` with `lon_bnds` = `[8, 12, 12, 28, 28, 32]`
/// - `lat` = `[0, 1]` with `lat_bnds` = `[-1, 0.5, 0.5, 2]`
/// - `v(lat, lon)` = `[1, 2, 3, 4, 5, 6]`
pub fn bounded_grid_fixture() -> NetCdfFixture {
    bounds_fixture(Some(vec![-1.0, 0.5, 0.5, 2.0]))
}

/// As [`bounded_grid_fixture`], but `lat` references a `lat_bnds` variable
/// that does not exist, so its bounds are interpolated
/// (`[-0.5, 0.5, 0.5, 1.5]`).
pub fn broken_bounds_fixture() -> NetCdfFixture {
    bounds_fixture(None)
}

fn bounds_fixture(lat_bounds: Option<Vec<f64>>) -> NetCdfFixture {
    let mut fixture = NetCdfFixture::new()
        .dimension("lon", 3)
        .dimension("lat", 2)
        .dimension("nv", 2)
        .variable(
            FixtureVariable::new("lon", &["lon"], vec![10.0f64, 20.0, 30.0])
                .attribute("axis", "X")
                .attribute("bounds", "lon_bnds"),
        )
        .variable(FixtureVariable::new(
            "lon_bnds",
            &["lon", "nv"],
            vec![8.0f64, 12.0, 12.0, 28.0, 28.0, 32.0],
        ))
        .variable(
            FixtureVariable::new("lat", &["lat"], vec![0.0f64, 1.0])
                .attribute("axis", "Y")
                .attribute("bounds", "lat_bnds"),
        )
        .variable(FixtureVariable::new(
            "v",
            &["lat", "lon"],
            vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0],
        ));
    if let Some(values) = lat_bounds {
        fixture = fixture.variable(FixtureVariable::new("lat_bnds", &["lat", "nv"], values));
    }
    fixture
}

/// The same 3 x 2 field stored both ways.
///
/// - `x` = `[0, 1, 2]`, `y` = `[0, 10]`
/// - `yx(y, x)` and `xy(x, y)` hold `xi * 1000 + yi` at grid point `(xi, yi)`
pub fn transposed_grid_fixture() -> NetCdfFixture {
    let yx = create_test_grid(3, 2);
    let xy = transpose_grid(&yx, 3, 2);

    NetCdfFixture::new()
        .dimension("x", 3)
        .dimension("y", 2)
        .variable(FixtureVariable::new("x", &["x"], vec![0.0f64, 1.0, 2.0]).attribute("axis", "X"))
        .variable(FixtureVariable::new("y", &["y"], vec![0.0f64, 10.0]).attribute("axis", "Y"))
        .variable(FixtureVariable::new("yx", &["y", "x"], yx))
        .variable(FixtureVariable::new("xy", &["x", "y"], xy))
}
