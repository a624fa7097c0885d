//! CF-convention grid engine over NetCDF classic datasets.
//!
//! [`CfDataset`] binds X, Y and T axes from CF attributes, resolves cell
//! bounds, slices the X/Y plane of a data variable with a dimension filter
//! and hands renderer-ready cells to the caller. Statistics, bounds, the
//! bounding box and projected coordinates are cached while the dataset is
//! configured read-only.
//!
//! # Example
//!
//! ```no_run
//! use cf_grid::{CfDataset, DimensionFilter};
//!
//! let bytes = std::fs::read("precip.nc").unwrap();
//! let mut dataset = CfDataset::new(bytes).unwrap();
//! let filter = DimensionFilter::new().with("time", 6.0);
//! let grid = dataset.extract("precip", &filter).unwrap();
//! let stats = dataset.stats("precip").unwrap();
//! println!("{} points, mean {}", grid.points.len(), stats.mean);
//! ```

pub mod axis;
pub mod bounds;
pub mod cache;
pub mod cleanse;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod stats;
pub mod style;
pub mod types;

pub use axis::{resolve_axes, resolve_axis, AxisMatch, AxisRule, AXIS_RULES};
pub use bounds::{interpolate, resolve_bounds};
pub use cache::ProjectionCache;
pub use cleanse::{read_numeric, Cleanser};
pub use config::GridConfig;
pub use dataset::{CfDataset, GridExtract, GridPoint, Layout, PreparedQuery, Projection};
pub use error::{GridError, Result};
pub use geometry::{CellContext, GridCell, RasterLayout};
pub use stats::VariableStats;
pub use style::{CellStyle, ResolvedStyle, StyleValue, StyledCell};
pub use types::{
    Axis, AxisBinding, AxisBounds, BoundsMode, CacheStats, DimensionFilter, Extent, GridBBox,
    Point,
};
