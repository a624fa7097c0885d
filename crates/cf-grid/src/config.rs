//! Configuration for CF datasets.

use netcdf_parser::ReaderOptions;
use serde::{Deserialize, Serialize};

/// Configuration for a [`CfDataset`](crate::CfDataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Treat the source as immutable and cache statistics, bounds and the
    /// bounding box. When false those are recomputed on every call.
    pub read_only: bool,

    /// Expose `byte` variables as integers.
    pub byte_as_integer: bool,

    /// Capacity of the projected-coordinate memo.
    pub projection_cache_size: usize,

    /// Preferred size of one cell in a raster layout, in pixels.
    pub ideal_cell_size: u32,

    /// Largest raster width a layout may request, in pixels.
    pub max_canvas_width: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            read_only: true,
            byte_as_integer: true,
            projection_cache_size: 65_536,
            ideal_cell_size: 25,
            max_canvas_width: 16_000,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CFGRID_READ_ONLY") {
            if let Some(flag) = parse_flag(&val) {
                config.read_only = flag;
            }
        }

        if let Ok(val) = std::env::var("CFGRID_BYTE_AS_INTEGER") {
            if let Some(flag) = parse_flag(&val) {
                config.byte_as_integer = flag;
            }
        }

        if let Ok(val) = std::env::var("CFGRID_PROJECTION_CACHE_SIZE") {
            if let Ok(size) = val.parse() {
                config.projection_cache_size = size;
            }
        }

        if let Ok(val) = std::env::var("CFGRID_IDEAL_CELL_SIZE") {
            if let Ok(size) = val.parse() {
                config.ideal_cell_size = size;
            }
        }

        if let Ok(val) = std::env::var("CFGRID_MAX_CANVAS_WIDTH") {
            if let Ok(width) = val.parse() {
                config.max_canvas_width = width;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.projection_cache_size == 0 {
            return Err("projection_cache_size must be > 0".to_string());
        }

        if self.ideal_cell_size == 0 {
            return Err("ideal_cell_size must be > 0".to_string());
        }

        if self.max_canvas_width == 0 {
            return Err("max_canvas_width must be > 0".to_string());
        }

        Ok(())
    }

    /// Options forwarded to the NetCDF reader.
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            byte_as_integer: self.byte_as_integer,
        }
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
