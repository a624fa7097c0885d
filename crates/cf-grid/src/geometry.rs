//! Cell geometry handed to renderers.
//!
//! A [`GridCell`] carries everything a vector or raster renderer needs: the
//! four corners before projection, the four projected corners translated
//! into surface space, the values, and the context for style callbacks.
//! [`RasterLayout`] sizes a raster for a grid and scales surface
//! coordinates to pixels.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::GridConfig;
use crate::types::{Extent, Point};

/// Dimension values identifying one cell: the resolved filter plus the
/// cell's X and Y coordinates keyed by the axis variable names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellContext {
    pub dimensions: BTreeMap<String, f64>,
}

impl CellContext {
    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.dimensions.get(dimension).copied()
    }
}

/// One non-null grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub x_index: usize,
    pub y_index: usize,
    /// X coordinate of the cell centre.
    pub x: f64,
    /// Y coordinate of the cell centre.
    pub y: f64,
    /// Stored value before cleansing.
    pub raw: f64,
    /// Cleansed value.
    pub value: f64,
    /// Corners before projection: (minX, minY), (minX, maxY), (maxX, maxY),
    /// (maxX, minY), where min/max are the lower/upper bounds as stored.
    pub corners: [Point; 4],
    /// Projected corners in surface space, same order.
    pub surface: [Point; 4],
    pub context: CellContext,
}

/// Raster dimensions for drawing a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RasterLayout {
    /// Side of one cell in pixels.
    pub cell_pixel_size: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Extent height over width.
    pub aspect_ratio: f64,
    pub extent: Extent,
}

impl RasterLayout {
    /// Size a raster for an `x_len` by `y_len` grid covering `extent`.
    ///
    /// The cell size is the configured ideal, shrunk so the longer grid
    /// side fits the maximum canvas width, and never below one pixel.
    pub fn new(x_len: usize, y_len: usize, extent: Extent, config: &GridConfig) -> Self {
        let longest = x_len.max(y_len).max(1) as u32;
        let max_cell = config.max_canvas_width / longest;
        let cell_pixel_size = config.ideal_cell_size.min(max_cell).max(1);
        let pixel_width = longest * cell_pixel_size;
        let aspect_ratio = extent.aspect_ratio();

        Self {
            cell_pixel_size,
            pixel_width,
            pixel_height: (pixel_width as f64 * aspect_ratio) as u32,
            aspect_ratio,
            extent,
        }
    }

    /// Scale surface-space points to whole pixels (truncating).
    pub fn to_pixels(&self, surface: &[Point; 4]) -> [(i64, i64); 4] {
        let sx = scale(self.pixel_width, self.extent.width());
        let sy = scale(self.pixel_height, self.extent.height());
        surface.map(|p| ((p.x * sx) as i64, (p.y * sy) as i64))
    }
}

fn scale(pixels: u32, range: f64) -> f64 {
    if range > 0.0 {
        pixels as f64 / range
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(width: f64, height: f64) -> Extent {
        Extent {
            min: Point::new(0.0, 0.0),
            max: Point::new(width, height),
        }
    }

    #[test]
    fn test_layout_uses_ideal_cell_size() {
        let layout = RasterLayout::new(4, 3, extent(40.0, 15.0), &GridConfig::default());
        assert_eq!(layout.cell_pixel_size, 25);
        assert_eq!(layout.pixel_width, 100);
        assert_eq!(layout.aspect_ratio, 0.375);
        assert_eq!(layout.pixel_height, 37);
    }

    #[test]
    fn test_layout_shrinks_cells_for_wide_grids() {
        let layout = RasterLayout::new(2000, 10, extent(1.0, 1.0), &GridConfig::default());
        assert_eq!(layout.cell_pixel_size, 8);
        assert_eq!(layout.pixel_width, 16_000);

        // Never below one pixel per cell
        let layout = RasterLayout::new(40_000, 10, extent(1.0, 1.0), &GridConfig::default());
        assert_eq!(layout.cell_pixel_size, 1);
        assert_eq!(layout.pixel_width, 40_000);
    }

    #[test]
    fn test_to_pixels() {
        let layout = RasterLayout::new(4, 3, extent(40.0, 15.0), &GridConfig::default());
        let pixels = layout.to_pixels(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 15.0),
            Point::new(40.0, 15.0),
            Point::new(10.0, 7.5),
        ]);
        assert_eq!(pixels, [(0, 0), (0, 37), (100, 37), (25, 18)]);
    }

    #[test]
    fn test_to_pixels_degenerate_extent() {
        let layout = RasterLayout::new(1, 1, extent(0.0, 0.0), &GridConfig::default());
        assert_eq!(layout.to_pixels(&[Point::new(0.0, 0.0); 4]), [(0, 0); 4]);
    }
}
