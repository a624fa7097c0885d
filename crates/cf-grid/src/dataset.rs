//! CF dataset handle: axis binding, grid extraction and cached derived
//! values.
//!
//! A [`CfDataset`] owns a [`NetCdfReader`] and answers grid queries against
//! it. Derived values (statistics, bounds, the bounding box and the
//! projected extent) are cached while the dataset is configured read-only;
//! the caches are never invalidated implicitly, so a caller that swaps the
//! projection function must call [`CfDataset::reset_projection`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use netcdf_parser::{NetCdfReader, VariableInfo};
use serde::Serialize;
use tracing::{debug, info};

use crate::axis::resolve_axes;
use crate::bounds::resolve_bounds;
use crate::cache::ProjectionCache;
use crate::cleanse::{read_numeric, Cleanser};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::geometry::{CellContext, GridCell, RasterLayout};
use crate::stats::VariableStats;
use crate::style::{CellStyle, StyledCell};
use crate::types::{
    Axis, AxisBinding, AxisBounds, BoundsMode, CacheStats, DimensionFilter, Extent, GridBBox,
    Point,
};

/// Coordinate transform applied to bounds corners.
pub type Projection<'a> = &'a dyn Fn(f64, f64) -> (f64, f64);

/// Nesting order of the two trailing dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layout {
    /// Declared `[..., X, Y]`: Y varies fastest.
    XMajor,
    /// Declared `[..., Y, X]`: X varies fastest.
    YMajor,
}

/// A validated grid query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedQuery {
    pub variable: String,
    pub x_variable: String,
    pub y_variable: String,
    pub layout: Layout,
    pub x_len: usize,
    pub y_len: usize,
    /// Filter with single-valued dimensions filled in.
    pub filter: DimensionFilter,
    /// Flat index of the first element of the selected X/Y plane.
    pub offset: usize,
}

/// One grid point of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    pub x_index: usize,
    pub y_index: usize,
    pub x: f64,
    pub y: f64,
    /// Stored value, `None` if the data is shorter than the grid.
    pub raw: Option<f64>,
    /// Cleansed value.
    pub value: Option<f64>,
}

/// The X/Y plane of a variable selected by a dimension filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridExtract {
    pub query: PreparedQuery,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
    /// Points ordered by X index, then Y index, whatever the layout.
    pub points: Vec<GridPoint>,
}

impl GridExtract {
    pub fn get(&self, x_index: usize, y_index: usize) -> Option<&GridPoint> {
        if x_index >= self.query.x_len || y_index >= self.query.y_len {
            return None;
        }
        self.points.get(x_index * self.query.y_len + y_index)
    }

    /// Cleansed value at the exact coordinate pair.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let xi = self.x_values.iter().position(|&v| v == x)?;
        let yi = self.y_values.iter().position(|&v| v == y)?;
        self.get(xi, yi).and_then(|p| p.value)
    }
}

/// A NetCDF dataset interpreted with CF conventions.
pub struct CfDataset {
    reader: NetCdfReader,
    config: GridConfig,
    dim_index: HashMap<String, usize>,
    var_index: HashMap<String, usize>,
    axes: AxisBinding,
    stats_cache: HashMap<String, Arc<VariableStats>>,
    bounds_cache: HashMap<Axis, Arc<AxisBounds>>,
    bbox: Option<Arc<GridBBox>>,
    extent: Option<Extent>,
    projection: ProjectionCache,
    hits: AtomicU64,
    misses: AtomicU64,
    stats_scans: AtomicU64,
}

impl CfDataset {
    /// Open a dataset with the default configuration.
    pub fn new(source: impl Into<Bytes>) -> Result<Self> {
        Self::with_config(source, GridConfig::default())
    }

    pub fn with_config(source: impl Into<Bytes>, config: GridConfig) -> Result<Self> {
        config.validate().map_err(GridError::config)?;
        let reader = NetCdfReader::with_options(source, config.reader_options())?;
        Self::from_reader(reader, config)
    }

    /// Wrap an already opened reader.
    pub fn from_reader(reader: NetCdfReader, config: GridConfig) -> Result<Self> {
        config.validate().map_err(GridError::config)?;

        let dim_index = reader
            .dimensions()
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        let var_index = reader
            .variables()
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), i))
            .collect();
        let axes = resolve_axes(reader.variables());

        info!(
            dimensions = reader.dimensions().len(),
            variables = reader.variables().len(),
            x = ?axes.x,
            y = ?axes.y,
            t = ?axes.t,
            read_only = config.read_only,
            "Indexed CF dataset"
        );

        Ok(Self {
            projection: ProjectionCache::new(config.projection_cache_size),
            reader,
            config,
            dim_index,
            var_index,
            axes,
            stats_cache: HashMap::new(),
            bounds_cache: HashMap::new(),
            bbox: None,
            extent: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stats_scans: AtomicU64::new(0),
        })
    }

    pub fn reader(&self) -> &NetCdfReader {
        &self.reader
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Variables bound to X, Y and T.
    pub fn axes(&self) -> &AxisBinding {
        &self.axes
    }

    /// Override an axis binding. Clears every value derived from the axes.
    pub fn set_axis(&mut self, axis: Axis, variable: Option<String>) {
        self.axes.set(axis, variable);
        self.bounds_cache.clear();
        self.bbox = None;
        self.extent = None;
        self.projection.clear();
    }

    /// Metadata of a variable.
    pub fn variable(&self, name: &str) -> Result<&VariableInfo> {
        self.var_index
            .get(name)
            .and_then(|&i| self.reader.variables().get(i))
            .ok_or_else(|| GridError::variable_not_found(name))
    }

    /// Id of the dimension called `name`.
    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dim_index.get(name).copied()
    }

    /// Values of a variable with fill masking, scale and offset applied.
    pub fn cleansed(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let values = read_numeric(&self.reader, name)?;
        let cleanser = Cleanser::from_variable(self.variable(name)?);
        Ok(cleanser.cleanse(&values))
    }

    /// Statistics of the cleansed values of `name`.
    pub fn stats(&mut self, name: &str) -> Result<Arc<VariableStats>> {
        if self.config.read_only {
            if let Some(stats) = self.stats_cache.get(name) {
                self.hit("stats", name);
                return Ok(Arc::clone(stats));
            }
        }

        let values = self.cleansed(name)?;
        self.stats_scans.fetch_add(1, Ordering::Relaxed);
        self.miss("stats", name);
        let stats = Arc::new(VariableStats::compute(&values));

        if self.config.read_only {
            self.stats_cache.insert(name.to_string(), Arc::clone(&stats));
        }
        Ok(stats)
    }

    /// Cell bounds of the variable bound to `axis`.
    pub fn bounds(&mut self, axis: Axis) -> Result<Arc<AxisBounds>> {
        let variable = self
            .axes
            .get(axis)
            .ok_or(GridError::AxisNotResolved(axis))?
            .to_string();

        if self.config.read_only {
            if let Some(bounds) = self.bounds_cache.get(&axis) {
                self.hit("bounds", &variable);
                return Ok(Arc::clone(bounds));
            }
        }

        let bounds = Arc::new(resolve_bounds(&self.reader, axis, &variable)?);
        self.miss("bounds", &variable);

        if self.config.read_only {
            self.bounds_cache.insert(axis, Arc::clone(&bounds));
        }
        Ok(bounds)
    }

    /// Bounding box of the X and Y cell edges.
    ///
    /// An axis with no values contributes NaN edges.
    pub fn bbox(&mut self) -> Result<Arc<GridBBox>> {
        if self.config.read_only {
            if let Some(bbox) = &self.bbox {
                let bbox = Arc::clone(bbox);
                self.hit("bbox", "XY");
                return Ok(bbox);
            }
        }

        let x = self.bounds(Axis::X)?;
        let y = self.bounds(Axis::Y)?;
        let mode = if x.mode == BoundsMode::Definitive && y.mode == BoundsMode::Definitive {
            BoundsMode::Definitive
        } else {
            BoundsMode::Interpolated
        };
        let bbox = Arc::new(GridBBox {
            min_x: x.min().unwrap_or(f64::NAN),
            min_y: y.min().unwrap_or(f64::NAN),
            max_x: x.max().unwrap_or(f64::NAN),
            max_y: y.max().unwrap_or(f64::NAN),
            mode,
        });
        self.miss("bbox", "XY");

        if self.config.read_only {
            self.bbox = Some(Arc::clone(&bbox));
        }
        Ok(bbox)
    }

    /// Validate a grid query and locate its X/Y plane.
    pub fn prepare(&self, variable: &str, filter: &DimensionFilter) -> Result<PreparedQuery> {
        let (x_variable, x_dim) = self.axis_dimension(Axis::X)?;
        let (y_variable, y_dim) = self.axis_dimension(Axis::Y)?;
        let info = self.variable(variable)?;
        let dims = &info.dimensions;

        let x_pos = dims
            .iter()
            .position(|&d| d == x_dim)
            .ok_or_else(|| GridError::AxisNotInVariable {
                axis: Axis::X,
                dimension: x_variable.clone(),
                variable: variable.to_string(),
            })?;
        let y_pos = dims
            .iter()
            .position(|&d| d == y_dim)
            .ok_or_else(|| GridError::AxisNotInVariable {
                axis: Axis::Y,
                dimension: y_variable.clone(),
                variable: variable.to_string(),
            })?;

        // X and Y must be the two innermost dimensions
        let n = dims.len();
        if (n - x_pos - 1) + (n - y_pos - 1) != 1 {
            return Err(GridError::Interlaced(variable.to_string()));
        }

        let mut resolved = filter.clone();
        let mut indices = Vec::with_capacity(n.saturating_sub(2));
        for &dim_id in &dims[..n - 2] {
            let dimension = self
                .reader
                .dimensions()
                .get(dim_id)
                .ok_or_else(|| GridError::UndefinedDimension(variable.to_string()))?;
            let name = dimension.name.as_str();
            if name.is_empty() {
                return Err(GridError::UnnamedDimension(variable.to_string()));
            }
            if !self.var_index.contains_key(name) {
                return Err(GridError::UndefinedDimensionVariable {
                    variable: variable.to_string(),
                    dimension: name.to_string(),
                });
            }

            let coordinates = read_numeric(&self.reader, name)?;
            let index = match resolved.get(name) {
                Some(value) => coordinates
                    .iter()
                    .position(|&c| c == value)
                    .ok_or_else(|| GridError::FilterValueNotFound {
                        dimension: name.to_string(),
                        value,
                    })?,
                None if coordinates.len() == 1 => {
                    resolved.insert(name, coordinates[0]);
                    0
                }
                None => return Err(GridError::UnboundDimension(name.to_string())),
            };
            let len = self.reader.dimension_len(dim_id).unwrap_or(coordinates.len());
            indices.push((index, len));
        }

        let x_len = read_numeric(&self.reader, &x_variable)?.len();
        let y_len = read_numeric(&self.reader, &y_variable)?.len();

        // Row-major: each leading index is scaled by the sizes inside it
        let mut offset = 0;
        let mut stride = x_len * y_len;
        for &(index, len) in indices.iter().rev() {
            offset += index * stride;
            stride *= len;
        }

        let layout = if dims[n - 1] == y_dim {
            Layout::XMajor
        } else {
            Layout::YMajor
        };

        debug!(variable, ?layout, offset, "Prepared grid query");

        Ok(PreparedQuery {
            variable: variable.to_string(),
            x_variable,
            y_variable,
            layout,
            x_len,
            y_len,
            filter: resolved,
            offset,
        })
    }

    /// Read the X/Y plane of `variable` selected by `filter`.
    pub fn extract(&self, variable: &str, filter: &DimensionFilter) -> Result<GridExtract> {
        let query = self.prepare(variable, filter)?;
        let x_values = read_numeric(&self.reader, &query.x_variable)?;
        let y_values = read_numeric(&self.reader, &query.y_variable)?;
        let raw = read_numeric(&self.reader, variable)?;
        let cleanser = Cleanser::from_variable(self.variable(variable)?);

        let mut points = Vec::with_capacity(query.x_len * query.y_len);
        for (x_index, &x) in x_values.iter().enumerate() {
            for (y_index, &y) in y_values.iter().enumerate() {
                let flat = match query.layout {
                    Layout::XMajor => query.offset + x_index * query.y_len + y_index,
                    Layout::YMajor => query.offset + y_index * query.x_len + x_index,
                };
                let raw = raw.get(flat).copied();
                points.push(GridPoint {
                    x_index,
                    y_index,
                    x,
                    y,
                    raw,
                    value: raw.and_then(|v| cleanser.apply(v)),
                });
            }
        }

        Ok(GridExtract {
            query,
            x_values,
            y_values,
            points,
        })
    }

    /// Cleansed value of the cell containing `(x, y)`, or `None` when the
    /// point lies outside every cell.
    pub fn cell_value(
        &mut self,
        variable: &str,
        filter: &DimensionFilter,
        x: f64,
        y: f64,
    ) -> Result<Option<f64>> {
        let query = self.prepare(variable, filter)?;
        let x_bounds = self.bounds(Axis::X)?;
        let y_bounds = self.bounds(Axis::Y)?;

        let (Some(x_index), Some(y_index)) = (x_bounds.find(x), y_bounds.find(y)) else {
            return Ok(None);
        };

        let flat = match query.layout {
            Layout::XMajor => query.offset + x_index * query.y_len + y_index,
            Layout::YMajor => query.offset + y_index * query.x_len + x_index,
        };
        let raw = read_numeric(&self.reader, variable)?;
        let cleanser = Cleanser::from_variable(self.variable(variable)?);
        Ok(raw.get(flat).and_then(|&v| cleanser.apply(v)))
    }

    /// Min/max of every projected combination of X and Y edges.
    ///
    /// Without a projection the edges are used as they are. The extent is
    /// cached independently of the projection passed in.
    pub fn projected_extent(&mut self, projection: Option<Projection<'_>>) -> Result<Extent> {
        if self.config.read_only {
            if let Some(extent) = self.extent {
                self.hit("extent", "XY");
                return Ok(extent);
            }
        }

        let x = self.bounds(Axis::X)?;
        let y = self.bounds(Axis::Y)?;
        let mut points = Vec::with_capacity(x.bounds.len() * y.bounds.len());
        for &bx in &x.bounds {
            for &by in &y.bounds {
                points.push(self.project(bx, by, projection));
            }
        }
        let origin = Point::new(0.0, 0.0);
        let extent = Extent::from_points(points).unwrap_or(Extent {
            min: origin,
            max: origin,
        });
        self.miss("extent", "XY");

        if self.config.read_only {
            self.extent = Some(extent);
        }
        Ok(extent)
    }

    /// Every non-null cell of the selected plane, with corners projected
    /// into surface space.
    pub fn cells(
        &mut self,
        variable: &str,
        filter: &DimensionFilter,
        projection: Option<Projection<'_>>,
    ) -> Result<Vec<GridCell>> {
        let extract = self.extract(variable, filter)?;
        let x_bounds = self.bounds(Axis::X)?;
        let y_bounds = self.bounds(Axis::Y)?;
        let extent = self.projected_extent(projection)?;

        let mut cells = Vec::with_capacity(extract.points.len());
        for point in &extract.points {
            let (Some(raw), Some(value)) = (point.raw, point.value) else {
                continue;
            };
            let (Some((x0, x1)), Some((y0, y1))) =
                (x_bounds.pair(point.x_index), y_bounds.pair(point.y_index))
            else {
                continue;
            };

            let corners = [
                Point::new(x0, y0),
                Point::new(x0, y1),
                Point::new(x1, y1),
                Point::new(x1, y0),
            ];
            let mut surface = corners;
            for corner in surface.iter_mut() {
                *corner = extent.to_surface(self.project(corner.x, corner.y, projection));
            }

            let mut context = CellContext {
                dimensions: extract.query.filter.as_map().clone(),
            };
            context
                .dimensions
                .insert(extract.query.x_variable.clone(), point.x);
            context
                .dimensions
                .insert(extract.query.y_variable.clone(), point.y);

            cells.push(GridCell {
                x_index: point.x_index,
                y_index: point.y_index,
                x: point.x,
                y: point.y,
                raw,
                value,
                corners,
                surface,
                context,
            });
        }
        Ok(cells)
    }

    /// [`cells`](Self::cells) with `style` resolved per cell. Invisible
    /// cells are dropped.
    pub fn styled_cells(
        &mut self,
        variable: &str,
        filter: &DimensionFilter,
        projection: Option<Projection<'_>>,
        style: &CellStyle,
    ) -> Result<Vec<StyledCell>> {
        Ok(self
            .cells(variable, filter, projection)?
            .into_iter()
            .filter_map(|cell| {
                let style = style.resolve(&cell.context, Some(cell.value));
                style.visible.then_some(StyledCell { cell, style })
            })
            .collect())
    }

    /// Raster size for drawing the X/Y grid.
    pub fn raster_layout(&mut self, projection: Option<Projection<'_>>) -> Result<RasterLayout> {
        let x = self.bounds(Axis::X)?;
        let y = self.bounds(Axis::Y)?;
        let extent = self.projected_extent(projection)?;
        Ok(RasterLayout::new(x.len(), y.len(), extent, &self.config))
    }

    /// Drop every cached value.
    pub fn invalidate(&mut self) {
        self.stats_cache.clear();
        self.bounds_cache.clear();
        self.bbox = None;
        self.reset_projection();
        debug!("Invalidated dataset caches");
    }

    /// Drop the projection memo and the projected extent.
    pub fn reset_projection(&mut self) {
        self.projection.clear();
        self.extent = None;
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stats_scans: self.stats_scans.load(Ordering::Relaxed),
            projection_hits: self.projection.hits(),
            projection_misses: self.projection.misses(),
            projection_entries: self.projection.len(),
        }
    }

    /// The axis variable and the dimension it spans: the dimension of the
    /// same name, else the variable's only dimension.
    fn axis_dimension(&self, axis: Axis) -> Result<(String, usize)> {
        let name = self
            .axes
            .get(axis)
            .ok_or(GridError::AxisNotResolved(axis))?;

        let dim = self.dimension_index(name).or_else(|| {
            self.variable(name)
                .ok()
                .filter(|v| v.dimensions.len() == 1)
                .map(|v| v.dimensions[0])
        });

        match dim {
            Some(id) => Ok((name.to_string(), id)),
            None => Err(GridError::AxisDimensionMissing {
                axis,
                name: name.to_string(),
            }),
        }
    }

    fn project(&mut self, x: f64, y: f64, projection: Option<Projection<'_>>) -> Point {
        match projection {
            Some(f) => self.projection.project(x, y, f),
            None => Point::new(x, y),
        }
    }

    fn hit(&self, kind: &str, key: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(kind, key, "Cache hit");
    }

    fn miss(&self, kind: &str, key: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(kind, key, "Cache miss");
    }
}

impl std::fmt::Debug for CfDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CfDataset")
            .field("axes", &self.axes)
            .field("config", &self.config)
            .field("cache", &self.cache_stats())
            .finish()
    }
}
