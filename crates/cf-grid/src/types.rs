//! Core types for CF grid queries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A spatial or temporal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    T,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::T];

    /// The letter used by the `axis` and `cartesian_axis` attributes.
    pub fn letter(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::T => "T",
        }
    }

    /// The `_CoordinateAxisType` value for this axis.
    pub fn coordinate_axis_type(self) -> &'static str {
        match self {
            Self::X => "Lon",
            Self::Y => "Lat",
            Self::T => "Time",
        }
    }

    /// The lower-case CF `standard_name` for this axis.
    pub fn standard_name(self) -> &'static str {
        match self {
            Self::X => "longitude",
            Self::Y => "latitude",
            Self::T => "time",
        }
    }

    /// Parse an axis letter (case-insensitive).
    pub fn from_letter(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "X" => Some(Self::X),
            "Y" => Some(Self::Y),
            "T" => Some(Self::T),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Variables bound to each axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBinding {
    pub x: Option<String>,
    pub y: Option<String>,
    pub t: Option<String>,
}

impl AxisBinding {
    pub fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::X => self.x.as_deref(),
            Axis::Y => self.y.as_deref(),
            Axis::T => self.t.as_deref(),
        }
    }

    pub fn set(&mut self, axis: Axis, variable: Option<String>) {
        match axis {
            Axis::X => self.x = variable,
            Axis::Y => self.y = variable,
            Axis::T => self.t = variable,
        }
    }
}

/// Where cell bounds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsMode {
    /// Read from the variable named by the axis's `bounds` attribute.
    Definitive,
    /// Synthesized from the midpoints between axis values.
    Interpolated,
}

/// Cell edges along one axis: `[lower, upper]` per axis value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisBounds {
    pub axis: Axis,
    /// The axis variable.
    pub variable: String,
    pub mode: BoundsMode,
    /// Flat `[lower0, upper0, lower1, upper1, ...]`.
    pub bounds: Vec<f64>,
}

impl AxisBounds {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.bounds.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.len() < 2
    }

    /// Edges of cell `index` as stored (either orientation).
    pub fn pair(&self, index: usize) -> Option<(f64, f64)> {
        let lower = *self.bounds.get(index * 2)?;
        let upper = *self.bounds.get(index * 2 + 1)?;
        Some((lower, upper))
    }

    /// First cell whose closed interval contains `value`.
    pub fn find(&self, value: f64) -> Option<usize> {
        (0..self.len()).find(|&i| {
            self.pair(i)
                .is_some_and(|(a, b)| a.min(b) <= value && value <= a.max(b))
        })
    }

    /// Smallest edge value.
    pub fn min(&self) -> Option<f64> {
        self.bounds.iter().copied().reduce(f64::min)
    }

    /// Largest edge value.
    pub fn max(&self) -> Option<f64> {
        self.bounds.iter().copied().reduce(f64::max)
    }
}

/// Bounding box of the X/Y cell edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridBBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Definitive only if both axes have definitive bounds.
    pub mode: BoundsMode,
}

impl GridBBox {
    /// Get the width in axis units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height in axis units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Min/max of all projected bounds corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min: Point,
    pub max: Point,
}

impl Extent {
    /// Smallest extent holding every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut extent = Self {
            min: first,
            max: first,
        };
        for p in iter {
            extent.min.x = extent.min.x.min(p.x);
            extent.min.y = extent.min.y.min(p.y);
            extent.max.x = extent.max.x.max(p.x);
            extent.max.y = extent.max.y.max(p.y);
        }
        Some(extent)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        self.height() / self.width()
    }

    /// Translate a projected point into surface space: origin at the
    /// top-left corner, y growing downwards.
    pub fn to_surface(&self, p: Point) -> Point {
        Point::new(p.x - self.min.x, self.max.y - p.y)
    }
}

/// Selected coordinate value per non-spatial dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionFilter(BTreeMap<String, f64>);

impl DimensionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, dimension: impl Into<String>, value: f64) -> Self {
        self.0.insert(dimension.into(), value);
        self
    }

    pub fn insert(&mut self, dimension: impl Into<String>, value: f64) {
        self.0.insert(dimension.into(), value);
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn contains(&self, dimension: &str) -> bool {
        self.0.contains_key(dimension)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for DimensionFilter {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Statistics about the dataset caches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Derived values (statistics, bounds, bbox, extent) served from cache.
    pub hits: u64,
    /// Derived values computed.
    pub misses: u64,
    /// Full data scans performed by `stats`.
    pub stats_scans: u64,
    pub projection_hits: u64,
    pub projection_misses: u64,
    pub projection_entries: usize,
}

impl CacheStats {
    /// Calculate the derived-value hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(values: Vec<f64>) -> AxisBounds {
        AxisBounds {
            axis: Axis::X,
            variable: "lon".into(),
            mode: BoundsMode::Interpolated,
            bounds: values,
        }
    }

    #[test]
    fn test_axis_letters() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_letter(axis.letter()), Some(axis));
        }
        assert_eq!(Axis::from_letter("x"), Some(Axis::X));
        assert_eq!(Axis::from_letter("Z"), None);
    }

    #[test]
    fn test_bounds_find_inclusive_either_orientation() {
        let b = bounds(vec![5.0, 15.0, 25.0, 15.0]);
        assert_eq!(b.len(), 2);
        assert_eq!(b.find(5.0), Some(0));
        // Shared edge: first match wins
        assert_eq!(b.find(15.0), Some(0));
        assert_eq!(b.find(20.0), Some(1));
        assert_eq!(b.find(25.0), Some(1));
        assert_eq!(b.find(25.5), None);
        assert_eq!(b.min(), Some(5.0));
        assert_eq!(b.max(), Some(25.0));
    }

    #[test]
    fn test_empty_bounds() {
        let b = bounds(vec![]);
        assert!(b.is_empty());
        assert_eq!(b.find(0.0), None);
        assert_eq!(b.min(), None);
    }

    #[test]
    fn test_extent_surface_translation() {
        let extent = Extent::from_points([
            Point::new(-10.0, 40.0),
            Point::new(10.0, 50.0),
            Point::new(0.0, 45.0),
        ])
        .unwrap();
        assert_eq!(extent.width(), 20.0);
        assert_eq!(extent.height(), 10.0);
        assert_eq!(extent.aspect_ratio(), 0.5);
        assert_eq!(extent.to_surface(Point::new(-10.0, 50.0)), Point::new(0.0, 0.0));
        assert_eq!(extent.to_surface(Point::new(10.0, 40.0)), Point::new(20.0, 10.0));
        assert!(Extent::from_points([]).is_none());
    }

    #[test]
    fn test_dimension_filter() {
        let filter = DimensionFilter::new().with("time", 6.0).with("level", 850.0);
        assert_eq!(filter.get("time"), Some(6.0));
        assert!(filter.contains("level"));
        assert!(!filter.contains("lat"));
        // Ordered by name
        let names: Vec<&str> = filter.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["level", "time"]);

        let collected: DimensionFilter = vec![("time", 6.0)].into_iter().collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(serde_json::to_string(&collected).unwrap(), r#"{"time":6.0}"#);
    }

    #[test]
    fn test_cache_stats_hit_rate() {
        let mut stats = CacheStats::default();
        assert!((stats.hit_rate() - 0.0).abs() < f64::EPSILON);

        stats.hits = 3;
        stats.misses = 1;
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
