//! Typed per-cell style callbacks.

use std::fmt;

use serde::Serialize;

use crate::geometry::{CellContext, GridCell};

/// A style property: a constant, or a function of the cell.
pub enum StyleValue<T> {
    Fixed(T),
    Computed(Box<dyn Fn(&CellContext, Option<f64>) -> T>),
}

impl<T: Clone> StyleValue<T> {
    /// Wrap a closure.
    pub fn computed(f: impl Fn(&CellContext, Option<f64>) -> T + 'static) -> Self {
        Self::Computed(Box::new(f))
    }

    pub fn resolve(&self, context: &CellContext, value: Option<f64>) -> T {
        match self {
            Self::Fixed(v) => v.clone(),
            Self::Computed(f) => f(context, value),
        }
    }
}

impl<T> From<T> for StyleValue<T> {
    fn from(value: T) -> Self {
        Self::Fixed(value)
    }
}

impl From<&str> for StyleValue<String> {
    fn from(value: &str) -> Self {
        Self::Fixed(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for StyleValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Style of grid cells.
#[derive(Debug)]
pub struct CellStyle {
    pub fill: StyleValue<String>,
    pub stroke: StyleValue<String>,
    pub stroke_width: StyleValue<f64>,
    pub opacity: StyleValue<f64>,
    /// Cells resolving to false are dropped.
    pub visible: StyleValue<bool>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fill: "black".into(),
            stroke: "none".into(),
            stroke_width: 1.0.into(),
            opacity: 1.0.into(),
            visible: true.into(),
        }
    }
}

impl CellStyle {
    pub fn fill(mut self, fill: impl Into<StyleValue<String>>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn stroke(mut self, stroke: impl Into<StyleValue<String>>) -> Self {
        self.stroke = stroke.into();
        self
    }

    pub fn stroke_width(mut self, width: impl Into<StyleValue<f64>>) -> Self {
        self.stroke_width = width.into();
        self
    }

    pub fn opacity(mut self, opacity: impl Into<StyleValue<f64>>) -> Self {
        self.opacity = opacity.into();
        self
    }

    pub fn visible(mut self, visible: impl Into<StyleValue<bool>>) -> Self {
        self.visible = visible.into();
        self
    }

    /// Evaluate every property for one cell.
    pub fn resolve(&self, context: &CellContext, value: Option<f64>) -> ResolvedStyle {
        ResolvedStyle {
            fill: self.fill.resolve(context, value),
            stroke: self.stroke.resolve(context, value),
            stroke_width: self.stroke_width.resolve(context, value),
            opacity: self.opacity.resolve(context, value),
            visible: self.visible.resolve(context, value),
        }
    }
}

/// Concrete style of one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub visible: bool,
}

/// A cell with its resolved style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledCell {
    pub cell: GridCell,
    pub style: ResolvedStyle,
}
