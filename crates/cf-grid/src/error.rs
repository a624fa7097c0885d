//! Error types for grid queries.

use netcdf_parser::NetCdfError;
use thiserror::Error;

use crate::types::Axis;

/// Errors that can occur while building or querying a CF dataset.
///
/// Query errors leave the dataset and its caches untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Decoding or reading the underlying file failed.
    #[error(transparent)]
    NetCdf(#[from] NetCdfError),

    /// No variable is bound to a required axis.
    #[error("\"{0}\" not found in axes. Set X and Y manually if required; perhaps \"axis\" = \"{0}\" is missing from the attribute data")]
    AxisNotResolved(Axis),

    /// The axis variable has no dimension in the header.
    #[error("\"{axis}\" dimension {name} not found in NetCDF dimensions")]
    AxisDimensionMissing { axis: Axis, name: String },

    /// No variable with the given name.
    #[error("data variable {0} not found in NetCDF variables")]
    VariableNotFound(String),

    /// The variable does not span an axis dimension.
    #[error("\"{axis}\" axis \"{dimension}\" not found as a dimension of {variable}")]
    AxisNotInVariable {
        axis: Axis,
        dimension: String,
        variable: String,
    },

    /// X and Y are not the two trailing dimensions.
    #[error("unable to read interlaced data; \"X\" and \"Y\" must be the final dimensions of data variable \"{0}\"")]
    Interlaced(String),

    /// A dimension id does not resolve to a header dimension.
    #[error("data variable {0} contains undefined dimensions")]
    UndefinedDimension(String),

    /// A dimension has an empty name.
    #[error("data variable {0} contains unnamed dimensions")]
    UnnamedDimension(String),

    /// A non-spatial dimension has no coordinate variable.
    #[error("data variable {variable} contains undefined dimension variable: {dimension}")]
    UndefinedDimensionVariable { variable: String, dimension: String },

    /// The filter value is not a coordinate of its dimension.
    #[error("dimension filter value {value} not found in the values of {dimension}")]
    FilterValueNotFound { dimension: String, value: f64 },

    /// A non-spatial dimension was left unselected.
    #[error("unbound dimension \"{0}\"; set it to a valid value in the dimension filter")]
    UnboundDimension(String),

    /// The variable holds text or raw bytes.
    #[error("variable {0} is not numeric")]
    NotNumeric(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound(name.into())
    }

    /// Create a NotNumeric error.
    pub fn not_numeric(name: impl Into<String>) -> Self {
        Self::NotNumeric(name.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised by query validation rather than decoding.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::NetCdf(_) | Self::Config(_))
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
