//! Error types for NetCDF parsing operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetCdfError {
    /// A read ran past the end of the byte region
    #[error("read of {requested} bytes at position {position} is out of bounds (length {length})")]
    OutOfBounds {
        position: usize,
        requested: usize,
        length: usize,
    },

    /// Cursor operation not valid in the current state
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The stream violates the classic format grammar
    #[error("Not a valid NetCDF v3.x file: {0}")]
    InvalidFormat(String),

    /// Valid stream that uses a feature this reader does not handle
    #[error("unsupported NetCDF feature: {0}")]
    Unsupported(String),

    /// No variable with the given name
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// No attribute with the given name
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),
}

impl NetCdfError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create an IllegalState error.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// True for errors raised while decoding the file structure.
    pub fn is_format_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_) | Self::Unsupported(_) | Self::OutOfBounds { .. }
        )
    }
}
