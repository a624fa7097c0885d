//! NetCDF classic format reader.
//!
//! Decodes NetCDF version 1 (classic) and version 2 (64-bit offset) files
//! held in memory. No native libraries are involved: the header grammar and
//! the record layout are decoded directly from the bytes.
//!
//! # Structure
//!
//! - [`cursor`]: seekable big-endian byte cursor
//! - [`types`]: external types and primitive decoders
//! - [`header`]: header grammar (dimensions, attributes, variables)
//! - [`data`]: variable data extraction, record interleaving included
//! - [`reader`]: [`NetCdfReader`], the entry point
//!
//! # Example
//!
//! ```no_run
//! use netcdf_parser::NetCdfReader;
//!
//! let bytes = std::fs::read("sst.nc").unwrap();
//! let reader = NetCdfReader::new(bytes).unwrap();
//! for variable in reader.variables() {
//!     println!("{} {:?}", variable.name, variable.dimensions);
//! }
//! let sst = reader.read_variable("sst").unwrap();
//! ```

pub mod cursor;
pub mod data;
pub mod error;
pub mod header;
pub mod reader;
pub mod types;

pub use cursor::{ByteCursor, Endianness};
pub use data::{read_variable, slice_len, ReaderOptions, VariableData};
pub use error::{NetCdfError, NetCdfResult};
pub use header::{
    parse_header, Attribute, AttributeValue, Dimension, FormatVersion, Header, RecordDimension,
    VariableInfo,
};
pub use reader::NetCdfReader;
pub use types::NcType;
