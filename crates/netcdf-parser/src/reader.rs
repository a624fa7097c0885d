//! The decoded dataset: header plus the byte source it describes.

use std::fmt;

use bytes::Bytes;
use tracing::info;

use crate::cursor::ByteCursor;
use crate::data::{read_variable, ReaderOptions, VariableData};
use crate::error::{NetCdfError, NetCdfResult};
use crate::header::{
    parse_header, Attribute, AttributeValue, Dimension, FormatVersion, Header, RecordDimension,
    VariableInfo,
};

/// Reader over an in-memory NetCDF classic or 64-bit offset file.
///
/// The header is decoded once in [`NetCdfReader::new`]; a stream that fails
/// to decode never produces a reader. Variable data is decoded on demand.
#[derive(Debug, Clone)]
pub struct NetCdfReader {
    header: Header,
    source: Bytes,
    options: ReaderOptions,
}

impl NetCdfReader {
    /// Decode the header of `source` with default options.
    pub fn new(source: impl Into<Bytes>) -> NetCdfResult<Self> {
        Self::with_options(source, ReaderOptions::default())
    }

    /// Decode the header of `source`.
    pub fn with_options(source: impl Into<Bytes>, options: ReaderOptions) -> NetCdfResult<Self> {
        let source = source.into();
        let header = parse_header(&mut ByteCursor::new(&source))?;

        info!(
            format = header.version.name(),
            bytes = source.len(),
            variables = header.variables.len(),
            "Opened NetCDF dataset"
        );

        Ok(Self {
            header,
            source,
            options,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// The underlying bytes.
    pub fn source(&self) -> &Bytes {
        &self.source
    }

    pub fn version(&self) -> FormatVersion {
        self.header.version
    }

    pub fn record_dimension(&self) -> &RecordDimension {
        &self.header.record_dimension
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.header.dimensions
    }

    pub fn global_attributes(&self) -> &[Attribute] {
        &self.header.global_attributes
    }

    pub fn variables(&self) -> &[VariableInfo] {
        &self.header.variables
    }

    /// Value of a global attribute.
    pub fn global_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.header
            .global_attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    pub fn has_global_attribute(&self, name: &str) -> bool {
        self.global_attribute(name).is_some()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.header.variables.iter().any(|v| v.name == name)
    }

    /// Metadata of a variable.
    pub fn variable(&self, name: &str) -> NetCdfResult<&VariableInfo> {
        self.header
            .variables
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| NetCdfError::VariableNotFound(name.to_string()))
    }

    /// Length of a dimension; the record dimension reports the record count.
    pub fn dimension_len(&self, id: usize) -> Option<usize> {
        self.header.dimensions.get(id).map(|d| {
            if d.is_unlimited() {
                self.header.record_dimension.length as usize
            } else {
                d.size as usize
            }
        })
    }

    /// Read the values of a variable by name.
    pub fn read_variable(&self, name: &str) -> NetCdfResult<VariableData> {
        let variable = self.variable(name)?;
        self.read(variable)
    }

    /// Read the values of a variable.
    pub fn read(&self, variable: &VariableInfo) -> NetCdfResult<VariableData> {
        read_variable(&self.source, &self.header, variable, self.options)
    }

    /// Read a variable and join its values into one string.
    pub fn read_variable_as_string(&self, name: &str) -> NetCdfResult<String> {
        Ok(match self.read_variable(name)? {
            VariableData::Text(s) => s,
            VariableData::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
            VariableData::Raw(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

const NAME_WIDTH: usize = 30;
const VALUE_PREVIEW: usize = 50;

impl fmt::Display for NetCdfReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DIMENSIONS")?;
        for dim in self.dimensions() {
            writeln!(f, "  {:<NAME_WIDTH$} = size: {}", dim.name, dim.size)?;
        }

        writeln!(f)?;
        writeln!(f, "GLOBAL ATTRIBUTES")?;
        for attr in self.global_attributes() {
            writeln!(f, "  {:<NAME_WIDTH$} = {}", attr.name, attr.value)?;
        }

        writeln!(f)?;
        writeln!(f, "VARIABLES:")?;
        for variable in self.variables() {
            let preview = match self.read(variable) {
                Ok(data) => {
                    let json = serde_json::to_string(&data).unwrap_or_default();
                    let mut preview: String = json.chars().take(VALUE_PREVIEW).collect();
                    if !matches!(data, VariableData::Text(_)) {
                        preview.push_str(&format!(" (length: {})", data.len()));
                    }
                    preview
                }
                Err(e) => format!("<{}>", e),
            };
            writeln!(f, "  {:<NAME_WIDTH$} = {}", variable.name, preview)?;
        }
        Ok(())
    }
}
