//! NetCDF classic header decoding.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! header    = magic numrecs dim_list gatt_list var_list
//! magic     = 'C' 'D' 'F' version          version = 1 | 2
//! dim_list  = ABSENT | NC_DIMENSION nelems [dim ...]
//! gatt_list = ABSENT | NC_ATTRIBUTE nelems [attr ...]
//! var_list  = ABSENT | NC_VARIABLE  nelems [var ...]
//! ABSENT    = ZERO ZERO
//! ```
//!
//! The three lists share the tag/count framing, so they are all read by
//! [`read_list`] with a per-element decoder.

use serde::Serialize;
use tracing::debug;

use crate::cursor::ByteCursor;
use crate::error::{NetCdfError, NetCdfResult};
use crate::types::{
    apply_padding, read_name, read_scalars, trim_null, NcType, NC_ATTRIBUTE, NC_DIMENSION,
    NC_VARIABLE, STREAMING, ZERO,
};

const MAGIC: &str = "CDF";

/// File format variant, from the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    /// Version 1: 32-bit offsets.
    Classic,
    /// Version 2: 64-bit offsets.
    Offset64,
}

impl FormatVersion {
    fn from_byte(byte: u8) -> NetCdfResult<Self> {
        match byte {
            1 => Ok(Self::Classic),
            2 => Ok(Self::Offset64),
            other => Err(NetCdfError::invalid_format(format!(
                "unknown version {}",
                other
            ))),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Classic => 1,
            Self::Offset64 => 2,
        }
    }

    /// Human readable name of the format.
    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic format",
            Self::Offset64 => "64-bit offset format",
        }
    }
}

/// A named dimension. Size 0 marks the unlimited (record) dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub name: String,
    pub size: u32,
}

impl Dimension {
    pub fn is_unlimited(&self) -> bool {
        self.size == 0
    }
}

/// The record dimension and the layout of record data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordDimension {
    /// Number of records.
    pub length: u32,
    /// Index of the unlimited dimension, if any.
    pub id: Option<usize>,
    /// Name of the unlimited dimension, if any.
    pub name: Option<String>,
    /// Bytes between the starts of consecutive records: the sum of the
    /// declared sizes of all record variables.
    ///
    /// A file with exactly one record variable stores its slices without
    /// padding, so the step is the unpadded slice size. This matters for a
    /// single `byte`, `char` or `short` record variable whose slice is not
    /// a multiple of 4 bytes.
    pub record_step: u64,
}

/// Decoded attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// `char` attribute with one trailing NUL removed.
    Text(String),
    /// Numeric attribute with exactly one element.
    Number(f64),
    /// Numeric attribute with zero or several elements.
    Numbers(Vec<f64>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// First numeric element.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Numbers(v) => v.first().copied(),
            Self::Text(_) => None,
        }
    }

    /// All numeric elements (empty for text).
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::Number(v) => vec![*v],
            Self::Numbers(v) => v.clone(),
            Self::Text(_) => Vec::new(),
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(v) => write!(f, "{}", v),
            Self::Numbers(v) => {
                let parts: Vec<String> = v.iter().map(|n| n.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

/// A named, typed attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub nc_type: NcType,
    pub value: AttributeValue,
}

/// Variable metadata from the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    /// Dimension ids, outermost first.
    pub dimensions: Vec<usize>,
    pub attributes: Vec<Attribute>,
    #[serde(rename = "type")]
    pub nc_type: NcType,
    /// Declared size in bytes (of one record slice for record variables).
    pub size: u32,
    /// Offset of the data (of the first record slice for record variables).
    pub offset: u64,
    /// True if the outermost dimension is the record dimension.
    pub is_record: bool,
}

impl VariableInfo {
    /// First attribute with exactly this name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// First attribute whose name matches ignoring ASCII case.
    pub fn attribute_ignore_case(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// The decoded header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub version: FormatVersion,
    pub record_dimension: RecordDimension,
    pub dimensions: Vec<Dimension>,
    pub global_attributes: Vec<Attribute>,
    pub variables: Vec<VariableInfo>,
}

/// Parse the header from the start of a NetCDF stream.
pub fn parse_header(cursor: &mut ByteCursor<'_>) -> NetCdfResult<Header> {
    let magic = cursor
        .read_chars(3)
        .map_err(|_| NetCdfError::invalid_format("should start with CDF"))?;
    if magic != MAGIC {
        return Err(NetCdfError::invalid_format("should start with CDF"));
    }
    let version = FormatVersion::from_byte(cursor.read_u8()?)?;

    let numrecs = cursor.read_u32()?;
    if numrecs == STREAMING {
        return Err(NetCdfError::unsupported(
            "streaming record count (numrecs = STREAMING)",
        ));
    }

    let dimensions = read_list(cursor, NC_DIMENSION, "dimensions", |c, _| read_dimension(c))?;
    let record_id = find_record_dimension(&dimensions)?;

    let global_attributes = read_attributes(cursor)?;

    let variables = read_list(cursor, NC_VARIABLE, "variables", |c, _| {
        read_variable(c, version, record_id)
    })?;
    let record_step = record_step(&dimensions, &variables);

    debug!(
        version = version.name(),
        dimensions = dimensions.len(),
        global_attributes = global_attributes.len(),
        variables = variables.len(),
        records = numrecs,
        record_step,
        "Parsed NetCDF header"
    );

    Ok(Header {
        version,
        record_dimension: RecordDimension {
            length: numrecs,
            id: record_id,
            name: record_id.map(|id| dimensions[id].name.clone()),
            record_step,
        },
        dimensions,
        global_attributes,
        variables,
    })
}

/// Distance between consecutive records of the record section.
fn record_step(dimensions: &[Dimension], variables: &[VariableInfo]) -> u64 {
    let mut records = variables.iter().filter(|v| v.is_record);
    match (records.next(), records.next()) {
        (Some(only), None) => unpadded_slice(dimensions, only).unwrap_or(only.size as u64),
        _ => variables
            .iter()
            .filter(|v| v.is_record)
            .map(|v| v.size as u64)
            .sum(),
    }
}

fn unpadded_slice(dimensions: &[Dimension], variable: &VariableInfo) -> Option<u64> {
    variable.dimensions[1..]
        .iter()
        .try_fold(variable.nc_type.size() as u64, |bytes, &id| {
            let dim = dimensions.get(id)?;
            bytes.checked_mul(dim.size as u64)
        })
}

/// Read a tag/count framed list, decoding each element with `element`.
///
/// A `ZERO` tag must be followed by a `ZERO` count. Any other tag must
/// equal `tag`.
pub fn read_list<'a, T, F>(
    cursor: &mut ByteCursor<'a>,
    tag: u32,
    what: &str,
    mut element: F,
) -> NetCdfResult<Vec<T>>
where
    F: FnMut(&mut ByteCursor<'a>, usize) -> NetCdfResult<T>,
{
    let found = cursor.read_u32()?;
    if found == ZERO {
        if cursor.read_u32()? != ZERO {
            return Err(NetCdfError::invalid_format(format!(
                "wrong empty tag for list of {}",
                what
            )));
        }
        return Ok(Vec::new());
    }
    if found != tag {
        return Err(NetCdfError::invalid_format(format!(
            "wrong tag for list of {}",
            what
        )));
    }

    let count = cursor.read_u32()? as usize;
    // Each element takes at least 8 bytes; cap the reservation so a corrupt
    // count cannot request a huge allocation up front.
    let mut items = Vec::with_capacity(count.min(cursor.remaining() / 8 + 1));
    for index in 0..count {
        items.push(element(cursor, index)?);
    }
    Ok(items)
}

fn read_dimension(cursor: &mut ByteCursor<'_>) -> NetCdfResult<Dimension> {
    let name = read_name(cursor)?;
    let size = cursor.read_u32()?;
    Ok(Dimension { name, size })
}

fn find_record_dimension(dimensions: &[Dimension]) -> NetCdfResult<Option<usize>> {
    let mut unlimited = dimensions
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_unlimited())
        .map(|(i, _)| i);
    let first = unlimited.next();
    if unlimited.next().is_some() {
        return Err(NetCdfError::invalid_format(
            "more than one unlimited dimension",
        ));
    }
    Ok(first)
}

/// Read an attribute list (global or per-variable).
pub fn read_attributes(cursor: &mut ByteCursor<'_>) -> NetCdfResult<Vec<Attribute>> {
    read_list(cursor, NC_ATTRIBUTE, "attributes", |c, _| read_attribute(c))
}

fn read_attribute(cursor: &mut ByteCursor<'_>) -> NetCdfResult<Attribute> {
    let name = read_name(cursor)?;
    let nc_type = NcType::from_code(cursor.read_u32()?)?;
    let count = cursor.read_u32()? as usize;

    let value = match nc_type {
        NcType::Char => AttributeValue::Text(trim_null(cursor.read_chars(count)?)),
        _ => {
            let mut values = read_scalars(cursor, nc_type, count)?;
            if values.len() == 1 {
                AttributeValue::Number(values.remove(0))
            } else {
                AttributeValue::Numbers(values)
            }
        }
    };
    apply_padding(cursor);

    Ok(Attribute {
        name,
        nc_type,
        value,
    })
}

fn read_variable(
    cursor: &mut ByteCursor<'_>,
    version: FormatVersion,
    record_id: Option<usize>,
) -> NetCdfResult<VariableInfo> {
    let name = read_name(cursor)?;

    let rank = cursor.read_u32()? as usize;
    let mut dimensions = Vec::with_capacity(rank.min(cursor.remaining() / 4));
    for _ in 0..rank {
        dimensions.push(cursor.read_u32()? as usize);
    }

    let attributes = read_attributes(cursor)?;
    let nc_type = NcType::from_code(cursor.read_u32()?)?;
    let size = cursor.read_u32()?;

    let offset = match version {
        FormatVersion::Classic => cursor.read_u32()? as u64,
        FormatVersion::Offset64 => {
            let high = cursor.read_u32()?;
            if high > 0 {
                return Err(NetCdfError::unsupported(format!(
                    "offsets larger than 4GB not supported (variable {})",
                    name
                )));
            }
            cursor.read_u32()? as u64
        }
    };

    let is_record = record_id.is_some() && dimensions.first().copied() == record_id;

    Ok(VariableInfo {
        name,
        dimensions,
        attributes,
        nc_type,
        size,
        offset,
        is_record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_name(w: &mut ByteCursor<'static>, name: &str) {
        w.write_u32(name.len() as u32).write_chars(name);
        for _ in 0..crate::types::padding_for(name.len()) {
            w.write_u8(0);
        }
    }

    /// CDF1 header: dims (x=2, time=UNLIMITED), one global attr, no variables.
    fn minimal_header() -> Vec<u8> {
        let mut w = ByteCursor::with_capacity(64);
        w.write_chars("CDF").write_u8(1).write_u32(3);
        w.write_u32(NC_DIMENSION).write_u32(2);
        write_name(&mut w, "x");
        w.write_u32(2);
        write_name(&mut w, "time");
        w.write_u32(0);
        w.write_u32(NC_ATTRIBUTE).write_u32(1);
        write_name(&mut w, "title");
        w.write_u32(2).write_u32(5).write_chars("grid\0");
        w.write_bytes(&[0, 0, 0]);
        w.write_u32(ZERO).write_u32(ZERO);
        w.into_vec()
    }

    #[test]
    fn test_parse_minimal_header() {
        let bytes = minimal_header();
        let mut cursor = ByteCursor::new(&bytes);
        let header = parse_header(&mut cursor).unwrap();

        assert_eq!(header.version, FormatVersion::Classic);
        assert_eq!(header.dimensions.len(), 2);
        assert_eq!(header.record_dimension.length, 3);
        assert_eq!(header.record_dimension.id, Some(1));
        assert_eq!(header.record_dimension.name.as_deref(), Some("time"));
        assert_eq!(header.global_attributes[0].name, "title");
        assert_eq!(
            header.global_attributes[0].value,
            AttributeValue::Text("grid".to_string())
        );
        assert!(header.variables.is_empty());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = minimal_header();
        bytes[0] = b'H';
        let err = parse_header(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidFormat(ref m) if m.contains("CDF")));
    }

    #[test]
    fn test_bad_version() {
        for version in [0u8, 3, 5] {
            let mut bytes = minimal_header();
            bytes[3] = version;
            let err = parse_header(&mut ByteCursor::new(&bytes)).unwrap_err();
            assert!(matches!(err, NetCdfError::InvalidFormat(ref m) if m.contains("version")));
        }
    }

    #[test]
    fn test_streaming_record_count_rejected() {
        let mut bytes = minimal_header();
        bytes[4..8].copy_from_slice(&STREAMING.to_be_bytes());
        let err = parse_header(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, NetCdfError::Unsupported(_)));
    }

    #[test]
    fn test_wrong_list_tag() {
        let mut bytes = minimal_header();
        // dimension list tag lives right after magic + numrecs
        bytes[8..12].copy_from_slice(&NC_VARIABLE.to_be_bytes());
        let err = parse_header(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert_eq!(
            err,
            NetCdfError::InvalidFormat("wrong tag for list of dimensions".to_string())
        );
    }

    #[test]
    fn test_absent_list_requires_zero_count() {
        let mut w = ByteCursor::with_capacity(8);
        w.write_u32(ZERO).write_u32(1);
        let bytes = w.into_vec();
        let err = read_list(&mut ByteCursor::new(&bytes), NC_DIMENSION, "dimensions", |c, _| {
            read_dimension(c)
        })
        .unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidFormat(ref m) if m.contains("empty tag")));
    }

    #[test]
    fn test_two_unlimited_dimensions_rejected() {
        let dims = vec![
            Dimension { name: "a".into(), size: 0 },
            Dimension { name: "b".into(), size: 0 },
        ];
        assert!(find_record_dimension(&dims).is_err());
    }

    #[test]
    fn test_invalid_attribute_type() {
        let mut w = ByteCursor::with_capacity(32);
        w.write_u32(NC_ATTRIBUTE).write_u32(1);
        write_name(&mut w, "units");
        w.write_u32(9).write_u32(1);
        let bytes = w.into_vec();
        let err = read_attributes(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert_eq!(err, NetCdfError::InvalidFormat("non valid type 9".to_string()));
    }

    #[test]
    fn test_attribute_value_accessors() {
        let number = AttributeValue::Number(2.5);
        assert_eq!(number.as_f64(), Some(2.5));
        assert_eq!(number.to_f64_vec(), vec![2.5]);
        let numbers = AttributeValue::Numbers(vec![-1.0, -2.0]);
        assert_eq!(numbers.as_f64(), Some(-1.0));
        assert_eq!(numbers.to_string(), "-1,-2");
        let text = AttributeValue::Text("X".into());
        assert_eq!(text.as_text(), Some("X"));
        assert_eq!(text.as_f64(), None);
    }
}
