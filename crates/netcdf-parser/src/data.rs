//! Variable data extraction.
//!
//! Non-record variables are stored contiguously at their offset. Record
//! variables store one slice per record; slices of all record variables are
//! interleaved, so consecutive slices of one variable are `record_step`
//! bytes apart.

use serde::Serialize;
use tracing::debug;

use crate::cursor::ByteCursor;
use crate::error::{NetCdfError, NetCdfResult};
use crate::header::{Header, VariableInfo};
use crate::types::{read_scalar, NcType};

/// Options controlling how element values are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ReaderOptions {
    /// Expose `byte` data as integers rather than raw bytes.
    pub byte_as_integer: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            byte_as_integer: true,
        }
    }
}

/// Flat values of one variable, outermost dimension first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableData {
    /// Numeric data converted to `f64`.
    Numeric(Vec<f64>),
    /// `char` data.
    Text(String),
    /// `byte` data when byte-as-integer mode is off.
    Raw(Vec<u8>),
}

impl VariableData {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(s) => s.chars().count(),
            Self::Raw(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_numeric(self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric(v) => Some(v),
            _ => None,
        }
    }
}

/// Number of elements in one slice of `variable`: the product of its
/// non-record dimension lengths.
///
/// Declared sizes of `byte`, `char` and `short` variables are padded to a
/// multiple of 4, so the dimension product is used in preference to
/// `size / width`. The latter is the fallback when a dimension id does not
/// resolve.
pub fn slice_len(header: &Header, variable: &VariableInfo) -> usize {
    let inner = if variable.is_record {
        &variable.dimensions[1..]
    } else {
        &variable.dimensions[..]
    };

    let mut count = 1usize;
    for &id in inner {
        match header.dimensions.get(id) {
            Some(dim) if !dim.is_unlimited() => count = count.saturating_mul(dim.size as usize),
            _ => return declared_len(variable),
        }
    }
    count
}

fn declared_len(variable: &VariableInfo) -> usize {
    if variable.size == 0 {
        1
    } else {
        variable.size as usize / variable.nc_type.size()
    }
}

fn out_of_bounds(position: usize, requested: usize, length: usize) -> NetCdfError {
    NetCdfError::OutOfBounds {
        position,
        requested,
        length,
    }
}

/// Fail unless `len` bytes starting at `start` lie inside the source.
fn check_span(start: usize, len: usize, source_len: usize) -> NetCdfResult<()> {
    match start.checked_add(len) {
        Some(end) if end <= source_len => Ok(()),
        _ => Err(out_of_bounds(start, len, source_len)),
    }
}

/// Read all values of `variable` from `source`.
pub fn read_variable(
    source: &[u8],
    header: &Header,
    variable: &VariableInfo,
    options: ReaderOptions,
) -> NetCdfResult<VariableData> {
    let mut cursor = ByteCursor::new(source);
    let width = slice_len(header, variable);

    let offset = usize::try_from(variable.offset).map_err(|_| {
        NetCdfError::unsupported(format!("offset of {} exceeds address space", variable.name))
    })?;

    let element = variable.nc_type.size();
    let slice_bytes = width
        .checked_mul(element)
        .ok_or_else(|| out_of_bounds(offset, usize::MAX, source.len()))?;

    let mut sink = Sink::new(variable.nc_type, options);
    if variable.is_record {
        let records = header.record_dimension.length as usize;
        let step = header.record_dimension.record_step;
        if records > 1 && slice_bytes as u64 > step {
            return Err(NetCdfError::unsupported(format!(
                "record slice of {} ({} bytes) exceeds record step ({} bytes)",
                variable.name, slice_bytes, step
            )));
        }
        let step = usize::try_from(step).map_err(|_| {
            NetCdfError::unsupported(format!("record step of {} exceeds address space", step))
        })?;

        for index in 0..records {
            let start = index
                .checked_mul(step)
                .and_then(|p| p.checked_add(offset))
                .ok_or_else(|| out_of_bounds(offset, slice_bytes, source.len()))?;
            check_span(start, slice_bytes, source.len())?;
        }

        sink.reserve(records.saturating_mul(width).min(source.len() / element));
        for index in 0..records {
            cursor.seek(offset + index * step);
            sink.read(&mut cursor, width)?;
        }
        debug!(
            variable = %variable.name,
            records,
            slice = width,
            "Read record variable"
        );
    } else {
        check_span(offset, slice_bytes, source.len())?;
        cursor.seek(offset);
        sink.reserve(width);
        sink.read(&mut cursor, width)?;
        debug!(variable = %variable.name, elements = width, "Read variable");
    }

    Ok(sink.finish())
}

/// Accumulates elements in the representation chosen for the type.
enum Sink {
    Numeric(NcType, Vec<f64>),
    Text(Vec<u8>),
    Raw(Vec<u8>),
}

impl Sink {
    fn new(nc_type: NcType, options: ReaderOptions) -> Self {
        match nc_type {
            NcType::Char => Self::Text(Vec::new()),
            NcType::Byte if !options.byte_as_integer => Self::Raw(Vec::new()),
            other => Self::Numeric(other, Vec::new()),
        }
    }

    fn reserve(&mut self, n: usize) {
        match self {
            Self::Numeric(_, v) => v.reserve(n),
            Self::Text(b) | Self::Raw(b) => b.reserve(n),
        }
    }

    fn read(&mut self, cursor: &mut ByteCursor<'_>, n: usize) -> NetCdfResult<()> {
        match self {
            Self::Numeric(nc_type, values) => {
                for _ in 0..n {
                    values.push(read_scalar(cursor, *nc_type)?);
                }
            }
            Self::Text(bytes) | Self::Raw(bytes) => {
                bytes.extend_from_slice(cursor.read_bytes(n)?)
            }
        }
        Ok(())
    }

    fn finish(self) -> VariableData {
        match self {
            Self::Numeric(_, v) => VariableData::Numeric(v),
            Self::Text(b) => VariableData::Text(String::from_utf8_lossy(&b).into_owned()),
            Self::Raw(b) => VariableData::Raw(b),
        }
    }
}
