//! NetCDF external types and the primitive decoders built on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cursor::ByteCursor;
use crate::error::{NetCdfError, NetCdfResult};

/// Tag of a dimension list.
pub const NC_DIMENSION: u32 = 10;
/// Tag of a variable list.
pub const NC_VARIABLE: u32 = 11;
/// Tag of an attribute list.
pub const NC_ATTRIBUTE: u32 = 12;
/// Tag (and count) of an absent list.
pub const ZERO: u32 = 0;
/// Record count written by streaming producers that never knew it.
pub const STREAMING: u32 = 0xFFFF_FFFF;

/// External data types of the classic format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl NcType {
    /// Decode a type code (1..=6).
    pub fn from_code(code: u32) -> NetCdfResult<Self> {
        match code {
            1 => Ok(Self::Byte),
            2 => Ok(Self::Char),
            3 => Ok(Self::Short),
            4 => Ok(Self::Int),
            5 => Ok(Self::Float),
            6 => Ok(Self::Double),
            _ => Err(NetCdfError::invalid_format(format!(
                "non valid type {}",
                code
            ))),
        }
    }

    /// The type code used in the header.
    pub fn code(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Char => 2,
            Self::Short => 3,
            Self::Int => 4,
            Self::Float => 5,
            Self::Double => 6,
        }
    }

    /// Width of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::Char => 1,
            Self::Short => 2,
            Self::Int | Self::Float => 4,
            Self::Double => 8,
        }
    }

    /// CDL name of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Parse a CDL type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "byte" => Some(Self::Byte),
            "char" => Some(Self::Char),
            "short" => Some(Self::Short),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            _ => None,
        }
    }

    /// True for every type except `char`.
    pub fn is_numeric(self) -> bool {
        self != Self::Char
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Advance the cursor to the next 4-byte boundary.
pub fn apply_padding(cursor: &mut ByteCursor<'_>) {
    let rem = cursor.position() % 4;
    if rem != 0 {
        cursor.skip(4 - rem);
    }
}

/// Number of bytes needed to pad `len` to a multiple of 4.
pub fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Drop one trailing NUL, if present.
pub fn trim_null(mut value: String) -> String {
    if value.ends_with('\0') {
        value.pop();
    }
    value
}

/// Read a length-prefixed name and skip its padding.
pub fn read_name(cursor: &mut ByteCursor<'_>) -> NetCdfResult<String> {
    let len = cursor.read_u32()? as usize;
    let name = cursor.read_chars(len)?;
    apply_padding(cursor);
    Ok(name)
}

/// Read one numeric element of `nc_type` as `f64`.
///
/// `char` elements decode to their character code.
pub fn read_scalar(cursor: &mut ByteCursor<'_>, nc_type: NcType) -> NetCdfResult<f64> {
    Ok(match nc_type {
        NcType::Byte => cursor.read_i8()? as f64,
        NcType::Char => cursor.read_u8()? as f64,
        NcType::Short => cursor.read_i16()? as f64,
        NcType::Int => cursor.read_i32()? as f64,
        NcType::Float => cursor.read_f32()? as f64,
        NcType::Double => cursor.read_f64()?,
    })
}

/// Read `count` numeric elements of `nc_type`.
pub fn read_scalars(
    cursor: &mut ByteCursor<'_>,
    nc_type: NcType,
    count: usize,
) -> NetCdfResult<Vec<f64>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_scalar(cursor, nc_type)?);
    }
    Ok(values)
}
