//! Synthetic NetCDF classic streams.
//!
//! [`NetCdfFixture`] writes a complete version 1 or version 2 file: the
//! header with computed sizes and offsets, the non-record variables one
//! after another, then the record section with one slice per record
//! variable per record. Every declared size is padded to 4 bytes, so the
//! record stride is the sum of the padded slice sizes. A lone record
//! variable is written without padding between records.
//!
//! ```
//! use test_utils::{FixtureVariable, NetCdfFixture};
//!
//! let bytes = NetCdfFixture::new()
//!     .dimension("lon", 3)
//!     .variable(FixtureVariable::new("lon", &["lon"], vec![0.0f64, 1.0, 2.0]).attribute("axis", "X"))
//!     .build();
//! assert_eq!(&bytes[..3], b"CDF");
//! ```

use netcdf_parser::ByteCursor;

const NC_DIMENSION: u32 = 10;
const NC_VARIABLE: u32 = 11;
const NC_ATTRIBUTE: u32 = 12;

/// Values of an attribute or a variable, one variant per external type.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValues {
    Byte(Vec<i8>),
    Char(String),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl FixtureValues {
    /// Header type code.
    pub fn type_code(&self) -> u32 {
        match self {
            Self::Byte(_) => 1,
            Self::Char(_) => 2,
            Self::Short(_) => 3,
            Self::Int(_) => 4,
            Self::Float(_) => 5,
            Self::Double(_) => 6,
        }
    }

    /// Width of one element in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::Byte(_) | Self::Char(_) => 1,
            Self::Short(_) => 2,
            Self::Int(_) | Self::Float(_) => 4,
            Self::Double(_) => 8,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Char(s) => s.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `count` elements starting at element `start`.
    fn write_range(&self, w: &mut ByteCursor<'static>, start: usize, count: usize) {
        let end = start + count;
        match self {
            Self::Byte(v) => v[start..end].iter().for_each(|&x| {
                w.write_i8(x);
            }),
            Self::Char(s) => {
                w.write_bytes(&s.as_bytes()[start..end]);
            }
            Self::Short(v) => v[start..end].iter().for_each(|&x| {
                w.write_i16(x);
            }),
            Self::Int(v) => v[start..end].iter().for_each(|&x| {
                w.write_i32(x);
            }),
            Self::Float(v) => v[start..end].iter().for_each(|&x| {
                w.write_f32(x);
            }),
            Self::Double(v) => v[start..end].iter().for_each(|&x| {
                w.write_f64(x);
            }),
        }
    }
}

impl From<&str> for FixtureValues {
    fn from(s: &str) -> Self {
        Self::Char(s.to_string())
    }
}

impl From<Vec<i8>> for FixtureValues {
    fn from(v: Vec<i8>) -> Self {
        Self::Byte(v)
    }
}

impl From<Vec<i16>> for FixtureValues {
    fn from(v: Vec<i16>) -> Self {
        Self::Short(v)
    }
}

impl From<Vec<i32>> for FixtureValues {
    fn from(v: Vec<i32>) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<f32>> for FixtureValues {
    fn from(v: Vec<f32>) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<f64>> for FixtureValues {
    fn from(v: Vec<f64>) -> Self {
        Self::Double(v)
    }
}

impl From<f64> for FixtureValues {
    fn from(v: f64) -> Self {
        Self::Double(vec![v])
    }
}

impl From<f32> for FixtureValues {
    fn from(v: f32) -> Self {
        Self::Float(vec![v])
    }
}

impl From<i16> for FixtureValues {
    fn from(v: i16) -> Self {
        Self::Short(vec![v])
    }
}

impl From<i32> for FixtureValues {
    fn from(v: i32) -> Self {
        Self::Int(vec![v])
    }
}

/// A variable to be written into a fixture.
///
/// Record variables hold the values of every record, record-major.
#[derive(Debug, Clone)]
pub struct FixtureVariable {
    pub name: String,
    pub dimensions: Vec<String>,
    pub attributes: Vec<(String, FixtureValues)>,
    pub data: FixtureValues,
}

impl FixtureVariable {
    pub fn new(name: &str, dimensions: &[&str], data: impl Into<FixtureValues>) -> Self {
        Self {
            name: name.to_string(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            attributes: Vec::new(),
            data: data.into(),
        }
    }

    /// Attach an attribute.
    pub fn attribute(mut self, name: &str, value: impl Into<FixtureValues>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }
}

/// Builder for a NetCDF classic byte stream.
#[derive(Debug, Clone)]
pub struct NetCdfFixture {
    version: u8,
    records: u32,
    dimensions: Vec<(String, u32)>,
    attributes: Vec<(String, FixtureValues)>,
    variables: Vec<FixtureVariable>,
}

impl Default for NetCdfFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout computed for one variable.
struct Placement {
    dim_ids: Vec<u32>,
    is_record: bool,
    slice_len: usize,
    vsize: usize,
    offset: u64,
}

impl NetCdfFixture {
    /// A classic (version 1) file with no content.
    pub fn new() -> Self {
        Self {
            version: 1,
            records: 0,
            dimensions: Vec::new(),
            attributes: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Write the 64-bit offset (version 2) variant.
    pub fn offset64(mut self) -> Self {
        self.version = 2;
        self
    }

    /// Add a fixed-size dimension.
    pub fn dimension(mut self, name: &str, size: u32) -> Self {
        self.dimensions.push((name.to_string(), size));
        self
    }

    /// Add the unlimited dimension holding `records` records.
    pub fn unlimited(mut self, name: &str, records: u32) -> Self {
        self.dimensions.push((name.to_string(), 0));
        self.records = records;
        self
    }

    /// Add a global attribute.
    pub fn attribute(mut self, name: &str, value: impl Into<FixtureValues>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }

    pub fn variable(mut self, variable: FixtureVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Number of records written for record variables.
    pub fn records(&self) -> u32 {
        self.records
    }

    /// Sum of the padded slice sizes of all record variables, or the
    /// unpadded slice size when there is only one.
    pub fn record_step(&self) -> u64 {
        let placements = self.placements();
        let records: Vec<(&FixtureVariable, &Placement)> = self
            .variables
            .iter()
            .zip(&placements)
            .filter(|(_, p)| p.is_record)
            .collect();
        match records[..] {
            [(variable, p)] => (p.slice_len * variable.data.width()) as u64,
            _ => records.iter().map(|(_, p)| p.vsize as u64).sum(),
        }
    }

    /// Write the stream.
    ///
    /// # Panics
    ///
    /// If a variable names an unknown dimension or holds the wrong number
    /// of values.
    pub fn build(&self) -> Vec<u8> {
        let mut placements = self.placements();

        // Offsets depend on the header length, which does not depend on the
        // offset values.
        let header_len = self.write_header(&placements).len();

        let mut position = header_len as u64;
        for p in placements.iter_mut().filter(|p| !p.is_record) {
            p.offset = position;
            position += p.vsize as u64;
        }
        for p in placements.iter_mut().filter(|p| p.is_record) {
            p.offset = position;
            position += p.vsize as u64;
        }

        let mut w = ByteCursor::with_capacity(position as usize + 64);
        w.write_bytes(&self.write_header(&placements));

        for (variable, p) in self.variables.iter().zip(&placements) {
            if p.is_record {
                continue;
            }
            assert_eq!(
                variable.data.len(),
                p.slice_len,
                "variable {} holds the wrong number of values",
                variable.name
            );
            variable.data.write_range(&mut w, 0, p.slice_len);
            pad(&mut w, p.vsize - p.slice_len * variable.data.width());
        }

        let lone_record = placements.iter().filter(|p| p.is_record).count() == 1;
        for record in 0..self.records as usize {
            for (variable, p) in self.variables.iter().zip(&placements) {
                if !p.is_record {
                    continue;
                }
                assert_eq!(
                    variable.data.len(),
                    p.slice_len * self.records as usize,
                    "record variable {} holds the wrong number of values",
                    variable.name
                );
                variable
                    .data
                    .write_range(&mut w, record * p.slice_len, p.slice_len);
                if !lone_record {
                    pad(&mut w, p.vsize - p.slice_len * variable.data.width());
                }
            }
        }

        w.into_vec()
    }

    fn placements(&self) -> Vec<Placement> {
        let record_id = self.dimensions.iter().position(|(_, size)| *size == 0);

        self.variables
            .iter()
            .map(|variable| {
                let dim_ids: Vec<usize> = variable
                    .dimensions
                    .iter()
                    .map(|name| {
                        self.dimensions
                            .iter()
                            .position(|(n, _)| n == name)
                            .unwrap_or_else(|| panic!("unknown dimension {}", name))
                    })
                    .collect();
                let is_record = record_id.is_some() && dim_ids.first().copied() == record_id;
                let slice_len: usize = dim_ids
                    .iter()
                    .filter(|&&id| Some(id) != record_id)
                    .map(|&id| self.dimensions[id].1 as usize)
                    .product();
                let bytes = slice_len * variable.data.width();
                Placement {
                    dim_ids: dim_ids.iter().map(|&id| id as u32).collect(),
                    is_record,
                    slice_len,
                    vsize: bytes + padding(bytes),
                    offset: 0,
                }
            })
            .collect()
    }

    fn write_header(&self, placements: &[Placement]) -> Vec<u8> {
        let mut w = ByteCursor::with_capacity(256);
        w.write_chars("CDF").write_u8(self.version).write_u32(self.records);

        if self.dimensions.is_empty() {
            w.write_u32(0).write_u32(0);
        } else {
            w.write_u32(NC_DIMENSION)
                .write_u32(self.dimensions.len() as u32);
            for (name, size) in &self.dimensions {
                write_name(&mut w, name);
                w.write_u32(*size);
            }
        }

        write_attributes(&mut w, &self.attributes);

        if self.variables.is_empty() {
            w.write_u32(0).write_u32(0);
        } else {
            w.write_u32(NC_VARIABLE)
                .write_u32(self.variables.len() as u32);
            for (variable, p) in self.variables.iter().zip(placements) {
                write_name(&mut w, &variable.name);
                w.write_u32(p.dim_ids.len() as u32);
                for &id in &p.dim_ids {
                    w.write_u32(id);
                }
                write_attributes(&mut w, &variable.attributes);
                w.write_u32(variable.data.type_code())
                    .write_u32(p.vsize as u32);
                if self.version == 2 {
                    w.write_u32((p.offset >> 32) as u32);
                }
                w.write_u32(p.offset as u32);
            }
        }

        w.into_vec()
    }
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn pad(w: &mut ByteCursor<'static>, n: usize) {
    for _ in 0..n {
        w.write_u8(0);
    }
}

fn write_name(w: &mut ByteCursor<'static>, name: &str) {
    w.write_u32(name.len() as u32).write_chars(name);
    pad(w, padding(name.len()));
}

fn write_attributes(w: &mut ByteCursor<'static>, attributes: &[(String, FixtureValues)]) {
    if attributes.is_empty() {
        w.write_u32(0).write_u32(0);
        return;
    }
    w.write_u32(NC_ATTRIBUTE).write_u32(attributes.len() as u32);
    for (name, value) in attributes {
        write_name(w, name);
        w.write_u32(value.type_code()).write_u32(value.len() as u32);
        value.write_range(w, 0, value.len());
        pad(w, padding(value.len() * value.width()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fixture_layout() {
        let bytes = NetCdfFixture::new().build();
        // magic + version + numrecs + three absent lists
        assert_eq!(bytes.len(), 4 + 4 + 3 * 8);
        assert_eq!(&bytes[..4], b"CDF\x01");
    }

    #[test]
    fn test_offset64_version_byte() {
        let bytes = NetCdfFixture::new().offset64().build();
        assert_eq!(bytes[3], 2);
    }

    #[test]
    fn test_short_data_is_padded() {
        let bytes = NetCdfFixture::new()
            .dimension("x", 3)
            .variable(FixtureVariable::new("v", &["x"], vec![1i16, 2, 3]))
            .build();
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn test_record_step() {
        let fixture = NetCdfFixture::new()
            .unlimited("time", 2)
            .dimension("x", 3)
            .variable(FixtureVariable::new("t", &["time"], vec![0.0f64, 1.0]))
            .variable(FixtureVariable::new("v", &["time", "x"], vec![1i16; 6]))
            .variable(FixtureVariable::new("f", &["x"], vec![0.5f32; 3]));
        // 8 (double) + 8 (3 shorts padded) ; the fixed variable is excluded
        assert_eq!(fixture.record_step(), 16);
    }

    #[test]
    fn test_lone_record_variable_is_unpadded() {
        let fixture = NetCdfFixture::new()
            .unlimited("time", 3)
            .dimension("x", 3)
            .variable(FixtureVariable::new("v", &["time", "x"], vec![1i16; 9]));
        assert_eq!(fixture.record_step(), 6);
        // Three 6-byte slices after a header of whole words
        assert_eq!(fixture.build().len() % 4, 2);
    }

    #[test]
    #[should_panic(expected = "unknown dimension")]
    fn test_unknown_dimension_panics() {
        NetCdfFixture::new()
            .variable(FixtureVariable::new("v", &["nope"], vec![1.0f64]))
            .build();
    }
}
