//! CF unpacking: fill masking, then `scale_factor`, then `add_offset`.

use netcdf_parser::{AttributeValue, NetCdfReader, VariableData, VariableInfo};

use crate::error::{GridError, Result};

/// Read the values of a numeric variable.
pub fn read_numeric(reader: &NetCdfReader, name: &str) -> Result<Vec<f64>> {
    let variable = reader
        .variable(name)
        .map_err(|_| GridError::variable_not_found(name))?;
    match reader.read(variable)? {
        VariableData::Numeric(values) => Ok(values),
        VariableData::Text(_) | VariableData::Raw(_) => Err(GridError::not_numeric(name)),
    }
}

/// Unpacking parameters read from a variable's attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cleanser {
    /// Values treated as "no data".
    pub fill: Vec<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

impl Cleanser {
    /// Read the parameters of `variable`.
    ///
    /// The first of `_FillValue` / `missing_value` in attribute order is
    /// used; every element of a vector-valued fill is masked.
    pub fn from_variable(variable: &VariableInfo) -> Self {
        let fill = variable
            .attributes
            .iter()
            .find(|a| a.name == "_FillValue" || a.name == "missing_value")
            .map(|a| a.value.to_f64_vec())
            .unwrap_or_default();

        let first = |name: &str| {
            variable
                .attribute(name)
                .map(|a| &a.value)
                .and_then(AttributeValue::as_f64)
        };

        Self {
            fill,
            scale_factor: first("scale_factor"),
            add_offset: first("add_offset"),
        }
    }

    fn is_fill(&self, value: f64) -> bool {
        self.fill
            .iter()
            .any(|&f| f == value || (f.is_nan() && value.is_nan()))
    }

    /// Cleanse one raw value.
    pub fn apply(&self, raw: f64) -> Option<f64> {
        if self.is_fill(raw) {
            return None;
        }
        let mut value = raw;
        if let Some(scale) = self.scale_factor {
            value *= scale;
        }
        if let Some(offset) = self.add_offset {
            value += offset;
        }
        Some(value)
    }

    /// Cleanse a whole sequence.
    pub fn cleanse(&self, raw: &[f64]) -> Vec<Option<f64>> {
        raw.iter().map(|&v| self.apply(v)).collect()
    }
}
