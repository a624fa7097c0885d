//! Axis discovery from CF attributes.
//!
//! Rules are tried in priority order. Each rule is checked against every
//! candidate variable before the next rule is tried, so an `axis` attribute
//! on a later variable beats a `standard_name` on an earlier one. Only
//! one-dimensional variables are candidates.

use netcdf_parser::{Attribute, VariableInfo};
use tracing::{debug, info, warn};

use crate::types::{Axis, AxisBinding};

/// One attribute convention for tagging an axis variable.
#[derive(Debug, Clone, Copy)]
pub struct AxisRule {
    /// Name reported when the rule matches.
    pub name: &'static str,
    pub matches: fn(&Attribute, Axis) -> bool,
}

/// The rules, highest priority first.
pub const AXIS_RULES: [AxisRule; 4] = [
    AxisRule {
        name: "axis",
        matches: axis_attribute,
    },
    AxisRule {
        name: "cartesian_axis",
        matches: cartesian_axis,
    },
    AxisRule {
        name: "_CoordinateAxisType",
        matches: coordinate_axis_type,
    },
    AxisRule {
        name: "standard_name",
        matches: standard_name,
    },
];

fn axis_attribute(attr: &Attribute, axis: Axis) -> bool {
    attr.name.eq_ignore_ascii_case("axis") && attr.value.as_text() == Some(axis.letter())
}

fn cartesian_axis(attr: &Attribute, axis: Axis) -> bool {
    attr.name.eq_ignore_ascii_case("cartesian_axis") && attr.value.as_text() == Some(axis.letter())
}

fn coordinate_axis_type(attr: &Attribute, axis: Axis) -> bool {
    attr.name == "_CoordinateAxisType" && attr.value.as_text() == Some(axis.coordinate_axis_type())
}

fn standard_name(attr: &Attribute, axis: Axis) -> bool {
    attr.name == "standard_name"
        && attr
            .value
            .as_text()
            .is_some_and(|v| v.to_lowercase() == axis.standard_name())
}

/// A resolved axis and the rule that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMatch {
    pub variable: String,
    pub rule: &'static str,
}

/// Find the variable bound to `axis`.
pub fn resolve_axis(variables: &[VariableInfo], axis: Axis) -> Option<AxisMatch> {
    AXIS_RULES.iter().find_map(|rule| {
        variables
            .iter()
            .filter(|v| v.dimensions.len() == 1)
            .find(|v| v.attributes.iter().any(|a| (rule.matches)(a, axis)))
            .map(|v| AxisMatch {
                variable: v.name.clone(),
                rule: rule.name,
            })
    })
}

/// Resolve X, Y and T.
///
/// Missing X or Y is logged as a warning, since grid queries will fail;
/// a missing T is informational.
pub fn resolve_axes(variables: &[VariableInfo]) -> AxisBinding {
    let mut binding = AxisBinding::default();
    for axis in Axis::ALL {
        match resolve_axis(variables, axis) {
            Some(found) => {
                debug!(axis = %axis, variable = %found.variable, rule = found.rule, "Resolved axis");
                binding.set(axis, Some(found.variable));
            }
            None if axis == Axis::T => info!(axis = %axis, "Cannot determine axis"),
            None => warn!(axis = %axis, "Cannot determine axis"),
        }
    }
    binding
}
