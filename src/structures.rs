//! Data contracts for feeding external data into a model.
//!
//! Parameters describe model inputs before any term exists: a value known
//! with certainty ([`ParameterType::Fixed`]) or an uncertainty range
//! ([`ParameterType::Bounded`]). Construction validates the data against
//! its declared [`ValueType`], so a model built from parameters never sees
//! an out-of-domain number.

use thiserror::Error;

use crate::enums::{ParameterType, ValueType};
use crate::validators::{is_binary, is_integer};

/// Magnitude treated as infinity in parameter data.
const INFINITY_THRESHOLD: f64 = 1e20;

/// Validation failures for parameter construction.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter value {0} is effectively infinite")]
    InfiniteValue(f64),
    #[error("parameter bounds [{lower}, {upper}] must be finite and ordered")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("binary parameter value {0} is not 0 or 1")]
    BinaryValue(f64),
    #[error("integer parameter value {0} is not a whole number")]
    IntegerValue(f64),
    #[error("parameter values cannot be empty")]
    Empty,
    #[error("parameter bounds differ in length: {lower_len} lower vs {upper_len} upper")]
    LengthMismatch { lower_len: usize, upper_len: usize },
}

fn check_value(value_type: ValueType, value: f64) -> Result<(), ParameterError> {
    if value.abs() >= INFINITY_THRESHOLD {
        return Err(ParameterError::InfiniteValue(value));
    }
    match value_type {
        ValueType::Binary if !is_binary(value) => Err(ParameterError::BinaryValue(value)),
        ValueType::Integer if !is_integer(value) => Err(ParameterError::IntegerValue(value)),
        _ => Ok(()),
    }
}

fn check_bounds(value_type: ValueType, lower: f64, upper: f64) -> Result<(), ParameterError> {
    if lower > upper || lower.abs() >= INFINITY_THRESHOLD || upper.abs() >= INFINITY_THRESHOLD {
        return Err(ParameterError::InvalidBounds { lower, upper });
    }
    check_value(value_type, lower)?;
    check_value(value_type, upper)
}

/// Describes a term slot in a model schema.
///
/// The base name doubles as the set name for indexed terms; [`indexed`]
/// renders the concrete member name for a given index tuple.
///
/// [`indexed`]: TermDefinition::indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    name: String,
    set_name: Option<String>,
    display_name: Option<String>,
}

impl TermDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            set_name: None,
            display_name: None,
        }
    }

    pub fn with_set(name: &str, set_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            set_name: Some(set_name.to_owned()),
            display_name: None,
        }
    }

    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_owned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    /// Name shown to users, falling back to the plain name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Render the member name for an index tuple, e.g. `x_2_1`.
    pub fn indexed(&self, index: &[usize]) -> String {
        let mut name = self.name.clone();
        for i in index {
            name.push('_');
            name.push_str(&i.to_string());
        }
        name
    }
}

/// A scalar model input: one fixed value or one bound pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleValueParameter {
    parameter_type: ParameterType,
    value_type: ValueType,
    value: Option<f64>,
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
}

impl SingleValueParameter {
    /// A parameter under certainty, carrying one fixed value.
    pub fn fixed(value_type: ValueType, value: f64) -> Result<Self, ParameterError> {
        check_value(value_type, value)?;
        Ok(Self {
            parameter_type: ParameterType::Fixed,
            value_type,
            value: Some(value),
            lower_bound: None,
            upper_bound: None,
        })
    }

    /// A parameter under uncertainty, carrying a bound pair.
    pub fn bounded(
        value_type: ValueType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Self, ParameterError> {
        check_bounds(value_type, lower_bound, upper_bound)?;
        Ok(Self {
            parameter_type: ParameterType::Bounded,
            value_type,
            value: None,
            lower_bound: Some(lower_bound),
            upper_bound: Some(upper_bound),
        })
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_bounded(&self) -> bool {
        self.parameter_type == ParameterType::Bounded
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn lower_bound(&self) -> Option<f64> {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> Option<f64> {
        self.upper_bound
    }
}

/// A vector model input: fixed values or per-entry bound pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiValueParameter {
    parameter_type: ParameterType,
    value_type: ValueType,
    values: Option<Vec<f64>>,
    lower_bounds: Option<Vec<f64>>,
    upper_bounds: Option<Vec<f64>>,
}

impl MultiValueParameter {
    /// A parameter under certainty, carrying one value per entry.
    pub fn fixed(value_type: ValueType, values: Vec<f64>) -> Result<Self, ParameterError> {
        if values.is_empty() {
            return Err(ParameterError::Empty);
        }
        for value in &values {
            check_value(value_type, *value)?;
        }
        Ok(Self {
            parameter_type: ParameterType::Fixed,
            value_type,
            values: Some(values),
            lower_bounds: None,
            upper_bounds: None,
        })
    }

    /// A parameter under uncertainty, carrying one bound pair per entry.
    pub fn bounded(
        value_type: ValueType,
        lower_bounds: Vec<f64>,
        upper_bounds: Vec<f64>,
    ) -> Result<Self, ParameterError> {
        if lower_bounds.len() != upper_bounds.len() {
            return Err(ParameterError::LengthMismatch {
                lower_len: lower_bounds.len(),
                upper_len: upper_bounds.len(),
            });
        }
        if lower_bounds.is_empty() {
            return Err(ParameterError::Empty);
        }
        for (lower, upper) in lower_bounds.iter().zip(&upper_bounds) {
            check_bounds(value_type, *lower, *upper)?;
        }
        Ok(Self {
            parameter_type: ParameterType::Bounded,
            value_type,
            values: None,
            lower_bounds: Some(lower_bounds),
            upper_bounds: Some(upper_bounds),
        })
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_bounded(&self) -> bool {
        self.parameter_type == ParameterType::Bounded
    }

    pub fn len(&self) -> usize {
        match (&self.values, &self.lower_bounds) {
            (Some(values), _) => values.len(),
            (None, Some(lower_bounds)) => lower_bounds.len(),
            (None, None) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    pub fn lower_bounds(&self) -> Option<&[f64]> {
        self.lower_bounds.as_deref()
    }

    pub fn upper_bounds(&self) -> Option<&[f64]> {
        self.upper_bounds.as_deref()
    }
}
