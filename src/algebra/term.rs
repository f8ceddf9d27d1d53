//! Terms: the named leaves of the algebra.

use thiserror::Error;

use super::Element;
use crate::enums::{TermType, ValueType};
use crate::validators::is_integer;

/// Sentinel value a variable reports before any successful solve.
///
/// Negative zero compares equal to zero under `==`, so arithmetic on an
/// unsolved value behaves like zero; [`is_unsolved`] tells the two apart
/// through the sign bit.
pub const UNSOLVED: f64 = -0.0;

/// Whether a value is the [`UNSOLVED`] sentinel rather than a real zero.
pub fn is_unsolved(value: f64) -> bool {
    value == 0.0 && value.is_sign_negative()
}

/// Validation failures for term construction.
#[derive(Debug, Error)]
pub enum TermError {
    #[error("term name cannot be empty")]
    EmptyName,
    #[error("term '{name}': lower bound {lower} exceeds upper bound {upper}")]
    InvertedBounds { name: String, lower: f64, upper: f64 },
    #[error("term '{name}': bounds [{lower}, {upper}] leave no finite value")]
    InfiniteBounds { name: String, lower: f64, upper: f64 },
    #[error("binary term '{name}': bounds [{lower}, {upper}] must be exactly [0, 1]")]
    BinaryBounds { name: String, lower: f64, upper: f64 },
    #[error("integer term '{name}': bounds [{lower}, {upper}] must be whole numbers")]
    IntegerBounds { name: String, lower: f64, upper: f64 },
    #[error("binary constant '{name}': value {value} is not 0 or 1")]
    BinaryValue { name: String, value: f64 },
    #[error("integer constant '{name}': value {value} is not a whole number")]
    IntegerValue { name: String, value: f64 },
    #[error("constant '{name}': value {value} must be finite")]
    NonFiniteValue { name: String, value: f64 },
}

/// A named leaf of the algebra: a constant or a solver variable.
///
/// Terms expose uniform metadata regardless of which side of the solver
/// boundary they live on. A constant's bounds collapse onto its value; a
/// variable's value is [`UNSOLVED`] until its engine solves.
pub trait Term: Element {
    /// Name of the term.
    fn name(&self) -> &str;

    /// Whether the term is a constant or a variable.
    fn term_type(&self) -> TermType;

    /// The numeric domain of the term.
    fn value_type(&self) -> ValueType;

    /// Lower bound.
    fn lower_bound(&self) -> f64;

    /// Upper bound.
    fn upper_bound(&self) -> f64;

    /// Current value: a constant's fixed value, or a variable's solution
    /// value ([`UNSOLVED`] before a solve).
    fn value(&self) -> f64;

    fn is_constant(&self) -> bool {
        self.term_type() == TermType::Constant
    }

    fn is_variable(&self) -> bool {
        self.term_type() == TermType::Variable
    }

    /// Render `name: value` with the given number of decimal places.
    fn pretty_string(&self, float_precision: usize) -> String {
        format!("{}: {:.*}", self.name(), float_precision, self.value())
    }
}

/// Check the bound rules shared by every term kind.
///
/// Binary terms take bounds of exactly `[0, 1]`; integer terms need
/// whole-number bounds; every term needs a non-empty name, `lower <=
/// upper`, and an interval containing at least one finite value (a lower
/// bound of `+inf` or an upper bound of `-inf` is rejected).
pub(crate) fn validate_bounds(
    name: &str,
    value_type: ValueType,
    lower: f64,
    upper: f64,
) -> Result<(), TermError> {
    if name.is_empty() {
        return Err(TermError::EmptyName);
    }
    if lower == f64::INFINITY || upper == f64::NEG_INFINITY {
        return Err(TermError::InfiniteBounds {
            name: name.to_owned(),
            lower,
            upper,
        });
    }
    if lower > upper {
        return Err(TermError::InvertedBounds {
            name: name.to_owned(),
            lower,
            upper,
        });
    }
    match value_type {
        ValueType::Binary => {
            if lower != 0.0 || upper != 1.0 {
                return Err(TermError::BinaryBounds {
                    name: name.to_owned(),
                    lower,
                    upper,
                });
            }
        }
        ValueType::Integer => {
            if !is_integer(lower) && lower.is_finite() || !is_integer(upper) && upper.is_finite() {
                return Err(TermError::IntegerBounds {
                    name: name.to_owned(),
                    lower,
                    upper,
                });
            }
        }
        ValueType::Continuous => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsolved_sentinel_is_distinguishable_from_zero() {
        assert!(is_unsolved(UNSOLVED));
        assert!(!is_unsolved(0.0));
        assert_eq!(UNSOLVED, 0.0);
        assert_eq!(UNSOLVED + 1.0, 1.0);
    }

    #[test]
    fn rejects_empty_names() {
        assert!(matches!(
            validate_bounds("", ValueType::Continuous, 0.0, 1.0),
            Err(TermError::EmptyName)
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            validate_bounds("x", ValueType::Continuous, 2.0, 1.0),
            Err(TermError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn rejects_bounds_without_a_finite_value() {
        assert!(matches!(
            validate_bounds("x", ValueType::Continuous, f64::INFINITY, f64::INFINITY),
            Err(TermError::InfiniteBounds { .. })
        ));
        assert!(matches!(
            validate_bounds("x", ValueType::Continuous, f64::NEG_INFINITY, f64::NEG_INFINITY),
            Err(TermError::InfiniteBounds { .. })
        ));
        assert!(validate_bounds("x", ValueType::Continuous, f64::NEG_INFINITY, f64::INFINITY).is_ok());
    }

    #[test]
    fn binary_bounds_must_be_exactly_the_unit_interval() {
        assert!(validate_bounds("b", ValueType::Binary, 0.0, 1.0).is_ok());
        assert!(matches!(
            validate_bounds("b", ValueType::Binary, 1.0, 1.0),
            Err(TermError::BinaryBounds { .. })
        ));
        assert!(matches!(
            validate_bounds("b", ValueType::Binary, 0.0, 2.0),
            Err(TermError::BinaryBounds { .. })
        ));
        assert!(matches!(
            validate_bounds("b", ValueType::Binary, -1.0, 1.0),
            Err(TermError::BinaryBounds { .. })
        ));
    }

    #[test]
    fn integer_bounds_must_be_whole() {
        assert!(validate_bounds("i", ValueType::Integer, 0.0, 10.0).is_ok());
        assert!(validate_bounds("i", ValueType::Integer, 0.0, f64::INFINITY).is_ok());
        assert!(matches!(
            validate_bounds("i", ValueType::Integer, 0.5, 10.0),
            Err(TermError::IntegerBounds { .. })
        ));
    }
}
