//! Constant terms.

use std::fmt;
use std::sync::Arc;

use super::raw::RawExpr;
use super::term::{Term, TermError};
use super::Element;
use crate::enums::{TermType, ValueType};
use crate::validators::{is_binary, is_integer};

/// An immutable named value.
///
/// Constants participate in expressions exactly like variables but carry
/// their value directly; both bounds collapse onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    name: Arc<str>,
    value_type: ValueType,
    value: f64,
}

impl Constant {
    /// Create a constant, validating the value against its declared type.
    ///
    /// Bounds collapse onto the value, so only the value domain is
    /// checked here; the interval rules for variables do not apply.
    pub fn new(name: &str, value_type: ValueType, value: f64) -> Result<Self, TermError> {
        if name.is_empty() {
            return Err(TermError::EmptyName);
        }
        if !value.is_finite() {
            return Err(TermError::NonFiniteValue {
                name: name.to_owned(),
                value,
            });
        }
        match value_type {
            ValueType::Binary if !is_binary(value) => {
                return Err(TermError::BinaryValue {
                    name: name.to_owned(),
                    value,
                });
            }
            ValueType::Integer if !is_integer(value) => {
                return Err(TermError::IntegerValue {
                    name: name.to_owned(),
                    value,
                });
            }
            _ => {}
        }
        Ok(Self {
            name: Arc::from(name),
            value_type,
            value,
        })
    }
}

impl Element for Constant {
    fn raw(&self) -> RawExpr {
        RawExpr::Num(self.value)
    }
}

impl Term for Constant {
    fn name(&self) -> &str {
        &self.name
    }

    fn term_type(&self) -> TermType {
        TermType::Constant
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn lower_bound(&self) -> f64 {
        self.value
    }

    fn upper_bound(&self) -> f64 {
        self.value
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_collapse_onto_value() {
        let c = Constant::new("capacity", ValueType::Continuous, 12.5).unwrap();
        assert_eq!(c.lower_bound(), 12.5);
        assert_eq!(c.upper_bound(), 12.5);
        assert_eq!(c.value(), 12.5);
        assert!(c.is_constant());
        assert!(!c.is_variable());
    }

    #[test]
    fn binary_constant_must_be_zero_or_one() {
        assert!(Constant::new("flag", ValueType::Binary, 1.0).is_ok());
        assert!(matches!(
            Constant::new("flag", ValueType::Binary, 0.5),
            Err(TermError::BinaryValue { .. })
        ));
    }

    #[test]
    fn rejects_empty_names() {
        assert!(matches!(
            Constant::new("", ValueType::Continuous, 1.0),
            Err(TermError::EmptyName)
        ));
    }

    #[test]
    fn integer_constant_must_be_whole() {
        assert!(Constant::new("count", ValueType::Integer, 3.0).is_ok());
        assert!(matches!(
            Constant::new("count", ValueType::Integer, 3.5),
            Err(TermError::IntegerValue { .. })
        ));
    }

    #[test]
    fn infinite_value_is_rejected() {
        assert!(matches!(
            Constant::new("c", ValueType::Continuous, f64::INFINITY),
            Err(TermError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            Constant::new("c", ValueType::Continuous, f64::NAN),
            Err(TermError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn raw_form_is_its_value() {
        let c = Constant::new("c", ValueType::Continuous, 4.0).unwrap();
        assert_eq!(c.raw(), RawExpr::Num(4.0));
    }

    #[test]
    fn pretty_string_uses_requested_precision() {
        let c = Constant::new("c", ValueType::Continuous, 1.23456).unwrap();
        assert_eq!(c.pretty_string(2), "c: 1.23");
    }
}
