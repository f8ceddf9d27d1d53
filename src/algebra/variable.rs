//! Variable terms.

use super::term::{validate_bounds, Term, TermError};
use crate::enums::ValueType;

/// A decision variable owned by an engine.
///
/// Concrete variable types live inside their engine modules; the rest of
/// the crate only ever sees them as `Rc<dyn Variable>`. A variable's
/// [`value`](Term::value) reads the owning engine's latest solution.
pub trait Variable: Term {}

/// Normalise and validate variable bounds at creation time.
///
/// Engines describe an unbounded binary variable with an infinite upper
/// bound; it is clamped to 1 before validation so the unit-interval rule
/// applies uniformly. Returns the effective `(lower, upper)` pair.
pub(crate) fn prepare_bounds(
    name: &str,
    value_type: ValueType,
    lower: f64,
    upper: f64,
) -> Result<(f64, f64), TermError> {
    let upper = match value_type {
        ValueType::Binary if upper.is_infinite() && upper > 0.0 => 1.0,
        _ => upper,
    };
    validate_bounds(name, value_type, lower, upper)?;
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_infinite_upper_bound_clamps_to_one() {
        let (lower, upper) =
            prepare_bounds("b", ValueType::Binary, 0.0, f64::INFINITY).unwrap();
        assert_eq!(lower, 0.0);
        assert_eq!(upper, 1.0);
    }

    #[test]
    fn binary_finite_bounds_validate_strictly() {
        assert!(prepare_bounds("b", ValueType::Binary, 0.0, 1.0).is_ok());
        assert!(prepare_bounds("b", ValueType::Binary, 0.0, 2.0).is_err());
        assert!(prepare_bounds("b", ValueType::Binary, 1.0, 1.0).is_err());
        assert!(prepare_bounds("b", ValueType::Binary, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn continuous_bounds_pass_through() {
        let (lower, upper) =
            prepare_bounds("x", ValueType::Continuous, -1.5, f64::INFINITY).unwrap();
        assert_eq!(lower, -1.5);
        assert!(upper.is_infinite());
    }
}
