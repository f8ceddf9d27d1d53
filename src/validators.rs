//! Numeric domain checks shared by terms and parameters.

/// Whether a value is exactly 0 or 1.
pub fn is_binary(value: f64) -> bool {
    value == 0.0 || value == 1.0
}

/// Whether a finite value is a whole number.
pub fn is_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}
