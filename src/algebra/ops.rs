//! Operator overloading for the element algebra.
//!
//! Terms, constants and expressions combine through natural arithmetic
//! notation; every operator yields a fresh [`Expression`]:
//!
//! ```ignore
//! let x = engine.add_variable("x", ValueType::Integer, 0.0, f64::INFINITY)?;
//! let y = engine.add_variable("y", ValueType::Integer, 0.0, f64::INFINITY)?;
//!
//! let objective = &*x + 10.0 * &*y;
//! let limit = &*x + 7.0 * &*y;
//! ```
//!
//! Comparison operators cannot return non-boolean values in Rust, so
//! relational expressions come from the [`constraint!`](crate::constraint)
//! macro or the [`Element::compare`] family.

use super::raw::{BinOp, RawExpr, UnaryOp};
use super::{Constant, Element, Expression, Term, Variable};

// ============================================================================
// Constraint macro
// ============================================================================

/// Create relational expressions using natural comparison syntax.
///
/// The left-hand side must be in parentheses; the right-hand side is any
/// numeric expression.
///
/// # Examples
///
/// ```ignore
/// let c1 = constraint!((&*x + 7.0 * &*y) <= 17.5);
/// let c2 = constraint!((&*x) <= 3.5);
/// let c3 = constraint!((2.0 * &*a) >= 5.0);
/// ```
#[macro_export]
macro_rules! constraint {
    (($lhs:expr) == $rhs:expr) => {
        $crate::algebra::Element::compare_value(
            &$lhs,
            $crate::algebra::CmpOp::Eq,
            $rhs as f64,
        )
    };
    (($lhs:expr) != $rhs:expr) => {
        $crate::algebra::Element::compare_value(
            &$lhs,
            $crate::algebra::CmpOp::Ne,
            $rhs as f64,
        )
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::algebra::Element::compare_value(
            &$lhs,
            $crate::algebra::CmpOp::Le,
            $rhs as f64,
        )
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::algebra::Element::compare_value(
            &$lhs,
            $crate::algebra::CmpOp::Ge,
            $rhs as f64,
        )
    };
    (($lhs:expr) < $rhs:expr) => {
        $crate::algebra::Element::compare_value(
            &$lhs,
            $crate::algebra::CmpOp::Lt,
            $rhs as f64,
        )
    };
    (($lhs:expr) > $rhs:expr) => {
        $crate::algebra::Element::compare_value(
            &$lhs,
            $crate::algebra::CmpOp::Gt,
            $rhs as f64,
        )
    };
}

// ============================================================================
// Operator matrices
// ============================================================================

macro_rules! impl_element_binary_ops {
    (owned $self_ty:ty) => {
        impl_element_binary_ops!($self_ty);

        impl<E: Element> std::ops::Add<E> for $self_ty {
            type Output = Expression;

            fn add(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Add, &rhs)
            }
        }

        impl<E: Element> std::ops::Sub<E> for $self_ty {
            type Output = Expression;

            fn sub(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Sub, &rhs)
            }
        }

        impl<E: Element> std::ops::Mul<E> for $self_ty {
            type Output = Expression;

            fn mul(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Mul, &rhs)
            }
        }

        impl<E: Element> std::ops::Div<E> for $self_ty {
            type Output = Expression;

            fn div(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Div, &rhs)
            }
        }

        impl<E: Element> std::ops::Rem<E> for $self_ty {
            type Output = Expression;

            fn rem(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Rem, &rhs)
            }
        }

        impl std::ops::Neg for $self_ty {
            type Output = Expression;

            fn neg(self) -> Expression {
                Expression::new(Element::raw(&self).unary(UnaryOp::Neg))
            }
        }

        impl std::ops::Add<$self_ty> for f64 {
            type Output = Expression;

            fn add(self, rhs: $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Add, Element::raw(&rhs)))
            }
        }

        impl std::ops::Sub<$self_ty> for f64 {
            type Output = Expression;

            fn sub(self, rhs: $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Sub, Element::raw(&rhs)))
            }
        }

        impl std::ops::Mul<$self_ty> for f64 {
            type Output = Expression;

            fn mul(self, rhs: $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Mul, Element::raw(&rhs)))
            }
        }

        impl std::ops::Div<$self_ty> for f64 {
            type Output = Expression;

            fn div(self, rhs: $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Div, Element::raw(&rhs)))
            }
        }
    };

    ($self_ty:ty) => {
        impl<'a, E: Element> std::ops::Add<E> for &'a $self_ty {
            type Output = Expression;

            fn add(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Add, &rhs)
            }
        }

        impl<'a, E: Element> std::ops::Sub<E> for &'a $self_ty {
            type Output = Expression;

            fn sub(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Sub, &rhs)
            }
        }

        impl<'a, E: Element> std::ops::Mul<E> for &'a $self_ty {
            type Output = Expression;

            fn mul(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Mul, &rhs)
            }
        }

        impl<'a, E: Element> std::ops::Div<E> for &'a $self_ty {
            type Output = Expression;

            fn div(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Div, &rhs)
            }
        }

        impl<'a, E: Element> std::ops::Rem<E> for &'a $self_ty {
            type Output = Expression;

            fn rem(self, rhs: E) -> Expression {
                Element::combine(&self, BinOp::Rem, &rhs)
            }
        }

        impl<'a> std::ops::Neg for &'a $self_ty {
            type Output = Expression;

            fn neg(self) -> Expression {
                Expression::new(Element::raw(&self).unary(UnaryOp::Neg))
            }
        }

        impl<'a> std::ops::Add<&'a $self_ty> for f64 {
            type Output = Expression;

            fn add(self, rhs: &'a $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Add, Element::raw(&rhs)))
            }
        }

        impl<'a> std::ops::Sub<&'a $self_ty> for f64 {
            type Output = Expression;

            fn sub(self, rhs: &'a $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Sub, Element::raw(&rhs)))
            }
        }

        impl<'a> std::ops::Mul<&'a $self_ty> for f64 {
            type Output = Expression;

            fn mul(self, rhs: &'a $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Mul, Element::raw(&rhs)))
            }
        }

        impl<'a> std::ops::Div<&'a $self_ty> for f64 {
            type Output = Expression;

            fn div(self, rhs: &'a $self_ty) -> Expression {
                Expression::new(RawExpr::Num(self).combine(BinOp::Div, Element::raw(&rhs)))
            }
        }
    };
}

impl_element_binary_ops!(owned Expression);
impl_element_binary_ops!(owned Constant);
impl_element_binary_ops!(dyn Term);
impl_element_binary_ops!(dyn Variable);
