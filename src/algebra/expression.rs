//! Standalone mathematical expressions.

use std::fmt;

use super::raw::{BinOp, CmpOp, RawExpr};
use super::Element;

/// A free-standing expression owning its raw tree.
///
/// Unlike terms, expressions mutate in place under the compound-assignment
/// operators (`+=`, `-=`, `*=`, `/=`, `%=`): the tree grows and the binding
/// keeps pointing at the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    raw: RawExpr,
}

impl Expression {
    /// Wrap a raw expression tree.
    pub fn new(raw: RawExpr) -> Self {
        Self { raw }
    }

    /// Borrow the underlying raw tree.
    pub fn as_raw(&self) -> &RawExpr {
        &self.raw
    }

    /// Consume the expression, yielding its raw tree.
    pub fn into_raw(self) -> RawExpr {
        self.raw
    }

    /// Whether the expression is relational and usable as a constraint.
    pub fn is_relation(&self) -> bool {
        self.raw.is_relation()
    }

    /// In-place counterpart of [`Element::pow`].
    pub fn pow_assign(&mut self, exponent: f64) {
        self.apply(BinOp::Pow, RawExpr::Num(exponent));
    }

    /// In-place counterpart of [`Element::floor_div`].
    pub fn floor_div_assign(&mut self, divisor: f64) {
        self.apply(BinOp::FloorDiv, RawExpr::Num(divisor));
    }

    /// In-place comparison, turning the expression relational.
    pub fn compare_assign(&mut self, op: CmpOp, rhs: &dyn Element) {
        self.raw = self.take().compare(op, rhs.raw());
    }

    fn apply(&mut self, op: BinOp, rhs: RawExpr) {
        self.raw = self.take().combine(op, rhs);
    }

    fn take(&mut self) -> RawExpr {
        std::mem::replace(&mut self.raw, RawExpr::Num(0.0))
    }
}

impl Element for Expression {
    fn raw(&self) -> RawExpr {
        self.raw.clone()
    }

    fn build(&self) -> Expression {
        self.clone()
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::new(RawExpr::Num(value))
    }
}

impl From<RawExpr> for Expression {
    fn from(raw: RawExpr) -> Self {
        Expression::new(raw)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl<E: Element> std::ops::AddAssign<E> for Expression {
    fn add_assign(&mut self, rhs: E) {
        self.apply(BinOp::Add, rhs.raw());
    }
}

impl<E: Element> std::ops::SubAssign<E> for Expression {
    fn sub_assign(&mut self, rhs: E) {
        self.apply(BinOp::Sub, rhs.raw());
    }
}

impl<E: Element> std::ops::MulAssign<E> for Expression {
    fn mul_assign(&mut self, rhs: E) {
        self.apply(BinOp::Mul, rhs.raw());
    }
}

impl<E: Element> std::ops::DivAssign<E> for Expression {
    fn div_assign(&mut self, rhs: E) {
        self.apply(BinOp::Div, rhs.raw());
    }
}

impl<E: Element> std::ops::RemAssign<E> for Expression {
    fn rem_assign(&mut self, rhs: E) {
        self.apply(BinOp::Rem, rhs.raw());
    }
}
