//! Solver-neutral mathematical algebra.
//!
//! Everything that can appear in a constraint or an objective implements
//! [`Element`]: expressions, constants and engine variables. Elements carry
//! a raw expression tree ([`RawExpr`]) and compose through arithmetic and
//! relational operators into fresh [`Expression`] values, so heterogeneous
//! operands (a variable plus a constant plus a number) combine freely
//! without either side knowing the other's concrete type.

pub mod linear;
pub mod raw;

mod constant;
mod expression;
mod ops;
mod term;
mod variable;

use std::rc::Rc;

pub use constant::Constant;
pub use expression::Expression;
pub use raw::{BinOp, CmpOp, RawExpr, UnaryOp, VarRef};
pub use term::{is_unsolved, Term, TermError, UNSOLVED};
pub use variable::Variable;

pub(crate) use variable::prepare_bounds;

/// A value that participates in the mathematical algebra.
///
/// Implementors only provide [`raw`](Element::raw); every operation is
/// derived from it. All derived operations return a new [`Expression`]
/// and leave the receiver untouched.
pub trait Element {
    /// The raw expression tree underlying this element.
    fn raw(&self) -> RawExpr;

    /// Wrap this element's raw form in a standalone [`Expression`].
    fn build(&self) -> Expression {
        Expression::new(self.raw())
    }

    /// Combine with another element under a binary operation.
    fn combine(&self, op: BinOp, rhs: &dyn Element) -> Expression {
        Expression::new(self.raw().combine(op, rhs.raw()))
    }

    /// Combine with a plain number under a binary operation.
    fn combine_value(&self, op: BinOp, rhs: f64) -> Expression {
        Expression::new(self.raw().combine(op, RawExpr::Num(rhs)))
    }

    /// Compare with another element, producing a relational expression.
    fn compare(&self, op: CmpOp, rhs: &dyn Element) -> Expression {
        Expression::new(self.raw().compare(op, rhs.raw()))
    }

    /// Compare with a plain number, producing a relational expression.
    fn compare_value(&self, op: CmpOp, rhs: f64) -> Expression {
        Expression::new(self.raw().compare(op, RawExpr::Num(rhs)))
    }

    /// Absolute value.
    fn abs(&self) -> Expression {
        Expression::new(self.raw().unary(UnaryOp::Abs))
    }

    /// Raise to a numeric power.
    fn pow(&self, exponent: f64) -> Expression {
        self.combine_value(BinOp::Pow, exponent)
    }

    /// Divide and round towards negative infinity.
    fn floor_div(&self, divisor: f64) -> Expression {
        self.combine_value(BinOp::FloorDiv, divisor)
    }

    /// Remainder of division by a number.
    fn rem(&self, divisor: f64) -> Expression {
        self.combine_value(BinOp::Rem, divisor)
    }
}

impl<E: Element + ?Sized> Element for &E {
    fn raw(&self) -> RawExpr {
        (**self).raw()
    }
}

impl<E: Element + ?Sized> Element for Box<E> {
    fn raw(&self) -> RawExpr {
        (**self).raw()
    }
}

impl<E: Element + ?Sized> Element for Rc<E> {
    fn raw(&self) -> RawExpr {
        (**self).raw()
    }
}

impl Element for f64 {
    fn raw(&self) -> RawExpr {
        RawExpr::Num(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_operations_build_expressions() {
        let expr = 2.0_f64.combine_value(BinOp::Add, 3.0);
        assert_eq!(expr.raw(), RawExpr::Num(5.0));

        let rel = 1.0_f64.compare_value(CmpOp::Le, 2.0);
        assert!(rel.raw().is_relation());
    }

    #[test]
    fn references_and_smart_pointers_are_elements() {
        let boxed: Box<dyn Element> = Box::new(4.0_f64);
        let shared: Rc<dyn Element> = Rc::new(2.0_f64);
        let expr = boxed.combine(BinOp::Mul, &shared);
        assert_eq!(expr.raw(), RawExpr::Num(8.0));
    }
}
