//! The raw expression representation wrapped by every [`Element`].
//!
//! Solver-native expression objects do not exist on this side of the
//! adapter boundary, so the "raw value" an element carries is a small owned
//! tree. Operators grow the tree; engines lower it to linear form when a
//! constraint or objective is registered (see [`crate::algebra::linear`]).
//!
//! [`Element`]: crate::algebra::Element

use std::fmt;
use std::sync::Arc;

/// Binary operations supported by the element algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Division rounded towards negative infinity.
    FloorDiv,
    Rem,
    Pow,
}

impl BinOp {
    /// Evaluate the operation on plain numbers.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
            BinOp::FloorDiv => (lhs / rhs).floor(),
            BinOp::Rem => lhs % rhs,
            BinOp::Pow => lhs.powf(rhs),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Rem => "%",
            BinOp::Pow => "**",
        }
    }
}

/// Unary operations supported by the element algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
}

impl UnaryOp {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            UnaryOp::Neg => -value,
            UnaryOp::Pos => value,
            UnaryOp::Abs => value.abs(),
        }
    }
}

/// Comparison operations, producing relational expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A reference to an engine-created variable.
///
/// The index is the creation order within the owning engine; the name is
/// shared with the variable term itself.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    index: usize,
    name: Arc<str>,
}

impl VarRef {
    pub(crate) fn new(index: usize, name: Arc<str>) -> Self {
        Self { index, name }
    }

    /// Creation index of the variable within its engine.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name of the variable.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The raw form of a mathematical element.
///
/// Numeric-only combinations fold eagerly, so a tree containing no
/// variables is always a single [`RawExpr::Num`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawExpr {
    /// A plain number.
    Num(f64),
    /// A single solver variable.
    Var(VarRef),
    /// A binary arithmetic combination.
    Binary {
        op: BinOp,
        lhs: Box<RawExpr>,
        rhs: Box<RawExpr>,
    },
    /// A unary operation.
    Unary { op: UnaryOp, expr: Box<RawExpr> },
    /// A relational combination, i.e. a constraint body.
    Cmp {
        op: CmpOp,
        lhs: Box<RawExpr>,
        rhs: Box<RawExpr>,
    },
}

impl RawExpr {
    /// Combine two raw expressions with a binary operation.
    pub fn combine(self, op: BinOp, rhs: RawExpr) -> RawExpr {
        if let (RawExpr::Num(a), RawExpr::Num(b)) = (&self, &rhs) {
            return RawExpr::Num(op.apply(*a, *b));
        }
        RawExpr::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    /// Apply a unary operation.
    pub fn unary(self, op: UnaryOp) -> RawExpr {
        if let RawExpr::Num(v) = &self {
            return RawExpr::Num(op.apply(*v));
        }
        RawExpr::Unary {
            op,
            expr: Box::new(self),
        }
    }

    /// Build a relational expression. Never folds: a relation keeps its
    /// shape until an engine lowers it.
    pub fn compare(self, op: CmpOp, rhs: RawExpr) -> RawExpr {
        RawExpr::Cmp {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    /// Whether this expression is a relation (usable as a constraint).
    pub fn is_relation(&self) -> bool {
        matches!(self, RawExpr::Cmp { .. })
    }
}

impl From<f64> for RawExpr {
    fn from(value: f64) -> Self {
        RawExpr::Num(value)
    }
}

impl fmt::Display for RawExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawExpr::Num(v) => write!(f, "{}", v),
            RawExpr::Var(var) => write!(f, "{}", var.name()),
            RawExpr::Binary { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.symbol(), rhs)
            }
            RawExpr::Unary { op, expr } => match op {
                UnaryOp::Neg => write!(f, "-({})", expr),
                UnaryOp::Pos => write!(f, "+({})", expr),
                UnaryOp::Abs => write!(f, "|{}|", expr),
            },
            RawExpr::Cmp { op, lhs, rhs } => {
                write!(f, "{} {} {}", lhs, op.symbol(), rhs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(index: usize, name: &str) -> RawExpr {
        RawExpr::Var(VarRef::new(index, Arc::from(name)))
    }

    #[test]
    fn numeric_combinations_fold() {
        let folded = RawExpr::Num(2.0).combine(BinOp::Add, RawExpr::Num(3.0));
        assert_eq!(folded, RawExpr::Num(5.0));

        let folded = RawExpr::Num(7.0).combine(BinOp::FloorDiv, RawExpr::Num(2.0));
        assert_eq!(folded, RawExpr::Num(3.0));

        let folded = RawExpr::Num(2.0).combine(BinOp::Pow, RawExpr::Num(3.0));
        assert_eq!(folded, RawExpr::Num(8.0));

        assert_eq!(RawExpr::Num(-4.5).unary(UnaryOp::Abs), RawExpr::Num(4.5));
    }

    #[test]
    fn variable_combinations_build_trees() {
        let expr = var(0, "x").combine(BinOp::Mul, RawExpr::Num(2.0));
        match &expr {
            RawExpr::Binary { op, .. } => assert_eq!(*op, BinOp::Mul),
            other => panic!("expected binary node, got {:?}", other),
        }
    }

    #[test]
    fn relations_never_fold() {
        let rel = RawExpr::Num(1.0).compare(CmpOp::Le, RawExpr::Num(2.0));
        assert!(rel.is_relation());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn finite_numbers_always_fold(
                a in -1e6f64..1e6,
                b in 1e-3f64..1e6,
                op in prop_oneof![
                    Just(BinOp::Add),
                    Just(BinOp::Sub),
                    Just(BinOp::Mul),
                    Just(BinOp::Div),
                ],
            ) {
                let folded = RawExpr::Num(a).combine(op, RawExpr::Num(b));
                prop_assert_eq!(folded, RawExpr::Num(op.apply(a, b)));
            }

            #[test]
            fn negation_is_an_involution(a in -1e6f64..1e6) {
                let twice = RawExpr::Num(a).unary(UnaryOp::Neg).unary(UnaryOp::Neg);
                prop_assert_eq!(twice, RawExpr::Num(a));
            }
        }
    }

    #[test]
    fn display_renders_infix() {
        let expr = var(0, "x").combine(BinOp::Add, var(1, "y").combine(BinOp::Mul, 7.0.into()));
        assert_eq!(expr.to_string(), "(x + (y * 7))");

        let rel = var(0, "x").compare(CmpOp::Le, RawExpr::Num(3.5));
        assert_eq!(rel.to_string(), "x <= 3.5");
    }
}
