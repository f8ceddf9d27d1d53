//! Lowering of raw expression trees into linear form.
//!
//! Engines accept arbitrary [`RawExpr`] trees from the algebra layer and
//! lower them here before handing anything to a solver. Nonlinear shapes
//! (variable times variable, division by a variable, `abs`, fractional
//! powers) are rejected eagerly with a [`LowerError`] so a modelling
//! mistake fails at registration time rather than inside a backend.

use std::collections::HashMap;

use thiserror::Error;

use super::raw::{BinOp, CmpOp, RawExpr, UnaryOp};

/// A linear combination of variables plus a constant offset.
///
/// Terms are keyed by variable creation index; coefficients of variables
/// mentioned multiple times are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearForm {
    pub terms: HashMap<usize, f64>,
    pub constant: f64,
}

impl LinearForm {
    fn from_constant(value: f64) -> Self {
        LinearForm {
            terms: HashMap::new(),
            constant: value,
        }
    }

    fn from_variable(index: usize) -> Self {
        let mut terms = HashMap::new();
        terms.insert(index, 1.0);
        LinearForm {
            terms,
            constant: 0.0,
        }
    }

    fn add(mut self, rhs: LinearForm) -> Self {
        for (index, coeff) in rhs.terms {
            *self.terms.entry(index).or_insert(0.0) += coeff;
        }
        self.constant += rhs.constant;
        self
    }

    fn scale(mut self, factor: f64) -> Self {
        for coeff in self.terms.values_mut() {
            *coeff *= factor;
        }
        self.constant *= factor;
        self
    }

    /// Whether the form contains no variables.
    pub fn is_constant(&self) -> bool {
        self.terms.values().all(|c| *c == 0.0)
    }
}

/// A lowered constraint: a linear form compared against zero.
///
/// `lhs (op) 0` after moving every term to the left-hand side, so the
/// original right-hand side lives negated inside `lhs.constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub lhs: LinearForm,
    pub op: CmpOp,
}

/// Raised when an expression cannot be lowered to linear form.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("expression is nonlinear: {0}")]
    Nonlinear(String),
    #[error("expression is not a relation and cannot be used as a constraint: {0}")]
    NotARelation(String),
    #[error("expression is a relation and cannot be used as an objective: {0}")]
    UnexpectedRelation(String),
}

/// Lower an objective or sub-expression into a [`LinearForm`].
pub fn lower_expression(expr: &RawExpr) -> Result<LinearForm, LowerError> {
    match expr {
        RawExpr::Cmp { .. } => Err(LowerError::UnexpectedRelation(expr.to_string())),
        _ => lower(expr),
    }
}

/// Lower a relational expression into a [`LinearConstraint`].
pub fn lower_constraint(expr: &RawExpr) -> Result<LinearConstraint, LowerError> {
    match expr {
        RawExpr::Cmp { op, lhs, rhs } => {
            let lhs = lower(lhs)?;
            let rhs = lower(rhs)?;
            Ok(LinearConstraint {
                lhs: lhs.add(rhs.scale(-1.0)),
                op: *op,
            })
        }
        _ => Err(LowerError::NotARelation(expr.to_string())),
    }
}

fn lower(expr: &RawExpr) -> Result<LinearForm, LowerError> {
    match expr {
        RawExpr::Num(v) => Ok(LinearForm::from_constant(*v)),
        RawExpr::Var(var) => Ok(LinearForm::from_variable(var.index())),
        RawExpr::Binary { op, lhs, rhs } => {
            let left = lower(lhs)?;
            let right = lower(rhs)?;
            match op {
                BinOp::Add => Ok(left.add(right)),
                BinOp::Sub => Ok(left.add(right.scale(-1.0))),
                BinOp::Mul => {
                    if left.is_constant() {
                        Ok(right.scale(left.constant))
                    } else if right.is_constant() {
                        Ok(left.scale(right.constant))
                    } else {
                        Err(LowerError::Nonlinear(expr.to_string()))
                    }
                }
                BinOp::Div => {
                    if right.is_constant() {
                        Ok(left.scale(1.0 / right.constant))
                    } else {
                        Err(LowerError::Nonlinear(expr.to_string()))
                    }
                }
                // Integer rounding and modulo are not expressible as linear
                // constraints over continuous coefficients.
                BinOp::FloorDiv | BinOp::Rem => Err(LowerError::Nonlinear(expr.to_string())),
                BinOp::Pow => {
                    if right.is_constant() && right.constant == 1.0 {
                        Ok(left)
                    } else if right.is_constant() && right.constant == 0.0 {
                        Ok(LinearForm::from_constant(1.0))
                    } else {
                        Err(LowerError::Nonlinear(expr.to_string()))
                    }
                }
            }
        }
        RawExpr::Unary { op, expr: inner } => {
            let form = lower(inner)?;
            match op {
                UnaryOp::Neg => Ok(form.scale(-1.0)),
                UnaryOp::Pos => Ok(form),
                UnaryOp::Abs => {
                    if form.is_constant() {
                        Ok(LinearForm::from_constant(form.constant.abs()))
                    } else {
                        Err(LowerError::Nonlinear(expr.to_string()))
                    }
                }
            }
        }
        RawExpr::Cmp { .. } => Err(LowerError::UnexpectedRelation(expr.to_string())),
    }
}
