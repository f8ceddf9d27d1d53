//! Solver engine abstraction layer.
//!
//! An [`Engine`] wraps one concrete solver behind a uniform interface:
//! create variables, register relational expressions as constraints, set an
//! objective and solve. Model code works against `Box<dyn Engine>` and stays
//! independent of which backend was compiled in.
//!
//! # Engine selection
//!
//! The backend can be selected via the `ORKIT_ENGINE` environment variable:
//! - `"microlp"` - pure-Rust MILP solver (requires `microlp` feature)
//! - `"good_lp"` - good_lp modelling front end (requires `good_lp` feature)
//! - `"coin_cbc"` or `"cbc"` - COIN-OR CBC (requires `coin_cbc` feature)
//! - `"gurobi"` - Gurobi commercial solver (requires `gurobi` feature)
//!
//! If unset, the first compiled-in backend wins, in the order microlp,
//! good_lp, gurobi, coin_cbc.

use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::sync::Arc;

use itertools::Itertools;
use thiserror::Error;

use crate::algebra::linear::{LinearConstraint, LowerError};
use crate::algebra::{
    prepare_bounds, CmpOp, Element, Expression, RawExpr, Term, TermError, VarRef, Variable,
    UNSOLVED,
};
use crate::enums::{OptimizationType, SolutionStatus, TermType, ValueType};

#[cfg(feature = "microlp")]
pub mod microlp;

#[cfg(feature = "good_lp")]
pub mod good_lp;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;

#[cfg(feature = "coin_cbc")]
pub mod output_suppression;

#[cfg(feature = "gurobi")]
pub mod gurobi;

/// Environment variable controlling backend selection.
pub const ENGINE_ENV: &str = "ORKIT_ENGINE";

/// Offset applied to encode strict inequalities on continuous solvers.
pub(crate) const STRICT_OFFSET: f64 = 1e-10;

/// Errors raised by engines and the backend selection logic.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Term(#[from] TermError),
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error("comparison '{0}' has no linear encoding")]
    UnsupportedComparison(&'static str),
    #[error("engine '{0}' requested via {ENGINE_ENV} but its feature is not enabled")]
    DisabledEngine(String),
    #[error("unknown engine '{0}' in {ENGINE_ENV}; valid options: microlp, good_lp, coin_cbc, gurobi")]
    UnknownEngine(String),
    #[error("no solver engine enabled at build time")]
    NoEngine,
    #[error("{engine} reported an unrecognised status: {status}")]
    UnknownStatus {
        engine: &'static str,
        status: String,
    },
    #[error("{engine} failed: {message}")]
    Backend {
        engine: &'static str,
        message: String,
    },
}

/// Uniform interface over concrete solver backends.
///
/// Status translation happens inside [`solve`](Engine::solve): a native
/// status the adapter does not recognise is a hard error there, never a
/// silent [`SolutionStatus::Error`]. The accessors afterwards are
/// infallible reads of the last recorded outcome.
pub trait Engine {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Create a solver variable and return it as a shared term.
    fn add_variable(
        &mut self,
        name: &str,
        value_type: ValueType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Rc<dyn Variable>, EngineError>;

    /// Register a relational expression as a constraint.
    fn add_constraint(&mut self, expression: Expression) -> Result<(), EngineError>;

    /// Set the objective function and optimization direction.
    fn set_objective(
        &mut self,
        opt_type: OptimizationType,
        expression: Expression,
    ) -> Result<(), EngineError>;

    /// Run the solver, record the outcome and return the new status.
    fn solve(&mut self) -> Result<SolutionStatus, EngineError>;

    /// Status of the last solve, [`SolutionStatus::NotSolved`] initially.
    fn solution_status(&self) -> SolutionStatus;

    /// Objective value of the last solve, if a solution is available.
    fn objective_value(&self) -> Option<f64>;

    /// The registered objective expression, if any.
    fn objective_expr(&self) -> Option<&Expression>;

    /// All registered constraints, in insertion order.
    fn constraints(&self) -> &[Expression];
}

/// Build the backend selected by [`ENGINE_ENV`], or the default one.
pub fn default_engine() -> Result<Box<dyn Engine>, EngineError> {
    EngineKind::from_env_or_default()?.create()
}

/// Compiled-in solver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    #[cfg(feature = "microlp")]
    Microlp,
    #[cfg(feature = "good_lp")]
    GoodLp,
    #[cfg(feature = "coin_cbc")]
    CoinCbc,
    #[cfg(feature = "gurobi")]
    Gurobi,
}

impl EngineKind {
    /// Resolve a backend by name, as used in [`ENGINE_ENV`].
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name.to_lowercase().as_str() {
            "microlp" => {
                #[cfg(feature = "microlp")]
                return Ok(EngineKind::Microlp);
                #[cfg(not(feature = "microlp"))]
                return Err(EngineError::DisabledEngine(name.to_owned()));
            }
            "good_lp" | "good-lp" | "goodlp" => {
                #[cfg(feature = "good_lp")]
                return Ok(EngineKind::GoodLp);
                #[cfg(not(feature = "good_lp"))]
                return Err(EngineError::DisabledEngine(name.to_owned()));
            }
            "coin_cbc" | "coin-cbc" | "cbc" => {
                #[cfg(feature = "coin_cbc")]
                return Ok(EngineKind::CoinCbc);
                #[cfg(not(feature = "coin_cbc"))]
                return Err(EngineError::DisabledEngine(name.to_owned()));
            }
            "gurobi" => {
                #[cfg(feature = "gurobi")]
                return Ok(EngineKind::Gurobi);
                #[cfg(not(feature = "gurobi"))]
                return Err(EngineError::DisabledEngine(name.to_owned()));
            }
            _ => Err(EngineError::UnknownEngine(name.to_owned())),
        }
    }

    /// Resolve the backend from the environment, falling back to the first
    /// compiled-in one.
    pub fn from_env_or_default() -> Result<Self, EngineError> {
        if let Ok(name) = env::var(ENGINE_ENV) {
            return Self::from_name(&name);
        }

        #[cfg(feature = "microlp")]
        return Ok(EngineKind::Microlp);

        #[allow(unreachable_code)]
        #[cfg(feature = "good_lp")]
        return Ok(EngineKind::GoodLp);

        #[allow(unreachable_code)]
        #[cfg(feature = "gurobi")]
        return Ok(EngineKind::Gurobi);

        #[allow(unreachable_code)]
        #[cfg(feature = "coin_cbc")]
        return Ok(EngineKind::CoinCbc);

        #[cfg(not(any(
            feature = "microlp",
            feature = "good_lp",
            feature = "coin_cbc",
            feature = "gurobi"
        )))]
        Err(EngineError::NoEngine)
    }

    /// Instantiate an empty engine of this kind.
    pub fn create(self) -> Result<Box<dyn Engine>, EngineError> {
        match self {
            #[cfg(feature = "microlp")]
            EngineKind::Microlp => Ok(Box::new(microlp::MicrolpEngine::new())),
            #[cfg(feature = "good_lp")]
            EngineKind::GoodLp => Ok(Box::new(good_lp::GoodLpEngine::new())),
            #[cfg(feature = "coin_cbc")]
            EngineKind::CoinCbc => Ok(Box::new(coin_cbc::CbcEngine::new())),
            #[cfg(feature = "gurobi")]
            EngineKind::Gurobi => Ok(Box::new(gurobi::GurobiEngine::new()?)),
        }
    }
}

/// Solution state shared between an engine and the variables it created.
#[derive(Debug, Default)]
pub(crate) struct SolutionStore {
    status: SolutionStatus,
    values: Vec<f64>,
    objective: Option<f64>,
}

impl SolutionStore {
    pub(crate) fn status(&self) -> SolutionStatus {
        self.status
    }

    pub(crate) fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Variable value by creation index, [`UNSOLVED`] without a solution.
    pub(crate) fn value_of(&self, index: usize) -> f64 {
        if self.status.has_solution() {
            self.values.get(index).copied().unwrap_or(UNSOLVED)
        } else {
            UNSOLVED
        }
    }

    /// Record a solve outcome that produced no usable solution.
    pub(crate) fn record_failure(&mut self, status: SolutionStatus) {
        self.status = status;
        self.values.clear();
        self.objective = None;
    }

    /// Record a solve outcome carrying a solution.
    pub(crate) fn record_solution(
        &mut self,
        status: SolutionStatus,
        values: Vec<f64>,
        objective: f64,
    ) {
        self.status = status;
        self.values = values;
        self.objective = Some(objective);
    }
}

/// A decision variable backed by a shared [`SolutionStore`].
///
/// All engines create their variables through this type; only the way the
/// store gets filled differs per backend.
#[derive(Debug)]
pub(crate) struct EngineVariable {
    name: Arc<str>,
    value_type: ValueType,
    lower_bound: f64,
    upper_bound: f64,
    index: usize,
    store: Rc<RefCell<SolutionStore>>,
}

impl EngineVariable {
    /// Validate bounds and create the variable.
    pub(crate) fn create(
        name: &str,
        value_type: ValueType,
        lower_bound: f64,
        upper_bound: f64,
        index: usize,
        store: Rc<RefCell<SolutionStore>>,
    ) -> Result<Rc<Self>, TermError> {
        let (lower_bound, upper_bound) = prepare_bounds(name, value_type, lower_bound, upper_bound)?;
        Ok(Rc::new(Self {
            name: Arc::from(name),
            value_type,
            lower_bound,
            upper_bound,
            index,
            store,
        }))
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl Element for EngineVariable {
    fn raw(&self) -> RawExpr {
        RawExpr::Var(VarRef::new(self.index, Arc::clone(&self.name)))
    }
}

impl Term for EngineVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn term_type(&self) -> TermType {
        TermType::Variable
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    fn value(&self) -> f64 {
        self.store.borrow().value_of(self.index)
    }
}

impl Variable for EngineVariable {}

/// Relational sense after strictness normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowSense {
    Equal,
    LessEqual,
    GreaterEqual,
}

/// Decompose a lowered constraint into solver-ready parts.
///
/// Returns `(terms, sense, rhs)` with terms sorted by variable index.
/// Strict inequalities are encoded by nudging the right-hand side by
/// [`STRICT_OFFSET`]; `!=` has no linear encoding and is rejected.
pub(crate) fn constraint_parts(
    constraint: &LinearConstraint,
) -> Result<(Vec<(usize, f64)>, RowSense, f64), EngineError> {
    let terms: Vec<(usize, f64)> = constraint
        .lhs
        .terms
        .iter()
        .map(|(index, coeff)| (*index, *coeff))
        .sorted_by_key(|(index, _)| *index)
        .collect();
    let rhs = -constraint.lhs.constant;
    let (sense, rhs) = match constraint.op {
        CmpOp::Eq => (RowSense::Equal, rhs),
        CmpOp::Le => (RowSense::LessEqual, rhs),
        CmpOp::Ge => (RowSense::GreaterEqual, rhs),
        CmpOp::Lt => (RowSense::LessEqual, rhs - STRICT_OFFSET),
        CmpOp::Gt => (RowSense::GreaterEqual, rhs + STRICT_OFFSET),
        CmpOp::Ne => return Err(EngineError::UnsupportedComparison("!=")),
    };
    Ok((terms, sense, rhs))
}

/// Lower and validate a relational expression for an engine.
pub(crate) fn lower_relation(
    expression: &Expression,
) -> Result<(Vec<(usize, f64)>, RowSense, f64), EngineError> {
    let constraint = crate::algebra::linear::lower_constraint(expression.as_raw())?;
    constraint_parts(&constraint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::linear::lower_constraint;
    use crate::constraint;

    fn store() -> Rc<RefCell<SolutionStore>> {
        Rc::new(RefCell::new(SolutionStore::default()))
    }

    #[test]
    fn from_name_rejects_unknown_engines() {
        assert!(matches!(
            EngineKind::from_name("simplexpress"),
            Err(EngineError::UnknownEngine(_))
        ));
    }

    #[cfg(feature = "microlp")]
    #[test]
    fn from_name_accepts_case_insensitive_names() {
        assert_eq!(
            EngineKind::from_name("MicroLP").unwrap(),
            EngineKind::Microlp
        );
    }

    #[test]
    fn variable_reports_unsolved_before_any_solve() {
        let var =
            EngineVariable::create("x", ValueType::Continuous, 0.0, 10.0, 0, store()).unwrap();
        assert!(crate::algebra::is_unsolved(var.value()));
    }

    #[test]
    fn variable_reads_store_after_solution() {
        let store = store();
        let var =
            EngineVariable::create("x", ValueType::Continuous, 0.0, 10.0, 0, Rc::clone(&store))
                .unwrap();
        store
            .borrow_mut()
            .record_solution(SolutionStatus::Optimal, vec![3.0], 3.0);
        assert_eq!(var.value(), 3.0);
    }

    #[test]
    fn failed_solve_clears_previous_solution() {
        let store = store();
        let var =
            EngineVariable::create("x", ValueType::Continuous, 0.0, 10.0, 0, Rc::clone(&store))
                .unwrap();
        store
            .borrow_mut()
            .record_solution(SolutionStatus::Optimal, vec![3.0], 3.0);
        store.borrow_mut().record_failure(SolutionStatus::Infeasible);
        assert!(crate::algebra::is_unsolved(var.value()));
        assert_eq!(store.borrow().objective(), None);
    }

    #[test]
    fn binary_variable_clamps_infinite_upper_bound() {
        let var =
            EngineVariable::create("b", ValueType::Binary, 0.0, f64::INFINITY, 0, store()).unwrap();
        assert_eq!(var.lower_bound(), 0.0);
        assert_eq!(var.upper_bound(), 1.0);
    }

    #[test]
    fn constraint_parts_normalises_strict_senses() {
        let var =
            EngineVariable::create("x", ValueType::Continuous, 0.0, 10.0, 0, store()).unwrap();
        let relation = constraint!((&*var) > 1.0);
        let lowered = lower_constraint(relation.as_raw()).unwrap();
        let (terms, sense, rhs) = constraint_parts(&lowered).unwrap();
        assert_eq!(terms, vec![(0, 1.0)]);
        assert_eq!(sense, RowSense::GreaterEqual);
        assert!(rhs > 1.0);
    }

    #[test]
    fn not_equal_constraints_are_rejected() {
        let var =
            EngineVariable::create("x", ValueType::Continuous, 0.0, 10.0, 0, store()).unwrap();
        let relation = constraint!((&*var) != 1.0);
        assert!(matches!(
            lower_relation(&relation),
            Err(EngineError::UnsupportedComparison("!="))
        ));
    }
}
