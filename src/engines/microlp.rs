//! Engine adapter for the pure-Rust microlp solver.
//!
//! microlp fixes a variable's objective coefficient at creation time, so
//! the native problem cannot be grown incrementally the way this interface
//! requires. The adapter keeps the registered expressions and rebuilds the
//! native problem on every [`solve`](Engine::solve) call.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use ::microlp::{ComparisonOp, OptimizationDirection, Problem};

use super::{
    lower_relation, Engine, EngineError, EngineVariable, RowSense, SolutionStore,
};
use crate::algebra::linear::{lower_expression, LinearForm};
use crate::algebra::{Expression, Term, Variable};
use crate::enums::{OptimizationType, SolutionStatus, ValueType};

const ENGINE_NAME: &str = "microlp";

type LoweredRow = (Vec<(usize, f64)>, RowSense, f64);

/// Engine backed by the microlp MILP solver.
pub struct MicrolpEngine {
    variables: Vec<Rc<EngineVariable>>,
    constraints: Vec<Expression>,
    rows: Vec<LoweredRow>,
    objective: Option<(OptimizationType, Expression, LinearForm)>,
    store: Rc<RefCell<SolutionStore>>,
}

impl MicrolpEngine {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            rows: Vec::new(),
            objective: None,
            store: Rc::new(RefCell::new(SolutionStore::default())),
        }
    }

    fn build_problem(&self) -> Result<(Problem, Vec<::microlp::Variable>, f64), EngineError> {
        let (direction, form) = match &self.objective {
            Some((OptimizationType::Maximize, _, form)) => {
                (OptimizationDirection::Maximize, Some(form))
            }
            Some((OptimizationType::Minimize, _, form)) => {
                (OptimizationDirection::Minimize, Some(form))
            }
            None => (OptimizationDirection::Minimize, None),
        };
        let constant = form.map_or(0.0, |form| form.constant);

        let mut problem = Problem::new(direction);
        let mut native = Vec::with_capacity(self.variables.len());
        for variable in &self.variables {
            let coeff = form
                .and_then(|form| form.terms.get(&variable.index()))
                .copied()
                .unwrap_or(0.0);
            let lower = variable.lower_bound();
            let upper = variable.upper_bound();
            let var = match variable.value_type() {
                ValueType::Continuous => problem.add_var(coeff, (lower, upper)),
                ValueType::Integer | ValueType::Binary => {
                    problem.add_integer_var(coeff, (int_bound(lower)?, int_bound(upper)?))
                }
            };
            native.push(var);
        }

        for (terms, sense, rhs) in &self.rows {
            let op = match sense {
                RowSense::Equal => ComparisonOp::Eq,
                RowSense::LessEqual => ComparisonOp::Le,
                RowSense::GreaterEqual => ComparisonOp::Ge,
            };
            problem.add_constraint(
                terms.iter().map(|(index, coeff)| (native[*index], *coeff)),
                op,
                *rhs,
            );
        }

        Ok((problem, native, constant))
    }
}

impl Default for MicrolpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MicrolpEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn add_variable(
        &mut self,
        name: &str,
        value_type: ValueType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Rc<dyn Variable>, EngineError> {
        let variable = EngineVariable::create(
            name,
            value_type,
            lower_bound,
            upper_bound,
            self.variables.len(),
            Rc::clone(&self.store),
        )?;
        self.variables.push(Rc::clone(&variable));
        Ok(variable)
    }

    fn add_constraint(&mut self, expression: Expression) -> Result<(), EngineError> {
        let row = lower_relation(&expression)?;
        self.rows.push(row);
        self.constraints.push(expression);
        Ok(())
    }

    fn set_objective(
        &mut self,
        opt_type: OptimizationType,
        expression: Expression,
    ) -> Result<(), EngineError> {
        let form = lower_expression(expression.as_raw())?;
        self.objective = Some((opt_type, expression, form));
        Ok(())
    }

    fn solve(&mut self) -> Result<SolutionStatus, EngineError> {
        debug!(
            engine = ENGINE_NAME,
            variables = self.variables.len(),
            constraints = self.rows.len(),
            "solving"
        );
        let (problem, native, constant) = self.build_problem()?;
        match problem.solve() {
            Ok(solution) => {
                let values = self
                    .variables
                    .iter()
                    .zip(&native)
                    .map(|(variable, var)| match variable.value_type() {
                        ValueType::Continuous => solution[*var],
                        ValueType::Integer | ValueType::Binary => {
                            solution.var_value_rounded(*var)
                        }
                    })
                    .collect();
                let objective = solution.objective() + constant;
                self.store.borrow_mut().record_solution(
                    SolutionStatus::Optimal,
                    values,
                    objective,
                );
                Ok(SolutionStatus::Optimal)
            }
            Err(::microlp::Error::Infeasible) => {
                self.store
                    .borrow_mut()
                    .record_failure(SolutionStatus::Infeasible);
                Ok(SolutionStatus::Infeasible)
            }
            Err(::microlp::Error::Unbounded) => {
                self.store.borrow_mut().record_failure(SolutionStatus::Error);
                Ok(SolutionStatus::Error)
            }
            Err(::microlp::Error::InternalError(message)) => {
                self.store.borrow_mut().record_failure(SolutionStatus::Error);
                Err(EngineError::Backend {
                    engine: ENGINE_NAME,
                    message,
                })
            }
        }
    }

    fn solution_status(&self) -> SolutionStatus {
        self.store.borrow().status()
    }

    fn objective_value(&self) -> Option<f64> {
        self.store.borrow().objective()
    }

    fn objective_expr(&self) -> Option<&Expression> {
        self.objective.as_ref().map(|(_, expression, _)| expression)
    }

    fn constraints(&self) -> &[Expression] {
        &self.constraints
    }
}

fn int_bound(bound: f64) -> Result<i32, EngineError> {
    if bound.is_infinite() {
        return Ok(if bound > 0.0 { i32::MAX } else { i32::MIN });
    }
    if bound < i32::MIN as f64 || bound > i32::MAX as f64 {
        return Err(EngineError::Backend {
            engine: ENGINE_NAME,
            message: format!("integer bound {bound} exceeds the solver's i32 range"),
        });
    }
    Ok(bound as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{is_unsolved, Element, Term};
    use crate::constraint;

    #[test]
    fn starts_unsolved() {
        let engine = MicrolpEngine::new();
        assert_eq!(engine.solution_status(), SolutionStatus::NotSolved);
        assert_eq!(engine.objective_value(), None);
    }

    #[test]
    fn solves_integer_program_to_optimality() {
        let mut engine = MicrolpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Integer, 0.0, f64::INFINITY)
            .unwrap();
        let y = engine
            .add_variable("y", ValueType::Integer, 0.0, f64::INFINITY)
            .unwrap();
        assert!(is_unsolved(x.value()));

        engine
            .add_constraint(constraint!((&*x + 7.0 * &*y) <= 17.5))
            .unwrap();
        engine.add_constraint(constraint!((&*x) <= 3.5)).unwrap();
        engine
            .set_objective(OptimizationType::Maximize, &*x + 10.0 * &*y)
            .unwrap();

        let status = engine.solve().unwrap();
        assert_eq!(status, SolutionStatus::Optimal);
        let objective = engine.objective_value().unwrap();
        assert!((objective - 23.0).abs() < 1e-6, "objective was {objective}");
        assert_eq!(x.value(), 3.0);
        assert_eq!(y.value(), 2.0);
    }

    #[test]
    fn rejects_bounds_without_a_finite_value() {
        let mut engine = MicrolpEngine::new();
        assert!(engine
            .add_variable("x", ValueType::Continuous, f64::INFINITY, f64::INFINITY)
            .is_err());
        assert!(engine
            .add_variable("y", ValueType::Continuous, f64::NEG_INFINITY, f64::NEG_INFINITY)
            .is_err());
    }

    #[test]
    fn integer_bounds_beyond_i32_are_rejected() {
        let mut engine = MicrolpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Integer, 0.0, 1e12)
            .unwrap();
        engine.add_constraint(constraint!((&*x) >= 0.0)).unwrap();
        engine
            .set_objective(OptimizationType::Minimize, x.build())
            .unwrap();

        assert!(matches!(
            engine.solve(),
            Err(EngineError::Backend { .. })
        ));
        assert_eq!(int_bound(f64::INFINITY).unwrap(), i32::MAX);
        assert_eq!(int_bound(f64::NEG_INFINITY).unwrap(), i32::MIN);
        assert!(int_bound(-1e12).is_err());
    }

    #[test]
    fn reports_infeasibility() {
        let mut engine = MicrolpEngine::new();
        let a = engine
            .add_variable("a", ValueType::Binary, 0.0, 1.0)
            .unwrap();
        let b = engine
            .add_variable("b", ValueType::Binary, 0.0, 1.0)
            .unwrap();

        engine
            .add_constraint(constraint!((2.0 * &*a) >= 5.0))
            .unwrap();
        engine
            .set_objective(OptimizationType::Minimize, 2.0 * &*a - &*b + 2.0)
            .unwrap();

        let status = engine.solve().unwrap();
        assert_eq!(status, SolutionStatus::Infeasible);
        assert_eq!(engine.solution_status(), SolutionStatus::Infeasible);
        assert_eq!(engine.objective_value(), None);
        assert!(is_unsolved(a.value()));
        assert!(is_unsolved(b.value()));
    }

    #[test]
    fn objective_constant_is_included() {
        let mut engine = MicrolpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Continuous, 0.0, 10.0)
            .unwrap();
        engine.add_constraint(constraint!((&*x) >= 4.0)).unwrap();
        engine
            .set_objective(OptimizationType::Minimize, &*x + 100.0)
            .unwrap();

        assert_eq!(engine.solve().unwrap(), SolutionStatus::Optimal);
        let objective = engine.objective_value().unwrap();
        assert!((objective - 104.0).abs() < 1e-6, "objective was {objective}");
    }

    #[test]
    fn resolving_after_new_constraint_updates_solution() {
        let mut engine = MicrolpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Continuous, 0.0, 10.0)
            .unwrap();
        engine
            .set_objective(OptimizationType::Maximize, x.build())
            .unwrap();

        assert_eq!(engine.solve().unwrap(), SolutionStatus::Optimal);
        assert_eq!(x.value(), 10.0);

        engine.add_constraint(constraint!((&*x) <= 4.0)).unwrap();
        assert_eq!(engine.solve().unwrap(), SolutionStatus::Optimal);
        assert_eq!(x.value(), 4.0);
    }

    #[test]
    fn strict_comparison_on_continuous_variable() {
        let mut engine = MicrolpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Continuous, 0.0, 10.0)
            .unwrap();
        engine.add_constraint(constraint!((&*x) > 2.0)).unwrap();
        engine
            .set_objective(OptimizationType::Minimize, x.build())
            .unwrap();

        assert_eq!(engine.solve().unwrap(), SolutionStatus::Optimal);
        assert!(x.value() > 2.0);
    }

    #[test]
    fn nonlinear_constraint_is_rejected_at_registration() {
        let mut engine = MicrolpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Continuous, 0.0, 10.0)
            .unwrap();
        let y = engine
            .add_variable("y", ValueType::Continuous, 0.0, 10.0)
            .unwrap();
        let relation = constraint!((&*x * &*y) <= 5.0);
        assert!(engine.add_constraint(relation).is_err());
        assert!(engine.constraints().is_empty());
    }
}
