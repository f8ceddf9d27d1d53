//! Engine adapter for the good_lp modelling front end.
//!
//! good_lp consumes its variable pool when a problem is built, so this
//! adapter, like the microlp one, keeps the registered expressions and
//! rebuilds the native problem on every solve. The microlp backend of
//! good_lp does the actual solving.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use ::good_lp::{
    variable, Expression as LpExpression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable as LpVariable,
};

use super::{
    lower_relation, Engine, EngineError, EngineVariable, RowSense, SolutionStore,
};
use crate::algebra::linear::{lower_expression, LinearForm};
use crate::algebra::{Expression, Term, Variable};
use crate::enums::{OptimizationType, SolutionStatus, ValueType};

const ENGINE_NAME: &str = "good_lp";

type LoweredRow = (Vec<(usize, f64)>, RowSense, f64);

/// Engine backed by good_lp's microlp solver.
pub struct GoodLpEngine {
    variables: Vec<Rc<EngineVariable>>,
    constraints: Vec<Expression>,
    rows: Vec<LoweredRow>,
    objective: Option<(OptimizationType, Expression, LinearForm)>,
    store: Rc<RefCell<SolutionStore>>,
}

impl GoodLpEngine {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            rows: Vec::new(),
            objective: None,
            store: Rc::new(RefCell::new(SolutionStore::default())),
        }
    }

    fn native_variables(&self, problem: &mut ProblemVariables) -> Vec<LpVariable> {
        self.variables
            .iter()
            .map(|var| {
                let mut definition = variable().name(var.name());
                definition = match var.value_type() {
                    ValueType::Binary => definition.binary(),
                    ValueType::Integer => definition.integer(),
                    ValueType::Continuous => definition,
                };
                if var.lower_bound().is_finite() {
                    definition = definition.min(var.lower_bound());
                }
                if var.upper_bound().is_finite() {
                    definition = definition.max(var.upper_bound());
                }
                problem.add(definition)
            })
            .collect()
    }

    fn row_expression(terms: &[(usize, f64)], native: &[LpVariable]) -> LpExpression {
        let mut expression = LpExpression::from_other_affine(0.0);
        for (index, coeff) in terms {
            expression += *coeff * native[*index];
        }
        expression
    }
}

impl Default for GoodLpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for GoodLpEngine {
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
        let mut problem = ProblemVariables::new();
        let native = self.native_variables(&mut problem);

        let (direction, form) = match &self.objective {
            Some((direction, _, form)) => (*direction, Some(form.clone())),
            None => (OptimizationType::Minimize, None),
        };
        let mut objective = LpExpression::from_other_affine(0.0);
        if let Some(form) = &form {
            for (index, coeff) in &form.terms {
                objective += *coeff * native[*index];
            }
        }

        let mut model = match direction {
            OptimizationType::Minimize => problem.minimise(objective).using(::good_lp::microlp),
            OptimizationType::Maximize => problem.maximise(objective).using(::good_lp::microlp),
        };
        for (terms, sense, rhs) in &self.rows {
            let lhs = Self::row_expression(terms, &native);
            let constraint = match sense {
                RowSense::Equal => ::good_lp::constraint::eq(lhs, *rhs),
                RowSense::LessEqual => ::good_lp::constraint::leq(lhs, *rhs),
                RowSense::GreaterEqual => ::good_lp::constraint::geq(lhs, *rhs),
            };
            model.add_constraint(constraint);
        }

        match model.solve() {
            Ok(solution) => {
                let values: Vec<f64> = self
                    .variables
                    .iter()
                    .zip(&native)
                    .map(|(var, lp_var)| match var.value_type() {
                        ValueType::Continuous => solution.value(*lp_var),
                        ValueType::Integer | ValueType::Binary => solution.value(*lp_var).round(),
                    })
                    .collect();
                let objective = form.map_or(0.0, |form| {
                    form.constant
                        + form
                            .terms
                            .iter()
                            .map(|(index, coeff)| coeff * solution.value(native[*index]))
                            .sum::<f64>()
                });
                self.store.borrow_mut().record_solution(
                    SolutionStatus::Optimal,
                    values,
                    objective,
                );
                Ok(SolutionStatus::Optimal)
            }
            Err(ResolutionError::Infeasible) => {
                self.store
                    .borrow_mut()
                    .record_failure(SolutionStatus::Infeasible);
                Ok(SolutionStatus::Infeasible)
            }
            Err(ResolutionError::Unbounded) => {
                self.store.borrow_mut().record_failure(SolutionStatus::Error);
                Ok(SolutionStatus::Error)
            }
            Err(error) => {
                self.store.borrow_mut().record_failure(SolutionStatus::Error);
                Err(EngineError::Backend {
                    engine: ENGINE_NAME,
                    message: error.to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{is_unsolved, Element, Term};
    use crate::constraint;

    #[test]
    fn solves_integer_program_to_optimality() {
        let mut engine = GoodLpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Integer, 0.0, f64::INFINITY)
            .unwrap();
        let y = engine
            .add_variable("y", ValueType::Integer, 0.0, f64::INFINITY)
            .unwrap();

        engine
            .add_constraint(constraint!((&*x + 7.0 * &*y) <= 17.5))
            .unwrap();
        engine.add_constraint(constraint!((&*x) <= 3.5)).unwrap();
        engine
            .set_objective(OptimizationType::Maximize, &*x + 10.0 * &*y)
            .unwrap();

        assert_eq!(engine.solve().unwrap(), SolutionStatus::Optimal);
        let objective = engine.objective_value().unwrap();
        assert!((objective - 23.0).abs() < 1e-6, "objective was {objective}");
        assert_eq!(x.value(), 3.0);
        assert_eq!(y.value(), 2.0);
    }

    #[test]
    fn reports_infeasibility() {
        let mut engine = GoodLpEngine::new();
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

        assert_eq!(engine.solve().unwrap(), SolutionStatus::Infeasible);
        assert!(is_unsolved(a.value()));
        assert_eq!(engine.objective_value(), None);
    }

    #[test]
    fn continuous_bounds_are_honoured() {
        let mut engine = GoodLpEngine::new();
        let x = engine
            .add_variable("x", ValueType::Continuous, 1.5, 6.0)
            .unwrap();
        engine
            .set_objective(OptimizationType::Minimize, x.build())
            .unwrap();

        assert_eq!(engine.solve().unwrap(), SolutionStatus::Optimal);
        assert!((x.value() - 1.5).abs() < 1e-9);
    }
}
