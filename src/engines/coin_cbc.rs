//! Engine adapter for COIN-OR CBC.
//!
//! CBC accepts incremental model edits, so variables and rows go straight
//! into the native model as they are registered. CBC is also verbose on
//! stdout; solving happens under a [`MuteHandle`] so solver chatter never
//! reaches the terminal.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error};

use ::coin_cbc::{Col, Model, Sense};

use super::output_suppression::MuteHandle;
use super::{
    lower_relation, Engine, EngineError, EngineVariable, RowSense, SolutionStore,
};
use crate::algebra::linear::{lower_expression, LinearForm};
use crate::algebra::{Expression, Term, Variable};
use crate::enums::{OptimizationType, SolutionStatus, ValueType};

const ENGINE_NAME: &str = "coin_cbc";

/// Round to a number of significant digits, masking CBC floating noise.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

/// Engine backed by the COIN-OR CBC solver.
pub struct CbcEngine {
    model: Model,
    cols: Vec<Col>,
    variables: Vec<Rc<EngineVariable>>,
    constraints: Vec<Expression>,
    objective: Option<(OptimizationType, Expression, LinearForm)>,
    store: Rc<RefCell<SolutionStore>>,
}

impl CbcEngine {
    pub fn new() -> Self {
        Self::with_model(Model::default())
    }

    /// Wrap a caller-configured native CBC model (solver parameters,
    /// tolerances). Variables and rows registered through this engine are
    /// added on top of it.
    pub fn with_model(model: Model) -> Self {
        Self {
            model,
            cols: Vec::new(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            store: Rc::new(RefCell::new(SolutionStore::default())),
        }
    }
}

impl Default for CbcEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for CbcEngine {
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

        let col = match value_type {
            ValueType::Continuous => self.model.add_col(),
            ValueType::Integer | ValueType::Binary => self.model.add_integer(),
        };
        self.model.set_col_lower(col, variable.lower_bound());
        self.model.set_col_upper(col, variable.upper_bound());

        self.cols.push(col);
        self.variables.push(Rc::clone(&variable));
        Ok(variable)
    }

    fn add_constraint(&mut self, expression: Expression) -> Result<(), EngineError> {
        let (terms, sense, rhs) = lower_relation(&expression)?;

        let row = self.model.add_row();
        for (index, coeff) in terms {
            self.model.set_weight(row, self.cols[index], coeff);
        }
        match sense {
            RowSense::Equal => self.model.set_row_equal(row, rhs),
            RowSense::LessEqual => self.model.set_row_upper(row, rhs),
            RowSense::GreaterEqual => self.model.set_row_lower(row, rhs),
        }

        self.constraints.push(expression);
        Ok(())
    }

    fn set_objective(
        &mut self,
        opt_type: OptimizationType,
        expression: Expression,
    ) -> Result<(), EngineError> {
        let form = lower_expression(expression.as_raw())?;

        // Replacing the objective resets every coefficient first.
        for col in &self.cols {
            self.model.set_obj_coeff(*col, 0.0);
        }
        for (index, coeff) in &form.terms {
            self.model.set_obj_coeff(self.cols[*index], *coeff);
        }
        self.model.set_obj_sense(match opt_type {
            OptimizationType::Minimize => Sense::Minimize,
            OptimizationType::Maximize => Sense::Maximize,
        });

        self.objective = Some((opt_type, expression, form));
        Ok(())
    }

    fn solve(&mut self) -> Result<SolutionStatus, EngineError> {
        debug!(
            engine = ENGINE_NAME,
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "solving"
        );
        let _mute = MuteHandle::stdout().map_err(|error| EngineError::Backend {
            engine: ENGINE_NAME,
            message: error.to_string(),
        })?;
        let solution = self.model.solve();

        if solution.raw().is_proven_optimal() {
            let values: Vec<f64> = self
                .cols
                .iter()
                .map(|col| round_to_sig_digits(solution.col(*col), 8))
                .collect();
            let objective = self.objective.as_ref().map_or(0.0, |(_, _, form)| {
                let total = form.constant
                    + form
                        .terms
                        .iter()
                        .map(|(index, coeff)| coeff * values[*index])
                        .sum::<f64>();
                round_to_sig_digits(total, 8)
            });
            self.store
                .borrow_mut()
                .record_solution(SolutionStatus::Optimal, values, objective);
            Ok(SolutionStatus::Optimal)
        } else if solution.raw().is_proven_infeasible() {
            self.store
                .borrow_mut()
                .record_failure(SolutionStatus::Infeasible);
            Ok(SolutionStatus::Infeasible)
        } else {
            error!(
                engine = ENGINE_NAME,
                status = ?solution.raw().status(),
                "solver finished in an unrecognised state"
            );
            self.store.borrow_mut().record_failure(SolutionStatus::Error);
            Err(EngineError::UnknownStatus {
                engine: ENGINE_NAME,
                status: format!("{:?}", solution.raw().status()),
            })
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
