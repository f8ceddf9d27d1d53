//! Engine adapter for the Gurobi commercial solver.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error};

use ::gurobi::{attr, ConstrSense, Env, LinExpr, Model, ModelSense, Status, Var, VarType};

use super::{
    lower_relation, Engine, EngineError, EngineVariable, RowSense, SolutionStore,
};
use crate::algebra::linear::lower_expression;
use crate::algebra::{Expression, Term, Variable};
use crate::enums::{OptimizationType, SolutionStatus, ValueType};

const ENGINE_NAME: &str = "gurobi";

fn backend_error(error: ::gurobi::Error) -> EngineError {
    EngineError::Backend {
        engine: ENGINE_NAME,
        message: error.to_string(),
    }
}

/// Engine backed by Gurobi.
///
/// The native model is edited incrementally; every mutation is followed by
/// a lazy-update flush so later registrations can reference earlier
/// variables.
pub struct GurobiEngine {
    model: Model,
    vars: Vec<Var>,
    variables: Vec<Rc<EngineVariable>>,
    constraints: Vec<Expression>,
    objective: Option<(OptimizationType, Expression)>,
    store: Rc<RefCell<SolutionStore>>,
}

impl GurobiEngine {
    pub fn new() -> Result<Self, EngineError> {
        let env = Env::new("").map_err(backend_error)?;
        let model = Model::new("orkit", &env).map_err(backend_error)?;
        Ok(Self::with_model(model))
    }

    /// Wrap a caller-configured native Gurobi model (environment
    /// parameters, licensing options). Variables and constraints
    /// registered through this engine are added on top of it.
    pub fn with_model(model: Model) -> Self {
        Self {
            model,
            vars: Vec::new(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            store: Rc::new(RefCell::new(SolutionStore::default())),
        }
    }
}

impl Engine for GurobiEngine {
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

        let vtype = match value_type {
            ValueType::Continuous => VarType::Continuous,
            ValueType::Integer => VarType::Integer,
            ValueType::Binary => VarType::Binary,
        };
        let var = self
            .model
            .add_var(
                name,
                vtype,
                0.0,
                variable.lower_bound(),
                variable.upper_bound(),
                &[],
                &[],
            )
            .map_err(backend_error)?;
        self.model.update().map_err(backend_error)?;

        self.vars.push(var);
        self.variables.push(Rc::clone(&variable));
        Ok(variable)
    }

    fn add_constraint(&mut self, expression: Expression) -> Result<(), EngineError> {
        let (terms, sense, rhs) = lower_relation(&expression)?;

        let mut native = LinExpr::new();
        for (index, coeff) in terms {
            native = native.add_term(coeff, self.vars[index].clone());
        }
        let sense = match sense {
            RowSense::Equal => ConstrSense::Equal,
            RowSense::LessEqual => ConstrSense::Less,
            RowSense::GreaterEqual => ConstrSense::Greater,
        };
        self.model
            .add_constr("", native, sense, rhs)
            .map_err(backend_error)?;
        self.model.update().map_err(backend_error)?;

        self.constraints.push(expression);
        Ok(())
    }

    fn set_objective(
        &mut self,
        opt_type: OptimizationType,
        expression: Expression,
    ) -> Result<(), EngineError> {
        let form = lower_expression(expression.as_raw())?;

        let mut native = LinExpr::new();
        for (index, coeff) in &form.terms {
            native = native.add_term(*coeff, self.vars[*index].clone());
        }
        native = native.add_constant(form.constant);
        let sense = match opt_type {
            OptimizationType::Minimize => ModelSense::Minimize,
            OptimizationType::Maximize => ModelSense::Maximize,
        };
        self.model
            .set_objective(native, sense)
            .map_err(backend_error)?;

        self.objective = Some((opt_type, expression));
        Ok(())
    }

    fn solve(&mut self) -> Result<SolutionStatus, EngineError> {
        debug!(
            engine = ENGINE_NAME,
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "solving"
        );
        self.model.optimize().map_err(backend_error)?;

        let status = match self.model.status().map_err(backend_error)? {
            Status::Optimal => SolutionStatus::Optimal,
            Status::SubOptimal => SolutionStatus::Feasible,
            Status::Infeasible => SolutionStatus::Infeasible,
            Status::Unbounded => SolutionStatus::Error,
            other => {
                error!(
                    engine = ENGINE_NAME,
                    status = ?other,
                    "solver finished in an unrecognised state"
                );
                self.store.borrow_mut().record_failure(SolutionStatus::Error);
                return Err(EngineError::UnknownStatus {
                    engine: ENGINE_NAME,
                    status: format!("{:?}", other),
                });
            }
        };

        if status.has_solution() {
            let mut values = Vec::with_capacity(self.vars.len());
            for var in &self.vars {
                values.push(var.get(&self.model, attr::X).map_err(backend_error)?);
            }
            let objective = self.model.get(attr::ObjVal).map_err(backend_error)?;
            self.store
                .borrow_mut()
                .record_solution(status, values, objective);
        } else {
            self.store.borrow_mut().record_failure(status);
        }
        Ok(status)
    }

    fn solution_status(&self) -> SolutionStatus {
        self.store.borrow().status()
    }

    fn objective_value(&self) -> Option<f64> {
        self.store.borrow().objective()
    }

    fn objective_expr(&self) -> Option<&Expression> {
        self.objective.as_ref().map(|(_, expression)| expression)
    }

    fn constraints(&self) -> &[Expression] {
        &self.constraints
    }
}
