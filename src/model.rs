//! Solver-agnostic optimization model.
//!
//! [`Model`] bundles an [`Engine`] with the bookkeeping around it:
//! named dimensions, a registry of terms, and indexed term sets. All
//! algebra goes through the engine's variables, so the same model code
//! runs unchanged on any backend.

use std::collections::BTreeMap;
use std::rc::Rc;

use prettytable::*;
use thiserror::Error;
use tracing::debug;

use crate::algebra::{Constant, Expression, Term, TermError, Variable};
use crate::engines::{default_engine, Engine, EngineError};
use crate::enums::{OptimizationType, SolutionStatus, ValueType};

/// Number of decimals used when printing term values.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Failures of the model bookkeeping layer.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("a term named {0:?} is already registered")]
    DuplicateTerm(String),
    #[error("term set {set_name:?} already has an entry at index {index:?}")]
    DuplicateSetEntry { set_name: String, index: Vec<usize> },
    #[error("term set name cannot be empty")]
    EmptySetName,
    #[error("dimension name cannot be empty")]
    EmptyDimensionName,
    #[error("dimension {name:?} must have a positive size, got {size}")]
    InvalidDimension { name: String, size: usize },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Term(#[from] TermError),
}

/// An optimization model bound to a concrete engine.
pub struct Model {
    name: String,
    engine: Box<dyn Engine>,
    dimensions: BTreeMap<String, usize>,
    terms: BTreeMap<String, Rc<dyn Term>>,
    term_sets: BTreeMap<String, BTreeMap<Vec<usize>, Rc<dyn Term>>>,
    float_precision: usize,
}

impl Model {
    /// Build a model around the engine selected by `ORKIT_ENGINE`.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        Ok(Self::with_engine(name, default_engine()?))
    }

    /// Build a model around an explicit engine instance.
    pub fn with_engine(name: &str, engine: Box<dyn Engine>) -> Self {
        debug!(model = name, engine = engine.name(), "creating model");
        Self {
            name: name.to_owned(),
            engine,
            dimensions: BTreeMap::new(),
            terms: BTreeMap::new(),
            term_sets: BTreeMap::new(),
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn float_precision(&self) -> usize {
        self.float_precision
    }

    pub fn set_float_precision(&mut self, float_precision: usize) {
        self.float_precision = float_precision;
    }

    /// Register a named dimension. The name must be non-empty and the
    /// size positive.
    pub fn add_dimension(&mut self, name: &str, size: usize) -> Result<(), ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyDimensionName);
        }
        if size == 0 {
            return Err(ModelError::InvalidDimension {
                name: name.to_owned(),
                size,
            });
        }
        self.dimensions.insert(name.to_owned(), size);
        Ok(())
    }

    /// Size of a dimension, or 0 when it was never registered.
    pub fn dimension(&self, name: &str) -> usize {
        self.dimensions.get(name).copied().unwrap_or(0)
    }

    pub fn dimensions(&self) -> &BTreeMap<String, usize> {
        &self.dimensions
    }

    /// Look up a registered term by name. Set members are reachable here
    /// too, under their rendered indexed names.
    pub fn term(&self, name: &str) -> Option<&Rc<dyn Term>> {
        self.terms.get(name)
    }

    pub fn terms(&self) -> &BTreeMap<String, Rc<dyn Term>> {
        &self.terms
    }

    pub fn term_set(&self, set_name: &str) -> Option<&BTreeMap<Vec<usize>, Rc<dyn Term>>> {
        self.term_sets.get(set_name)
    }

    pub fn term_sets(&self) -> &BTreeMap<String, BTreeMap<Vec<usize>, Rc<dyn Term>>> {
        &self.term_sets
    }

    fn register_term(&mut self, name: &str, term: Rc<dyn Term>) -> Result<(), ModelError> {
        if self.terms.contains_key(name) {
            return Err(ModelError::DuplicateTerm(name.to_owned()));
        }
        self.terms.insert(name.to_owned(), term);
        Ok(())
    }

    /// Register a constant term.
    pub fn add_constant(
        &mut self,
        name: &str,
        value_type: ValueType,
        value: f64,
    ) -> Result<Rc<Constant>, ModelError> {
        if self.terms.contains_key(name) {
            return Err(ModelError::DuplicateTerm(name.to_owned()));
        }
        let constant = Rc::new(Constant::new(name, value_type, value)?);
        debug!(model = %self.name, term = name, value, "adding constant");
        self.terms.insert(name.to_owned(), constant.clone());
        Ok(constant)
    }

    /// Register a decision variable with explicit bounds.
    pub fn add_bounded_variable(
        &mut self,
        name: &str,
        value_type: ValueType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Rc<dyn Variable>, ModelError> {
        if self.terms.contains_key(name) {
            return Err(ModelError::DuplicateTerm(name.to_owned()));
        }
        let variable = self
            .engine
            .add_variable(name, value_type, lower_bound, upper_bound)?;
        debug!(
            model = %self.name,
            term = name,
            lower_bound,
            upper_bound,
            "adding variable"
        );
        self.terms.insert(name.to_owned(), variable.clone());
        Ok(variable)
    }

    /// Register a decision variable with the default non-negative bounds.
    pub fn add_variable(
        &mut self,
        name: &str,
        value_type: ValueType,
    ) -> Result<Rc<dyn Variable>, ModelError> {
        self.add_bounded_variable(name, value_type, 0.0, f64::INFINITY)
    }

    fn reserve_set_slot(
        &mut self,
        set_name: &str,
        index: &[usize],
    ) -> Result<(), ModelError> {
        if set_name.is_empty() {
            return Err(ModelError::EmptySetName);
        }
        if let Some(set) = self.term_sets.get(set_name) {
            if set.contains_key(index) {
                return Err(ModelError::DuplicateSetEntry {
                    set_name: set_name.to_owned(),
                    index: index.to_vec(),
                });
            }
        }
        Ok(())
    }

    fn insert_set_entry(&mut self, set_name: &str, index: &[usize], term: Rc<dyn Term>) {
        self.term_sets
            .entry(set_name.to_owned())
            .or_default()
            .insert(index.to_vec(), term);
    }

    /// Register a constant as a member of an indexed term set. The term is
    /// also reachable by name like any flat term.
    pub fn add_constant_to_set(
        &mut self,
        set_name: &str,
        index: &[usize],
        name: &str,
        value_type: ValueType,
        value: f64,
    ) -> Result<Rc<Constant>, ModelError> {
        self.reserve_set_slot(set_name, index)?;
        let constant = self.add_constant(name, value_type, value)?;
        self.insert_set_entry(set_name, index, constant.clone());
        Ok(constant)
    }

    /// Register a bounded variable as a member of an indexed term set.
    pub fn add_variable_to_set(
        &mut self,
        set_name: &str,
        index: &[usize],
        name: &str,
        value_type: ValueType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Rc<dyn Variable>, ModelError> {
        self.reserve_set_slot(set_name, index)?;
        let variable = self.add_bounded_variable(name, value_type, lower_bound, upper_bound)?;
        self.insert_set_entry(set_name, index, variable.clone());
        Ok(variable)
    }

    /// Register a relational expression as a constraint.
    pub fn add_constraint(&mut self, constraint: Expression) -> Result<(), ModelError> {
        debug!(model = %self.name, constraint = %constraint, "adding constraint");
        Ok(self.engine.add_constraint(constraint)?)
    }

    /// Install the objective, replacing any previous one.
    pub fn set_objective(
        &mut self,
        optimization: OptimizationType,
        expression: Expression,
    ) -> Result<(), ModelError> {
        debug!(model = %self.name, %optimization, objective = %expression, "setting objective");
        Ok(self.engine.set_objective(optimization, expression)?)
    }

    /// Solve the model with its engine.
    pub fn solve(&mut self) -> Result<SolutionStatus, ModelError> {
        debug!(model = %self.name, engine = self.engine.name(), "solving");
        Ok(self.engine.solve()?)
    }

    pub fn solution_status(&self) -> SolutionStatus {
        self.engine.solution_status()
    }

    pub fn objective_value(&self) -> Option<f64> {
        self.engine.objective_value()
    }

    pub fn objective_expr(&self) -> Option<&Expression> {
        self.engine.objective_expr()
    }

    pub fn constraints(&self) -> &[Expression] {
        self.engine.constraints()
    }

    /// Print a structural summary of the model.
    pub fn print_info(&self, display_term_sets: bool) {
        println!(
            "Model: {} (engine: {})",
            self.name,
            self.engine.name()
        );

        if !self.dimensions.is_empty() {
            let mut table = Table::new();
            table.set_titles(row!["Dimension", "Size"]);
            table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
            for (name, size) in &self.dimensions {
                table.add_row(row![name, size]);
            }
            table.printstd();
        }

        let mut table = Table::new();
        table.set_titles(row!["Term", "Kind", "Type", "Lower", "Upper"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        for (name, term) in &self.terms {
            table.add_row(row![
                name,
                term.term_type(),
                term.value_type(),
                term.lower_bound(),
                term.upper_bound()
            ]);
        }
        table.printstd();

        if display_term_sets {
            for (set_name, set) in &self.term_sets {
                println!("Term set: {set_name}");
                let mut table = Table::new();
                table.set_titles(row!["Index", "Term"]);
                table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
                for (index, term) in set {
                    let rendered = index
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    table.add_row(row![format!("({rendered})"), term.name()]);
                }
                table.printstd();
            }
        }

        println!("Constraints: {}", self.engine.constraints().len());
    }

    /// Print the current solution. Variables at zero are omitted.
    pub fn print_solution(&self) {
        let status = self.engine.solution_status();
        println!("Model: {} status: {}", self.name, status);
        if !status.has_solution() {
            return;
        }

        if let Some(objective) = self.engine.objective_value() {
            println!(
                "Objective: {:.*}",
                self.float_precision, objective
            );
        }

        let mut table = Table::new();
        table.set_titles(row!["Variable", "Value"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        for (name, term) in &self.terms {
            if term.is_variable() && term.value() != 0.0 {
                table.add_row(row![
                    name,
                    format!("{:.*}", self.float_precision, term.value())
                ]);
            }
        }
        table.printstd();
    }
}
