//! Closed enumerations shared across the modelling layer.
//!
//! These carry no behaviour beyond display formatting; they are the common
//! vocabulary exchanged between the algebra, the engines and the model
//! façade.

use std::fmt;

/// Numeric domain of a term's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Can only take the values 0 or 1.
    Binary,
    /// Can only take whole values.
    Integer,
    /// Can take any real value.
    Continuous,
}

/// Whether a term is a fixed constant or a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermType {
    /// A fixed value, known before solving.
    Constant,
    /// A decision variable, resolved by the solver.
    Variable,
}

/// Optimization direction for the objective function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationType {
    /// Minimize the objective function.
    Minimize,
    /// Maximize the objective function.
    Maximize,
}

/// Outcome classification of a solve attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SolutionStatus {
    /// No solve has been attempted yet.
    #[default]
    NotSolved,
    /// The model has been solved to proven optimality.
    Optimal,
    /// A solution exists but optimality is unproven.
    Feasible,
    /// The constraints have been proven unsatisfiable.
    Infeasible,
    /// The solver terminated abnormally (unbounded, interrupted, limits).
    Error,
}

impl SolutionStatus {
    /// Whether a usable solution is available in this state.
    pub fn has_solution(self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Feasible)
    }
}

/// Certainty classification of a model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// A parameter under certainty, carrying a single fixed value.
    Fixed,
    /// A parameter under uncertainty, carrying lower and upper limits.
    Bounded,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Binary => write!(f, "Binary"),
            ValueType::Integer => write!(f, "Integer"),
            ValueType::Continuous => write!(f, "Continuous"),
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermType::Constant => write!(f, "Constant"),
            TermType::Variable => write!(f, "Variable"),
        }
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::NotSolved => write!(f, "NotSolved"),
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Feasible => write!(f, "Feasible"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Error => write!(f, "Error"),
        }
    }
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationType::Minimize => write!(f, "Minimize"),
            OptimizationType::Maximize => write!(f, "Maximize"),
        }
    }
}
