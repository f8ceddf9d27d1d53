//! Vendor-neutral optimization modelling library
//!
//! This library lets you describe linear and mixed-integer programs once and
//! solve them with any of several backends, selected at compile time through
//! cargo features and at runtime through the `ORKIT_ENGINE` environment
//! variable.
//!
//! # Overview
//!
//! A model is built from three layers:
//!
//! 1. **Algebra** ([`algebra`]): terms (constants and decision variables)
//!    combine through the standard arithmetic operators into [`Expression`]
//!    trees, and the [`constraint!`] macro turns comparisons into relational
//!    expressions.
//! 2. **Engines** ([`engines`]): each backend implements the [`Engine`]
//!    trait, translating lowered linear forms into its native solver API and
//!    reporting results through a shared solution store.
//! 3. **Model** ([`model`]): the [`Model`] facade ties an engine to named
//!    dimensions, a term registry, and indexed term sets, and prints
//!    solution reports.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use orkit::{constraint, Model, OptimizationType, SolutionStatus, ValueType};
//!
//! let mut model = Model::new("knapsack")?;
//! let x = model.add_variable("x", ValueType::Integer)?;
//! let y = model.add_variable("y", ValueType::Integer)?;
//!
//! model.add_constraint(constraint!((&*x + 7.0 * &*y) <= 17.5))?;
//! model.add_constraint(constraint!((&*x) <= 3.5))?;
//! model.set_objective(OptimizationType::Maximize, &*x + 10.0 * &*y)?;
//!
//! if model.solve()? == SolutionStatus::Optimal {
//!     model.print_solution();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`algebra`]**: expression trees, terms, operators, and lowering to
//!   linear forms
//! - **[`engines`]**: the [`Engine`] trait, backend selection, and the
//!   feature-gated backend adapters
//! - **[`model`]**: the solver-agnostic [`Model`] facade
//! - **[`structures`]**: validated parameter and schema definitions for
//!   feeding external data into models
//! - **[`enums`]**: shared vocabulary types ([`ValueType`],
//!   [`SolutionStatus`], [`OptimizationType`], ...)
//! - **[`validators`]**: numeric domain checks shared across the crate

pub mod algebra;
pub mod engines;
pub mod enums;
pub mod model;
pub mod structures;
pub mod validators;

pub use algebra::{Constant, Element, Expression, Term, Variable};
pub use engines::{default_engine, Engine, EngineError, ENGINE_ENV};
pub use enums::{OptimizationType, ParameterType, SolutionStatus, TermType, ValueType};
pub use model::{Model, ModelError};
