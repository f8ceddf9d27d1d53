//! End-to-end scenarios exercised against every engine compiled in by
//! default. Each scenario receives a fresh engine so the backends can be
//! compared on identical models.

use std::rc::Rc;

use anyhow::Result;

use orkit::algebra::Variable;
use orkit::constraint;
use orkit::engines::Engine;
use orkit::{Model, OptimizationType, SolutionStatus, ValueType};

fn default_engines() -> Vec<Box<dyn Engine>> {
    let mut engines: Vec<Box<dyn Engine>> = Vec::new();
    #[cfg(feature = "microlp")]
    engines.push(Box::new(orkit::engines::microlp::MicrolpEngine::new()));
    #[cfg(feature = "good_lp")]
    engines.push(Box::new(orkit::engines::good_lp::GoodLpEngine::new()));
    engines
}

fn knapsack(model: &mut Model) -> Result<(Rc<dyn Variable>, Rc<dyn Variable>)> {
    let x = model.add_variable("x", ValueType::Integer)?;
    let y = model.add_variable("y", ValueType::Integer)?;

    model.add_constraint(constraint!((&*x + 7.0 * &*y) <= 17.5))?;
    model.add_constraint(constraint!((&*x) <= 3.5))?;
    model.set_objective(OptimizationType::Maximize, &*x + 10.0 * &*y)?;
    Ok((x, y))
}

#[test]
fn integer_program_round_trip() -> Result<()> {
    for engine in default_engines() {
        let name = engine.name();
        let mut model = Model::with_engine("knapsack", engine);
        let (x, y) = knapsack(&mut model)?;

        let status = model.solve()?;
        assert_eq!(status, SolutionStatus::Optimal, "engine {name}");

        let objective = model.objective_value().unwrap();
        assert!((objective - 23.0).abs() < 1e-6, "engine {name}: {objective}");
        assert_eq!(x.value(), 3.0, "engine {name}");
        assert_eq!(y.value(), 2.0, "engine {name}");
    }
    Ok(())
}

#[test]
fn infeasible_binary_program_reports_status() -> Result<()> {
    for engine in default_engines() {
        let name = engine.name();
        let mut model = Model::with_engine("conflict", engine);
        let a = model.add_variable("a", ValueType::Binary)?;
        let b = model.add_variable("b", ValueType::Binary)?;

        model.add_constraint(constraint!((2.0 * &*a) >= 5.0))?;
        model.set_objective(OptimizationType::Minimize, 2.0 * &*a - &*b + 2.0)?;

        let status = model.solve()?;
        assert_eq!(status, SolutionStatus::Infeasible, "engine {name}");
        assert_eq!(model.objective_value(), None, "engine {name}");
        assert!(!model.solution_status().has_solution(), "engine {name}");
    }
    Ok(())
}

#[test]
fn continuous_program_honours_bounds() -> Result<()> {
    for engine in default_engines() {
        let name = engine.name();
        let mut model = Model::with_engine("bounds", engine);
        let x = model.add_bounded_variable("x", ValueType::Continuous, 1.5, 10.0)?;
        let y = model.add_bounded_variable("y", ValueType::Continuous, 0.0, 4.0)?;

        model.add_constraint(constraint!((&*x + &*y) <= 6.0))?;
        model.set_objective(OptimizationType::Maximize, &*x + 2.0 * &*y)?;

        assert_eq!(model.solve()?, SolutionStatus::Optimal, "engine {name}");
        assert!((x.value() - 2.0).abs() < 1e-6, "engine {name}: {}", x.value());
        assert!((y.value() - 4.0).abs() < 1e-6, "engine {name}: {}", y.value());
    }
    Ok(())
}

#[test]
fn resolving_after_added_constraint_tightens_objective() -> Result<()> {
    for engine in default_engines() {
        let name = engine.name();
        let mut model = Model::with_engine("iterative", engine);
        let (_, y) = knapsack(&mut model)?;

        assert_eq!(model.solve()?, SolutionStatus::Optimal, "engine {name}");
        let first = model.objective_value().unwrap();

        model.add_constraint(constraint!((&*y) <= 1.0))?;
        assert_eq!(model.solve()?, SolutionStatus::Optimal, "engine {name}");
        let second = model.objective_value().unwrap();

        assert!(second < first, "engine {name}: {second} !< {first}");
        assert!((second - 13.0).abs() < 1e-6, "engine {name}: {second}");
    }
    Ok(())
}

#[test]
fn term_sets_index_knapsack_items() -> Result<()> {
    let mut model = Model::new("indexed")?;
    model.add_dimension("items", 3)?;

    let items = model.dimension("items");
    let mut weights = Vec::new();
    let mut picks = Vec::new();
    for i in 0..items {
        let weight = model.add_constant_to_set(
            "weight_i",
            &[i],
            &format!("weight_{i}"),
            ValueType::Continuous,
            (i + 1) as f64,
        )?;
        let pick = model.add_variable_to_set(
            "pick_i",
            &[i],
            &format!("pick_{i}"),
            ValueType::Binary,
            0.0,
            1.0,
        )?;
        weights.push(weight);
        picks.push(pick);
    }

    // total weight at most 4: picks 1 and 3 (weights 1 + 3) is the best fit
    let mut load = orkit::Expression::from(0.0);
    let mut count = orkit::Expression::from(0.0);
    for (weight, pick) in weights.iter().zip(&picks) {
        load += &**weight * &**pick;
        count += &**pick;
    }
    model.add_constraint(constraint!((load) <= 4.0))?;
    model.set_objective(OptimizationType::Maximize, count)?;

    assert_eq!(model.solve()?, SolutionStatus::Optimal, "engine {}", model.engine_name());
    assert_eq!(model.term_set("pick_i").unwrap().len(), 3);
    let picked: f64 = picks.iter().map(|pick| pick.value()).sum();
    assert_eq!(picked, 2.0);
    Ok(())
}

#[test]
fn duplicate_registrations_are_rejected() -> Result<()> {
    let mut model = Model::new("duplicates")?;
    model.add_variable("x", ValueType::Continuous)?;

    assert!(model.add_variable("x", ValueType::Continuous).is_err());
    assert!(model
        .add_constant("x", ValueType::Continuous, 1.0)
        .is_err());

    model.add_variable_to_set("s", &[0, 0], "s_0_0", ValueType::Continuous, 0.0, 1.0)?;
    assert!(model
        .add_variable_to_set("s", &[0, 0], "s_0_0_bis", ValueType::Continuous, 0.0, 1.0)
        .is_err());
    Ok(())
}
