//! Assembles the optimisation problem for a model.
//!
//! Each submodule adds its variables, parameters, expressions and constraints to a
//! [`ModelRegistry`] and registers any components which contribute to the power balance or the
//! objective. The order in which modules are added is fixed by [`build_registry`]: modules which
//! sum over registered components (the distribution node, the zonal energy balance and the
//! objective) come last.
use crate::model::Model;
use crate::registry::ModelRegistry;
use anyhow::Result;
use log::info;

pub mod build;
pub mod demand_shift;
pub mod dispatch;
pub mod dispatch_limits;
pub mod distribution;
pub mod load_zones;
pub mod objective;

/// Index set name for generation projects
pub const GENERATION_PROJECT: &str = "GENERATION_PROJECT";
/// Index set name for timepoints
pub const TIMEPOINT: &str = "TIMEPOINT";
/// Index set name for load zones
pub const LOAD_ZONE: &str = "LOAD_ZONE";
/// Index set name for investment periods
pub const PERIOD: &str = "PERIOD";
/// Index set name for build years
pub const BUILD_YEAR: &str = "BUILD_YEAR";
/// Index set name for days of the year
pub const DAY: &str = "DAY";
/// Index set name for fuels
pub const FUEL: &str = "FUEL";

/// Build the full optimisation problem for the given model.
///
/// # Arguments
///
/// * `model` - The model
///
/// # Returns
///
/// A registry holding every component of the problem, with the objective set.
pub fn build_registry(model: &Model) -> Result<ModelRegistry> {
    let modules = &model.parameters.modules;
    let mut registry = ModelRegistry::new(modules.distribution);

    load_zones::add_zone_demand(&mut registry, model)?;
    build::add_capacity(&mut registry, model)?;
    dispatch::add_dispatch(&mut registry, model)?;
    if modules.demand_response {
        demand_shift::add_demand_shift(&mut registry, model)?;
    }
    dispatch_limits::add_dispatch_limits(&mut registry, model)?;
    if modules.distribution {
        distribution::add_distribution_node(&mut registry, model)?;
    }
    load_zones::add_energy_balance(&mut registry, model)?;
    objective::add_objective(&mut registry, model)?;

    info!(
        "Assembled model with {} variables and {} constraints",
        registry.num_columns(),
        registry.iter_constraints().count()
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use rstest::rstest;

    #[rstest]
    fn test_build_registry(model: Model) {
        let registry = build_registry(&model).unwrap();
        for name in [
            "DispatchGen",
            "ShiftDemand",
            "DispatchBaseloadByPeriod",
            "BuildGen",
            "GenFuelUseRate",
        ] {
            assert!(registry.variable_block(name).is_ok(), "Missing {name}");
        }
        for name in [
            "DR_Shift_Net_Zero",
            "Enforce_Dispatch_Baseload_Flat",
            "Enforce_Dispatch_Upper_Limit",
            "GenFuelUseRate_Calculate",
            "Zone_Energy_Balance",
        ] {
            assert!(registry.constraint_block(name).is_ok(), "Missing {name}");
        }
        assert!(registry.objective().is_some());

        // No distribution node by default
        assert!(registry.distributed_power_withdrawals().is_none());
        assert!(!registry.has_component("WithdrawFromCentralGrid"));
    }

    #[rstest]
    fn test_build_registry_without_demand_response(mut model: Model) {
        model.parameters.modules.demand_response = false;
        let registry = build_registry(&model).unwrap();
        assert!(!registry.has_component("ShiftDemand"));
        assert!(!registry.has_component("DR_Shift_Net_Zero"));
        assert_eq!(registry.zone_power_withdrawals(), ["zone_demand_mw"]);
    }

    #[rstest]
    fn test_build_registry_with_distribution(mut model: Model) {
        model.parameters.modules.distribution = true;
        let registry = build_registry(&model).unwrap();
        assert_eq!(
            registry.distributed_power_withdrawals(),
            Some(["zone_demand_mw", "ShiftDemand"].as_slice())
        );
        assert_eq!(registry.zone_power_withdrawals(), ["WithdrawFromCentralGrid"]);
        assert!(registry.constraint_block("Distribution_Energy_Balance").is_ok());
    }
}
