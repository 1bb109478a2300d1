//! Dispatch decisions and the costs which depend directly on them.
use super::{FUEL, GENERATION_PROJECT, LOAD_ZONE, TIMEPOINT};
use crate::model::Model;
use crate::registry::{Bounds, LinearExpr, ModelRegistry, index_key};
use crate::timescale::TimepointID;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;

/// Add dispatch variables and their direct costs to the registry.
///
/// This adds:
///
/// * `DispatchGen[g, t]`: power produced by each project in each timepoint it can operate in
/// * `ZoneTotalCentralDispatch[z, t]`: the sum of dispatch in each zone, registered as a zonal
///   injection
/// * `GenFuelUseRate[g, t, f]`: rate at which fuel-based projects burn each of their fuels
/// * `GenPPAEnergyCostInTP[t]` and `FuelCostsPerTP[t]`: registered as per-timepoint costs
pub fn add_dispatch(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    registry.add_variables(
        "DispatchGen",
        &[GENERATION_PROJECT, TIMEPOINT],
        model
            .iter_gen_tps()
            .map(|(project, tp)| (index_key!(&project.id, tp), Bounds::non_negative())),
    )?;
    registry.add_variables(
        "GenFuelUseRate",
        &[GENERATION_PROJECT, TIMEPOINT, FUEL],
        model.iter_fuel_based_gen_tps().flat_map(|(project, tp)| {
            project
                .fuels
                .iter()
                .map(move |fuel| (index_key!(&project.id, tp, fuel), Bounds::non_negative()))
        }),
    )?;

    let mut zone_dispatch: IndexMap<_, _> = model
        .iter_zone_tps()
        .map(|(zone, tp)| (index_key!(zone, tp), LinearExpr::zero()))
        .collect();
    let mut energy_costs = zero_per_tp(model);
    let mut fuel_costs = zero_per_tp(model);
    for (project, tp) in model.iter_gen_tps() {
        let dispatch = registry.variable("DispatchGen", &index_key!(&project.id, tp))?;
        zone_dispatch[&index_key!(&project.load_zone, tp)].add_term(dispatch, 1.0);
        energy_costs[&tp].add_term(dispatch, project.ppa_energy_cost.value());

        let period = model.time_domain.tp_period(tp);
        for fuel in &project.fuels {
            let fuel_use = registry.variable("GenFuelUseRate", &index_key!(&project.id, tp, fuel))?;
            let cost = model
                .fuel_costs
                .get(&(project.load_zone.clone(), fuel.clone(), period))
                .with_context(|| {
                    format!(
                        "No cost for fuel {fuel} in zone {} in period {period}",
                        project.load_zone
                    )
                })?;
            fuel_costs[&tp].add_term(fuel_use, cost.value());
        }
    }

    registry.add_expressions(
        "ZoneTotalCentralDispatch",
        &[LOAD_ZONE, TIMEPOINT],
        zone_dispatch,
    )?;
    registry.register_zone_injection("ZoneTotalCentralDispatch")?;
    registry.add_expressions(
        "GenPPAEnergyCostInTP",
        &[TIMEPOINT],
        energy_costs.into_iter().map(|(tp, cost)| (index_key!(tp), cost)),
    )?;
    registry.register_cost_per_tp("GenPPAEnergyCostInTP")?;
    registry.add_expressions(
        "FuelCostsPerTP",
        &[TIMEPOINT],
        fuel_costs.into_iter().map(|(tp, cost)| (index_key!(tp), cost)),
    )?;
    registry.register_cost_per_tp("FuelCostsPerTP")?;

    debug!(
        "Added {} dispatch variables and {} fuel use variables",
        registry.variable_block("DispatchGen")?.len(),
        registry.variable_block("GenFuelUseRate")?.len()
    );

    Ok(())
}

/// A zero expression for every timepoint in the model
pub(super) fn zero_per_tp(model: &Model) -> IndexMap<TimepointID, LinearExpr> {
    model
        .time_domain
        .iter_timepoints()
        .map(|tp| (tp, LinearExpr::zero()))
        .collect()
}
