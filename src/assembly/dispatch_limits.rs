//! Limits on how much each generation project can dispatch, and accounting for the energy it could
//! have produced but didn't.
//!
//! For every project and timepoint it can operate in, dispatch must lie between a lower limit
//! (zero) and an upper limit given by the capacity online, the project's availability and, for
//! variable projects, the resource's capacity factor. Baseload projects must dispatch at the same
//! level in every timepoint of a period. Fuel-based projects burn fuel in proportion to their
//! dispatch.
//!
//! Any headroom between a variable project's upper limit and its dispatch is *excess generation*
//! (curtailment). Under a power purchase agreement this energy is paid for whether or not it is
//! used, so it is charged at the project's PPA energy cost. Projects may also cap their total
//! excess generation in each period.
//!
//! Storage projects are excluded from the upper limit and from excess generation accounting. The
//! loader currently rejects them, as there is no storage module.
use super::dispatch::zero_per_tp;
use super::{GENERATION_PROJECT, LOAD_ZONE, PERIOD, TIMEPOINT};
use crate::model::Model;
use crate::registry::{Bounds, Constraint, IndexKey, LinearExpr, ModelRegistry, index_key};
use anyhow::{Context, Result};
use itertools::Itertools;
use log::debug;

/// Add dispatch limits and excess generation accounting to the registry.
///
/// This requires `DispatchGen`, `GenFuelUseRate`, `GenCapacity` and `GenCapacityInTP` to have
/// been added already.
pub fn add_dispatch_limits(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    add_baseload_constraints(registry, model)?;
    add_dispatch_bounds(registry, model)?;
    add_fuel_use_constraints(registry, model)?;
    add_excess_generation(registry, model)?;
    add_excess_generation_caps(registry, model)?;

    debug!(
        "Added dispatch limits: {} upper limit rows, {} baseload rows, {} excess generation caps",
        registry
            .constraint_block("Enforce_Dispatch_Upper_Limit")?
            .len(),
        registry
            .constraint_block("Enforce_Dispatch_Baseload_Flat")?
            .len(),
        registry.constraint_block("max_AnnualExcessGen")?.len()
    );

    Ok(())
}

/// Add `DispatchBaseloadByPeriod[g, p]` and `Enforce_Dispatch_Baseload_Flat[g, t]`.
///
/// Each baseload project gets one free variable per period it is active in, and its dispatch in
/// every timepoint of that period is tied to it.
fn add_baseload_constraints(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let baseload_periods = model
        .iter_baseload_generators()
        .flat_map(|project| {
            model
                .iter_periods_for_gen(project)
                .map(move |period| (project, period))
        })
        .collect_vec();

    registry.add_variables(
        "DispatchBaseloadByPeriod",
        &[GENERATION_PROJECT, PERIOD],
        baseload_periods
            .iter()
            .map(|(project, period)| (index_key!(&project.id, period), Bounds::free())),
    )?;

    let constraints = baseload_periods
        .iter()
        .flat_map(|(project, period)| {
            model
                .time_domain
                .iter_tps_in_period(*period)
                .map(move |tp| (project, *period, tp))
        })
        .map(|(project, period, tp)| {
            let key = index_key!(&project.id, tp);
            let dispatch = registry.variable("DispatchGen", &key)?;
            let level =
                registry.variable("DispatchBaseloadByPeriod", &index_key!(&project.id, period))?;
            Ok((key, Constraint::eq(dispatch, level)))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints(
        "Enforce_Dispatch_Baseload_Flat",
        &[GENERATION_PROJECT, TIMEPOINT],
        constraints,
    )
}

/// Add the `DispatchUpperLimit[g, t]` and `DispatchLowerLimit[g, t]` expressions and
/// `Enforce_Dispatch_Upper_Limit[g, t]`.
///
/// The lower limit is always zero. This is already enforced by the bounds of `DispatchGen`, so no
/// constraint is added for it.
fn add_dispatch_bounds(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let upper_limits = model
        .iter_gen_tps()
        .map(|(project, tp)| {
            let key = index_key!(&project.id, tp);
            let capacity = registry.expression("GenCapacityInTP", &key)?;
            let derate = if project.is_variable {
                project.availability * project.max_capacity_factor(tp)
            } else {
                project.availability
            };
            Ok((key, capacity * derate.value()))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_expressions(
        "DispatchUpperLimit",
        &[GENERATION_PROJECT, TIMEPOINT],
        upper_limits,
    )?;
    registry.add_expressions(
        "DispatchLowerLimit",
        &[GENERATION_PROJECT, TIMEPOINT],
        model
            .iter_gen_tps()
            .map(|(project, tp)| (index_key!(&project.id, tp), LinearExpr::zero())),
    )?;

    let constraints = model
        .iter_non_storage_gen_tps()
        .map(|(project, tp)| {
            let key = index_key!(&project.id, tp);
            let dispatch = registry.variable("DispatchGen", &key)?;
            let upper = registry.expression("DispatchUpperLimit", &key)?;
            Ok((key, Constraint::le(dispatch, upper.clone())))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints(
        "Enforce_Dispatch_Upper_Limit",
        &[GENERATION_PROJECT, TIMEPOINT],
        constraints,
    )
}

/// Add `GenFuelUseRate_Calculate[g, t]`: the total rate of fuel use of a fuel-based project must
/// equal its dispatch multiplied by its full-load heat rate.
fn add_fuel_use_constraints(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let constraints = model
        .iter_fuel_based_gen_tps()
        .map(|(project, tp)| {
            let key = index_key!(&project.id, tp);
            let heat_rate = project
                .full_load_heat_rate
                .with_context(|| format!("Project {} has no full-load heat rate", project.id))?;
            let fuel_use = project
                .fuels
                .iter()
                .map(|fuel| {
                    registry
                        .variable("GenFuelUseRate", &index_key!(&project.id, tp, fuel))
                        .map(LinearExpr::from)
                })
                .sum::<Result<LinearExpr>>()?;
            let dispatch = registry.variable("DispatchGen", &key)?;
            Ok((
                key,
                Constraint::eq(fuel_use, LinearExpr::from(dispatch) * heat_rate.value()),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints(
        "GenFuelUseRate_Calculate",
        &[GENERATION_PROJECT, TIMEPOINT],
        constraints,
    )
}

/// Add the excess generation expressions and register the cost of excess generation.
///
/// * `ExcessGen[g, t]`: the headroom below the upper limit for variable projects, otherwise zero
/// * `ZoneTotalExcessGen[z, t]`: excess generation summed over the projects in each zone
/// * `AnnualExcessGen[g, p]`: excess generation summed over the timepoints of each period (zero for
///   periods in which the project is not active)
/// * `ExcessGenCostInTP[t]`: excess generation charged at each project's PPA energy cost
fn add_excess_generation(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let excess = model
        .iter_non_storage_gen_tps()
        .map(|(project, tp)| {
            let key = index_key!(&project.id, tp);
            let expr = if project.is_variable {
                let upper = registry.expression("DispatchUpperLimit", &key)?;
                let dispatch = registry.variable("DispatchGen", &key)?;
                upper.clone() - dispatch
            } else {
                LinearExpr::zero()
            };
            Ok((key, expr))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_expressions("ExcessGen", &[GENERATION_PROJECT, TIMEPOINT], excess)?;

    let excess_gen = registry.expression_block("ExcessGen")?;
    let excess_at = |key: &IndexKey| excess_gen.get(key).cloned().unwrap_or_default();

    let zone_excess = model
        .iter_zone_tps()
        .map(|(zone, tp)| {
            let total = model
                .iter_generators_in_zone(zone)
                .filter(|project| !project.is_storage)
                .map(|project| excess_at(&index_key!(&project.id, tp)))
                .sum::<LinearExpr>();
            (index_key!(zone, tp), total)
        })
        .collect_vec();

    let annual_excess = model
        .iter_non_storage_generators()
        .cartesian_product(model.time_domain.iter_periods())
        .map(|(project, period)| {
            let total = model
                .time_domain
                .iter_tps_in_period(period)
                .map(|tp| excess_at(&index_key!(&project.id, tp)))
                .sum::<LinearExpr>();
            (index_key!(&project.id, period), total)
        })
        .collect_vec();

    let mut excess_costs = zero_per_tp(model);
    for (project, tp) in model.iter_non_storage_gen_tps() {
        let excess = excess_at(&index_key!(&project.id, tp));
        excess_costs[&tp] += excess * project.ppa_energy_cost.value();
    }

    registry.add_expressions("ZoneTotalExcessGen", &[LOAD_ZONE, TIMEPOINT], zone_excess)?;
    registry.add_expressions(
        "AnnualExcessGen",
        &[GENERATION_PROJECT, PERIOD],
        annual_excess,
    )?;
    registry.add_expressions(
        "ExcessGenCostInTP",
        &[TIMEPOINT],
        excess_costs
            .into_iter()
            .map(|(tp, cost)| (index_key!(tp), cost)),
    )?;
    registry.register_cost_per_tp("ExcessGenCostInTP")
}

/// Add the `gen_excess_max[g]` parameter and `max_AnnualExcessGen[g, p]`.
///
/// A cap is only imposed on projects with a finite `gen_excess_max`, in which case excess
/// generation in each period may be at most `gen_excess_max` hours of full-capacity output.
fn add_excess_generation_caps(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    registry.add_params(
        "gen_excess_max",
        &[GENERATION_PROJECT],
        model
            .iter_non_storage_generators()
            .map(|project| (index_key!(&project.id), project.excess_max)),
    )?;

    let constraints = model
        .iter_non_storage_generators()
        .filter(|project| project.has_excess_cap())
        .cartesian_product(model.time_domain.iter_periods())
        .map(|(project, period)| {
            let key = index_key!(&project.id, period);
            let annual_excess = registry.expression("AnnualExcessGen", &key)?;
            let capacity = registry.expression("GenCapacity", &key)?;
            Ok((
                key,
                Constraint::le(annual_excess.clone(), capacity * project.excess_max),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints(
        "max_AnnualExcessGen",
        &[GENERATION_PROJECT, PERIOD],
        constraints,
    )
}
