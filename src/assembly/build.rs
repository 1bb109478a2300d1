//! Generation capacity: what is built, when, and how much is online in each period.
use super::{BUILD_YEAR, GENERATION_PROJECT, PERIOD, TIMEPOINT};
use crate::model::Model;
use crate::registry::{Bounds, LinearExpr, ModelRegistry, index_key};
use anyhow::Result;
use log::debug;

/// Add capacity-related components to the registry.
///
/// This adds:
///
/// * `BuildGen[g, y]`: capacity built in each allowed build year, bounded by the project's capacity
///   limit
/// * `gen_predetermined_cap[g, y]`: capacity which has already been built
/// * `GenCapacity[g, p]`: total capacity online in each period, for every project and period
/// * `GenCapacityInTP[g, t]`: capacity online in each timepoint the project can operate in
/// * `GenPPACapacityCost[p]`: capacity payments, registered as a per-period cost
pub fn add_capacity(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    registry.add_variables(
        "BuildGen",
        &[GENERATION_PROJECT, BUILD_YEAR],
        model.iter_generators().flat_map(|project| {
            let upper = project.capacity_limit.map_or(f64::INFINITY, |limit| limit.value());
            project
                .build_years
                .iter()
                .map(move |year| (index_key!(&project.id, year), Bounds::new(0.0, upper)))
        }),
    )?;
    registry.add_params(
        "gen_predetermined_cap",
        &[GENERATION_PROJECT, BUILD_YEAR],
        model.iter_generators().flat_map(|project| {
            project
                .predetermined_capacity
                .iter()
                .map(move |(year, capacity)| (index_key!(&project.id, year), capacity.value()))
        }),
    )?;

    // Capacity persists once built, so each period sees everything built up to and including it
    let mut capacity = Vec::new();
    for project in model.iter_generators() {
        for period in model.time_domain.iter_periods() {
            let mut expr = LinearExpr::zero();
            for (year, _) in project
                .predetermined_capacity
                .iter()
                .filter(|(year, _)| **year <= period)
            {
                expr += registry.term("gen_predetermined_cap", &index_key!(&project.id, year))?;
            }
            for year in project.build_years.iter().filter(|year| **year <= period) {
                expr += registry.term("BuildGen", &index_key!(&project.id, year))?;
            }
            capacity.push((index_key!(&project.id, period), expr));
        }
    }
    registry.add_expressions("GenCapacity", &[GENERATION_PROJECT, PERIOD], capacity)?;

    let capacity_in_tp = model
        .iter_gen_tps()
        .map(|(project, tp)| {
            let period = model.time_domain.tp_period(tp);
            let capacity = registry.expression("GenCapacity", &index_key!(&project.id, period))?;
            Ok((index_key!(&project.id, tp), capacity.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_expressions(
        "GenCapacityInTP",
        &[GENERATION_PROJECT, TIMEPOINT],
        capacity_in_tp,
    )?;

    add_capacity_costs(registry, model)?;
    debug!(
        "Added {} build options for {} generation projects",
        registry.variable_block("BuildGen")?.len(),
        model.generators.len()
    );

    Ok(())
}

/// Add `GenPPACapacityCost[p]`, the capacity payments for all projects active in each period.
///
/// Capacity costs are annual, so they are multiplied by the number of years in the period.
fn add_capacity_costs(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let mut costs = Vec::new();
    for period in model.time_domain.iter_periods() {
        let years = model
            .time_domain
            .period_info(period)
            .map_or(1, |info| info.end - info.start + 1);
        let mut expr = LinearExpr::zero();
        for project in model
            .iter_generators()
            .filter(|project| project.is_active_in(period))
        {
            let capacity = registry.expression("GenCapacity", &index_key!(&project.id, period))?;
            expr += capacity * (project.ppa_capacity_cost.value() * f64::from(years));
        }
        costs.push((index_key!(period), expr));
    }
    registry.add_expressions("GenPPACapacityCost", &[PERIOD], costs)?;
    registry.register_cost_per_period("GenPPACapacityCost")?;

    Ok(())
}
