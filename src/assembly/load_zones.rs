//! Zonal demand and the zonal energy balance.
use super::{LOAD_ZONE, TIMEPOINT};
use crate::model::Model;
use crate::registry::{Constraint, LinearExpr, ModelRegistry, index_key};
use anyhow::Result;
use log::debug;

/// Add the `zone_demand_mw` parameter and register it as a withdrawal.
///
/// Demand is withdrawn at the distribution node if the registry has one.
pub fn add_zone_demand(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    registry.add_params(
        "zone_demand_mw",
        &[LOAD_ZONE, TIMEPOINT],
        model
            .iter_zone_tps()
            .map(|(zone, tp)| {
                let demand = model.zone_demand.get(zone, tp).unwrap_or_default();
                (index_key!(zone, tp), demand.value())
            }),
    )?;
    registry.register_withdrawal("zone_demand_mw")?;

    Ok(())
}

/// Sum the registered components at the given index
pub(super) fn sum_components(
    registry: &ModelRegistry,
    names: &[&'static str],
    key: &crate::registry::IndexKey,
) -> Result<LinearExpr> {
    names.iter().map(|name| registry.term(name, key)).sum()
}

/// Add `Zone_Energy_Balance[z, t]`, equating zonal injections and withdrawals.
///
/// This must be added after every module has registered its components.
pub fn add_energy_balance(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let constraints = model
        .iter_zone_tps()
        .map(|(zone, tp)| {
            let key = index_key!(zone, tp);
            let injections = sum_components(registry, registry.zone_power_injections(), &key)?;
            let withdrawals = sum_components(registry, registry.zone_power_withdrawals(), &key)?;
            Ok((key, Constraint::eq(injections, withdrawals)))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints("Zone_Energy_Balance", &[LOAD_ZONE, TIMEPOINT], constraints)?;
    debug!(
        "Added zonal energy balance with injections {:?} and withdrawals {:?}",
        registry.zone_power_injections(),
        registry.zone_power_withdrawals()
    );

    Ok(())
}
