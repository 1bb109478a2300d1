//! A distribution node in each zone, between the central grid and end-use loads.
use super::load_zones::sum_components;
use super::{LOAD_ZONE, TIMEPOINT};
use crate::model::Model;
use crate::registry::{Bounds, Constraint, IndexKey, LinearExpr, ModelRegistry, index_key};
use anyhow::{Context, Result};
use log::debug;

/// Add the distribution node to the registry.
///
/// Power withdrawn from the central grid (`WithdrawFromCentralGrid[z, t]`) is subject to losses
/// before it reaches the distribution node, where it must meet every registered distributed
/// withdrawal (`Distribution_Energy_Balance[z, t]`).
///
/// The registry must have been created with a distribution node and this must be called after
/// every module which withdraws power at it.
pub fn add_distribution_node(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let withdrawals = registry
        .distributed_power_withdrawals()
        .context("The registry was created without a distribution node")?
        .to_vec();
    let loss_rate = model.parameters.distribution.loss_rate;
    registry.add_params(
        "distribution_loss_rate",
        &[],
        [(IndexKey::default(), loss_rate)],
    )?;

    registry.add_variables(
        "WithdrawFromCentralGrid",
        &[LOAD_ZONE, TIMEPOINT],
        model
            .iter_zone_tps()
            .map(|(zone, tp)| (index_key!(zone, tp), Bounds::non_negative())),
    )?;
    registry.register_zone_withdrawal("WithdrawFromCentralGrid")?;

    let constraints = model
        .iter_zone_tps()
        .map(|(zone, tp)| {
            let key = index_key!(zone, tp);
            let supply = registry.variable("WithdrawFromCentralGrid", &key)?;
            let demand = sum_components(registry, &withdrawals, &key)?;
            Ok((
                key,
                Constraint::eq(LinearExpr::from(supply) * (1.0 - loss_rate), demand),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints(
        "Distribution_Energy_Balance",
        &[LOAD_ZONE, TIMEPOINT],
        constraints,
    )?;
    debug!("Added distribution node with loss rate {loss_rate} serving {withdrawals:?}");

    Ok(())
}
