//! The objective: total system cost.
use crate::model::Model;
use crate::registry::{LinearExpr, ModelRegistry, index_key};
use anyhow::Result;
use log::debug;

/// Set the objective to the sum of all registered cost components.
///
/// Per-period costs are added as they are. Per-timepoint costs are hourly rates, so they are
/// weighted by the number of hours each timepoint represents. Costs are not discounted.
pub fn add_objective(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let mut objective = LinearExpr::zero();
    for name in registry.cost_components_per_period() {
        for period in model.time_domain.iter_periods() {
            objective += registry.term(name, &index_key!(period))?;
        }
    }
    for name in registry.cost_components_per_tp() {
        for tp in model.time_domain.iter_timepoints() {
            let weight = model.time_domain.tp_weight(tp);
            objective += registry.term(name, &index_key!(tp))? * weight.value();
        }
    }

    debug!(
        "Objective includes per-period costs {:?} and per-timepoint costs {:?}",
        registry.cost_components_per_period(),
        registry.cost_components_per_tp()
    );
    registry.set_objective(objective)
}
