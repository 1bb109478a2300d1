//! Demand response: load which can be moved between the timepoints of a day at no cost.
//!
//! In each zone and timepoint, demand may be shifted down by at most `dr_shift_down_limit` and up
//! by at most `dr_shift_up_limit`. Shifting is energy-neutral over each day, so whatever is taken
//! away from some timepoints must be added back in others.
//!
//! With the default limits (no downward shifting and unlimited upward shifting), the daily
//! net-zero constraint forces all shifts to zero.
use super::{DAY, LOAD_ZONE, TIMEPOINT};
use crate::model::Model;
use crate::registry::{Bounds, Constraint, LinearExpr, ModelRegistry, index_key};
use anyhow::Result;
use itertools::Itertools;
use log::debug;

/// Add the demand-shift parameters, variables and constraints to the registry.
///
/// This adds:
///
/// * `dr_shift_down_limit[z, t]` and `dr_shift_up_limit[z, t]`: the limits for every zone and
///   timepoint, with defaults filled in
/// * `ShiftDemand[z, t]`: the change in demand, bounded by the limits
/// * `DR_Shift_Net_Zero[z, d]`: shifts in each zone must sum to zero over each day. There is a row
///   for every day of the year, including days with no timepoints (for which the row is empty).
///
/// `ShiftDemand` is registered as a withdrawal at the distribution node if the registry has one,
/// otherwise at the zonal node.
pub fn add_demand_shift(registry: &mut ModelRegistry, model: &Model) -> Result<()> {
    let limits = model
        .iter_zone_tps()
        .map(|(zone, tp)| (index_key!(zone, tp), model.shift_limits.get(zone, tp)))
        .collect_vec();

    registry.add_params(
        "dr_shift_down_limit",
        &[LOAD_ZONE, TIMEPOINT],
        limits
            .iter()
            .map(|(key, limits)| (key.clone(), limits.down.value())),
    )?;
    registry.add_params(
        "dr_shift_up_limit",
        &[LOAD_ZONE, TIMEPOINT],
        limits
            .iter()
            .map(|(key, limits)| (key.clone(), limits.up.value())),
    )?;
    registry.add_variables(
        "ShiftDemand",
        &[LOAD_ZONE, TIMEPOINT],
        limits.into_iter().map(|(key, limits)| {
            (
                key,
                Bounds::new(-limits.down.value(), limits.up.value()),
            )
        }),
    )?;

    let constraints = model
        .load_zones
        .iter()
        .flat_map(|zone| model.days.iter_days().map(move |day| (zone, day)))
        .map(|(zone, day)| {
            let shift = model
                .days
                .tps_in_day(day)
                .iter()
                .map(|tp| {
                    registry
                        .variable("ShiftDemand", &index_key!(zone, tp))
                        .map(LinearExpr::from)
                })
                .sum::<Result<LinearExpr>>()?;
            Ok((index_key!(zone, day), Constraint::eq(shift, 0.0)))
        })
        .collect::<Result<Vec<_>>>()?;
    registry.add_constraints("DR_Shift_Net_Zero", &[LOAD_ZONE, DAY], constraints)?;

    let node = if registry.distributed_power_withdrawals().is_some() {
        "distribution"
    } else {
        "zonal"
    };
    registry.register_withdrawal("ShiftDemand")?;
    debug!(
        "Added demand response for {} zones at the {node} node",
        model.load_zones.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::{DAYS, Day};
    use crate::demand_response::ShiftLimits;
    use crate::fixture::{NUM_TPS, model};
    use crate::load_zone::ZoneID;
    use crate::registry::Relation;
    use crate::timescale::TimepointID;
    use crate::units::Power;
    use float_cmp::{approx_eq, assert_approx_eq};
    use rstest::rstest;

    fn set_limits(model: &mut Model, down: f64, up: f64) {
        for tp in 1..=NUM_TPS {
            model.shift_limits.insert(
                "North".into(),
                TimepointID(tp),
                ShiftLimits {
                    down: Power::new(down),
                    up: Power::new(up),
                },
            );
        }
    }

    #[rstest]
    fn test_shift_bounds(mut model: Model) {
        set_limits(&mut model, 5.0, 5.0);
        let mut registry = ModelRegistry::new(false);
        add_demand_shift(&mut registry, &model).unwrap();

        let block = registry.variable_block("ShiftDemand").unwrap();
        assert_eq!(block.len(), NUM_TPS as usize);
        for (_, var) in block.iter() {
            assert_eq!(
                registry.column_bounds()[var.index()],
                Bounds::new(-5.0, 5.0)
            );
        }
    }

    #[rstest]
    fn test_shift_default_bounds(model: Model) {
        let mut registry = ModelRegistry::new(false);
        add_demand_shift(&mut registry, &model).unwrap();

        let key = index_key!(&ZoneID::new("North"), TimepointID(1));
        let var = registry.variable("ShiftDemand", &key).unwrap();
        let bounds = registry.column_bounds()[var.index()];
        assert_approx_eq!(f64, bounds.lower, 0.0);
        assert!(bounds.upper.is_infinite());
        assert!(
            registry
                .param("dr_shift_up_limit", &key)
                .unwrap()
                .is_infinite()
        );
    }

    #[rstest]
    fn test_net_zero_per_day(mut model: Model) {
        set_limits(&mut model, 5.0, 5.0);
        let mut registry = ModelRegistry::new(false);
        add_demand_shift(&mut registry, &model).unwrap();

        // One row for every day of the year, whether or not it has timepoints
        let block = registry.constraint_block("DR_Shift_Net_Zero").unwrap();
        assert_eq!(block.len(), DAYS.len());

        let zone = ZoneID::new("North");
        let day1 = block.get(&index_key!(&zone, Day(1))).unwrap();
        assert_eq!(day1.relation(), Relation::Eq);
        assert_eq!(day1.expr().iter_terms().count(), 24);
        assert!(day1.expr().iter_terms().all(|(_, coeff)| approx_eq!(f64, coeff, 1.0)));
        assert_approx_eq!(f64, day1.row_bounds().lower, 0.0);
        assert_approx_eq!(f64, day1.row_bounds().upper, 0.0);

        let day3 = block.get(&index_key!(&zone, Day(3))).unwrap();
        assert!(day3.expr().is_constant());

        // Shifting 5 MW out of one hour and into another on the same day is fine ...
        let var = |tp| {
            registry
                .variable("ShiftDemand", &index_key!(&zone, TimepointID(tp)))
                .unwrap()
                .index()
        };
        let mut values = vec![0.0; registry.num_columns()];
        values[var(3)] = -5.0;
        values[var(20)] = 5.0;
        assert!(block.iter().all(|(_, c)| c.is_satisfied(&values, 1e-9)));

        // ... but not into the next day
        values[var(20)] = 0.0;
        values[var(30)] = 5.0;
        assert!(!day1.is_satisfied(&values, 1e-9));
        assert!(
            !block
                .get(&index_key!(&zone, Day(2)))
                .unwrap()
                .is_satisfied(&values, 1e-9)
        );
    }

    #[rstest]
    fn test_withdrawal_registration(model: Model) {
        let mut registry = ModelRegistry::new(false);
        add_demand_shift(&mut registry, &model).unwrap();
        assert_eq!(registry.zone_power_withdrawals(), ["ShiftDemand"]);

        let mut registry = ModelRegistry::new(true);
        add_demand_shift(&mut registry, &model).unwrap();
        assert!(registry.zone_power_withdrawals().is_empty());
        assert_eq!(
            registry.distributed_power_withdrawals(),
            Some(["ShiftDemand"].as_slice())
        );
    }
}
