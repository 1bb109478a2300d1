//! Code for reading fuels and fuel costs.
use super::{
    check_non_negative, deserialise_optional, input_err_msg, read_csv_optional, try_insert,
};
use crate::fuel::{Fuel, FuelCostMap, FuelID, FuelMap};
use crate::id::{HasID, IDCollection};
use crate::load_zone::ZoneSet;
use crate::timescale::{Period, TimeDomain};
use crate::units::MoneyPerFuel;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::Path;

const FUELS_FILE_NAME: &str = "fuels.csv";
const FUEL_COST_FILE_NAME: &str = "fuel_cost.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct FuelRaw {
    fuel: String,
    co2_intensity: f64,
    #[serde(default, deserialize_with = "deserialise_optional")]
    upstream_co2_intensity: Option<f64>,
}

#[derive(PartialEq, Debug, Deserialize)]
struct FuelCostRaw {
    load_zone: String,
    fuel: String,
    period: u32,
    fuel_cost: f64,
}

fn read_fuels_from_iter<I>(iter: I) -> Result<FuelMap>
where
    I: Iterator<Item = FuelRaw>,
{
    let mut fuels = FuelMap::new();
    for raw in iter {
        let fuel = Fuel {
            id: raw.fuel.into(),
            co2_intensity: raw.co2_intensity,
            upstream_co2_intensity: raw.upstream_co2_intensity.unwrap_or(0.0),
        };
        try_insert(&mut fuels, fuel.get_id().clone(), fuel)?;
    }

    Ok(fuels)
}

/// Read fuels from `fuels.csv`.
///
/// The file is optional: models without fuel-based generators need not provide it.
pub fn read_fuels(model_dir: &Path) -> Result<FuelMap> {
    let file_path = model_dir.join(FUELS_FILE_NAME);
    let fuels = read_csv_optional(&file_path)?;
    read_fuels_from_iter(fuels).with_context(|| input_err_msg(&file_path))
}

fn read_fuel_costs_from_iter<I>(
    iter: I,
    zones: &ZoneSet,
    fuel_ids: &IndexSet<FuelID>,
    time_domain: &TimeDomain,
) -> Result<FuelCostMap>
where
    I: Iterator<Item = FuelCostRaw>,
{
    let mut costs = FuelCostMap::new();
    for raw in iter {
        let zone = zones.get_id(&raw.load_zone)?.clone();
        let fuel = fuel_ids.get_id(&raw.fuel)?.clone();
        let period = Period(raw.period);
        ensure!(
            time_domain.period_info(period).is_some(),
            "Fuel cost given for unknown period {period}"
        );
        check_non_negative(raw.fuel_cost, "fuel_cost")?;
        try_insert(
            &mut costs,
            (zone, fuel, period),
            MoneyPerFuel::new(raw.fuel_cost),
        )?;
    }

    Ok(costs)
}

/// Read the cost of each fuel in each zone and period from `fuel_cost.csv`
pub fn read_fuel_costs(
    model_dir: &Path,
    zones: &ZoneSet,
    fuels: &FuelMap,
    time_domain: &TimeDomain,
) -> Result<FuelCostMap> {
    let file_path = model_dir.join(FUEL_COST_FILE_NAME);
    let fuel_ids = fuels.keys().cloned().collect();
    let costs = read_csv_optional(&file_path)?;
    read_fuel_costs_from_iter(costs, zones, &fuel_ids, time_domain)
        .with_context(|| input_err_msg(&file_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, time_domain, zones};
    use crate::load_zone::ZoneID;
    use float_cmp::assert_approx_eq;
    use map_macro::hash_map;
    use rstest::rstest;
    use std::collections::HashMap;

    fn gas() -> FuelRaw {
        FuelRaw {
            fuel: "Gas".into(),
            co2_intensity: 0.05306,
            upstream_co2_intensity: None,
        }
    }

    #[test]
    fn test_read_fuels_from_iter() {
        let fuels = read_fuels_from_iter([gas()].into_iter()).unwrap();
        assert_eq!(fuels.len(), 1);
        assert_approx_eq!(f64, fuels["Gas"].upstream_co2_intensity, 0.0);
    }

    #[test]
    fn test_read_fuels_from_iter_duplicate() {
        assert!(read_fuels_from_iter([gas(), gas()].into_iter()).is_err());
    }

    #[rstest]
    fn test_read_fuel_costs_from_iter(zones: ZoneSet, time_domain: TimeDomain) {
        let fuel_ids = ["Gas".into(), "Biogas".into()].into_iter().collect();
        let raw = |fuel: &str, fuel_cost| FuelCostRaw {
            load_zone: "North".into(),
            fuel: fuel.into(),
            period: 2030,
            fuel_cost,
        };
        let costs = read_fuel_costs_from_iter(
            [raw("Gas", 4.0), raw("Biogas", 9.5)].into_iter(),
            &zones,
            &fuel_ids,
            &time_domain,
        )
        .unwrap();

        let key = |fuel| (ZoneID::new("North"), FuelID::new(fuel), Period(2030));
        assert_eq!(
            costs.into_iter().collect::<HashMap<_, _>>(),
            hash_map! {
                key("Gas") => MoneyPerFuel::new(4.0),
                key("Biogas") => MoneyPerFuel::new(9.5),
            }
        );
    }

    #[rstest]
    fn test_read_fuel_costs_from_iter_unknown_period(zones: ZoneSet, time_domain: TimeDomain) {
        let fuel_ids = ["Gas".into()].into_iter().collect();
        let raw = FuelCostRaw {
            load_zone: "North".into(),
            fuel: "Gas".into(),
            period: 2050,
            fuel_cost: 4.0,
        };
        assert_error!(
            read_fuel_costs_from_iter([raw].into_iter(), &zones, &fuel_ids, &time_domain),
            "Fuel cost given for unknown period 2050"
        );
    }
}
