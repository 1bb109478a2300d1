//! Fixtures for tests
use crate::day::DayPartition;
use crate::demand_response::ShiftLimitMap;
use crate::fuel::{Fuel, FuelCostMap, FuelMap};
use crate::generator::{GenerationProject, GenerationProjectMap};
use crate::load_zone::{ZoneDemandMap, ZoneSet};
use crate::model::{Model, ModelParameters};
use crate::timescale::{Period, PeriodInfo, TimeDomain, Timeseries, TimepointID};
use crate::units::{
    Dimensionless, HeatRate, Hours, MoneyPerEnergy, MoneyPerFuel, MoneyPerPowerPerYear, Power,
};
use indexmap::{IndexMap, IndexSet, indexmap};
use rstest::fixture;
use std::path::PathBuf;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The number of hourly timepoints in the test time domain (two days)
pub const NUM_TPS: u32 = 48;

/// A single period (2030) with one timeseries of 48 hourly timepoints, each weighted 10 hours
#[fixture]
pub fn time_domain() -> TimeDomain {
    let periods = indexmap! { Period(2030) => PeriodInfo { start: 2030, end: 2030 } };
    let timeseries = indexmap! {
        "2030_days".into() => Timeseries {
            id: "2030_days".into(),
            period: Period(2030),
            duration_of_tp: Hours::new(1.0),
            num_tps: NUM_TPS,
            scale_to_period: 10.0,
        }
    };
    let tps = (1..=NUM_TPS)
        .map(|tp| (TimepointID(tp), format!("tp{tp}"), "2030_days".into()))
        .collect();

    TimeDomain::new(periods, timeseries, tps).unwrap()
}

/// The 48 timepoints split into days 1 and 2
#[fixture]
pub fn days(time_domain: TimeDomain) -> DayPartition {
    let labels = (1..=NUM_TPS).map(|tp| (TimepointID(tp), if tp <= 24 { 1 } else { 2 }));
    DayPartition::new(&time_domain, labels).unwrap()
}

#[fixture]
pub fn zones() -> ZoneSet {
    ["North".into()].into_iter().collect()
}

/// 100 MW of demand in every zone at every timepoint
#[fixture]
pub fn zone_demand(zones: ZoneSet) -> ZoneDemandMap {
    let mut demand = ZoneDemandMap::new();
    for zone in zones {
        for tp in 1..=NUM_TPS {
            demand.insert(zone.clone(), TimepointID(tp), Power::new(100.0));
        }
    }
    demand
}

#[fixture]
pub fn fuels() -> FuelMap {
    indexmap! {
        "Gas".into() => Fuel {
            id: "Gas".into(),
            co2_intensity: 0.05306,
            upstream_co2_intensity: 0.0,
        }
    }
}

/// A generation project with no fuels, capacity factors or build years
fn project(id: &str, tech: &str, energy_source: &str) -> GenerationProject {
    GenerationProject {
        id: id.into(),
        tech: tech.into(),
        energy_source: energy_source.into(),
        load_zone: "North".into(),
        is_variable: false,
        is_baseload: false,
        is_storage: false,
        capacity_limit: None,
        full_load_heat_rate: None,
        availability: Dimensionless::new(1.0),
        fuels: IndexSet::new(),
        ppa_energy_cost: MoneyPerEnergy::new(0.0),
        ppa_capacity_cost: MoneyPerPowerPerYear::new(0.0),
        excess_max: f64::INFINITY,
        max_capacity_factors: IndexMap::new(),
        predetermined_capacity: IndexMap::new(),
        build_years: IndexSet::new(),
    }
}

/// A solar project with a capacity factor of 0.4 between 06:00 and 18:00 and zero otherwise
#[fixture]
pub fn solar_gen() -> GenerationProject {
    let max_capacity_factors = (1..=NUM_TPS)
        .map(|tp| {
            let hour = (tp - 1) % 24;
            let cf = if (6..18).contains(&hour) { 0.4 } else { 0.0 };
            (TimepointID(tp), Dimensionless::new(cf))
        })
        .collect();

    GenerationProject {
        is_variable: true,
        ppa_energy_cost: MoneyPerEnergy::new(20.0),
        ppa_capacity_cost: MoneyPerPowerPerYear::new(1000.0),
        capacity_limit: Some(Power::new(500.0)),
        max_capacity_factors,
        build_years: [Period(2030)].into_iter().collect(),
        ..project("Solar", "Solar_PV", "Solar")
    }
}

/// A gas-fired project which can be built in 2030
#[fixture]
pub fn gas_gen() -> GenerationProject {
    GenerationProject {
        full_load_heat_rate: Some(HeatRate::new(7.5)),
        availability: GenerationProject::availability_from_outage_rates(0.05, 0.0),
        fuels: ["Gas".into()].into_iter().collect(),
        ppa_energy_cost: MoneyPerEnergy::new(5.0),
        ppa_capacity_cost: MoneyPerPowerPerYear::new(5000.0),
        build_years: [Period(2030)].into_iter().collect(),
        ..project("Gas_CC", "CCGT", "Gas")
    }
}

/// A baseload geothermal project with 50 MW of capacity already built in 2030
#[fixture]
pub fn baseload_gen() -> GenerationProject {
    GenerationProject {
        is_baseload: true,
        ppa_energy_cost: MoneyPerEnergy::new(10.0),
        predetermined_capacity: indexmap! { Period(2030) => Power::new(50.0) },
        ..project("Geothermal", "Geothermal", "Geothermal")
    }
}

#[fixture]
pub fn generators(
    solar_gen: GenerationProject,
    gas_gen: GenerationProject,
    baseload_gen: GenerationProject,
) -> GenerationProjectMap {
    [solar_gen, gas_gen, baseload_gen]
        .into_iter()
        .map(|project| (project.id.clone(), Rc::new(project)))
        .collect()
}

/// Gas costs $4/MMBtu in the North zone
#[fixture]
pub fn fuel_costs() -> FuelCostMap {
    indexmap! { ("North".into(), "Gas".into(), Period(2030)) => MoneyPerFuel::new(4.0) }
}

/// A small single-zone model with solar, gas and baseload geothermal projects
#[fixture]
pub fn model(
    time_domain: TimeDomain,
    days: DayPartition,
    zones: ZoneSet,
    zone_demand: ZoneDemandMap,
    fuels: FuelMap,
    fuel_costs: FuelCostMap,
    generators: GenerationProjectMap,
) -> Model {
    Model {
        model_path: PathBuf::new(),
        parameters: ModelParameters::default(),
        time_domain,
        days,
        load_zones: zones,
        zone_demand,
        fuels,
        fuel_costs,
        generators,
        shift_limits: ShiftLimitMap::new(),
    }
}
