//! End-to-end tests which assemble small models from input files and solve them with HiGHS.
use float_cmp::assert_approx_eq;
use itertools::Itertools;
use powerplan::assembly::build_registry;
use powerplan::generator::GenerationProjectID;
use powerplan::input::load_model;
use powerplan::load_zone::ZoneID;
use powerplan::registry::{IndexElement, IndexKey};
use powerplan::solver::{Solution, solve};
use powerplan::timescale::TimepointID;
use std::fs;
use tempfile::{TempDir, tempdir};

const TOLERANCE: f64 = 1e-6;

/// A project in a test model
struct Project<'a> {
    id: &'a str,
    is_variable: bool,
    is_baseload: bool,
    scheduled_outage_rate: f64,
    ppa_energy_cost: f64,
    predetermined_cap: f64,
}

impl<'a> Project<'a> {
    fn new(id: &'a str, ppa_energy_cost: f64, predetermined_cap: f64) -> Self {
        Self {
            id,
            is_variable: false,
            is_baseload: false,
            scheduled_outage_rate: 0.0,
            ppa_energy_cost,
            predetermined_cap,
        }
    }
}

/// Write a model with one zone ("North") and one period, in which every timepoint falls on day 1
fn write_model(
    demand: &[f64],
    projects: &[Project],
    capacity_factors: &[(&str, u32, f64)],
    shift_limits: Option<(f64, f64)>,
) -> TempDir {
    unsafe { std::env::set_var("POWERPLAN_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    let write = |file_name: &str, contents: String| {
        fs::write(dir.path().join(file_name), contents).unwrap();
    };
    let tps = 1..=u32::try_from(demand.len()).unwrap();

    write("model.toml", "[modules]\ndemand_response = true\n".into());
    write(
        "periods.csv",
        "INVESTMENT_PERIOD,period_start,period_end\n2030,2030,2030\n".into(),
    );
    write(
        "timeseries.csv",
        format!(
            "TIMESERIES,ts_period,ts_duration_of_tp,ts_num_tps,ts_scale_to_period\n\
            2030_day,2030,1,{},1\n",
            demand.len()
        ),
    );
    write(
        "timepoints.csv",
        format!(
            "timepoint_id,timestamp,timeseries\n{}\n",
            tps.clone()
                .map(|tp| format!("{tp},2030-01-01 {:02}:00,2030_day", tp - 1))
                .join("\n")
        ),
    );
    write(
        "days.csv",
        format!(
            "timepoint_id,tp_day\n{}\n",
            tps.clone().map(|tp| format!("{tp},1")).join("\n")
        ),
    );
    write("load_zones.csv", "LOAD_ZONE\nNorth\n".into());
    write(
        "loads.csv",
        format!(
            "LOAD_ZONE,TIMEPOINT,zone_demand_mw\n{}\n",
            tps.clone()
                .zip(demand)
                .map(|(tp, demand)| format!("North,{tp},{demand}"))
                .join("\n")
        ),
    );
    write(
        "generation_projects_info.csv",
        format!(
            "GENERATION_PROJECT,gen_tech,gen_energy_source,gen_load_zone,gen_is_variable,\
            gen_is_baseload,gen_scheduled_outage_rate,ppa_energy_cost\n{}\n",
            projects
                .iter()
                .map(|p| format!(
                    "{},{},Other,North,{},{},{},{}",
                    p.id,
                    p.id,
                    u8::from(p.is_variable),
                    u8::from(p.is_baseload),
                    p.scheduled_outage_rate,
                    p.ppa_energy_cost
                ))
                .join("\n")
        ),
    );
    write(
        "gen_build_predetermined.csv",
        format!(
            "GENERATION_PROJECT,build_year,gen_predetermined_cap\n{}\n",
            projects
                .iter()
                .map(|p| format!("{},2030,{}", p.id, p.predetermined_cap))
                .join("\n")
        ),
    );
    if !capacity_factors.is_empty() {
        write(
            "variable_capacity_factors.csv",
            format!(
                "GENERATION_PROJECT,timepoint,gen_max_capacity_factor\n{}\n",
                capacity_factors
                    .iter()
                    .map(|(id, tp, factor)| format!("{id},{tp},{factor}"))
                    .join("\n")
            ),
        );
    }
    if let Some((down, up)) = shift_limits {
        write(
            "dr_data.csv",
            format!(
                "LOAD_ZONE,TIMEPOINT,dr_shift_down_limit,dr_shift_up_limit\n{}\n",
                tps.map(|tp| format!("North,{tp},{down},{up}")).join("\n")
            ),
        );
    }

    dir
}

fn zone_tp_key(tp: u32) -> IndexKey {
    IndexKey::new(vec![
        IndexElement::from(&ZoneID::new("North")),
        IndexElement::from(TimepointID(tp)),
    ])
}

fn gen_tp_key(id: &str, tp: u32) -> IndexKey {
    IndexKey::new(vec![
        IndexElement::from(&GenerationProjectID::new(id)),
        IndexElement::from(TimepointID(tp)),
    ])
}

fn shift_values(solution: &Solution) -> Vec<f64> {
    solution
        .iter_variable_values("ShiftDemand")
        .unwrap()
        .map(|(_, value)| value)
        .collect()
}

/// Surplus solar in the middle of the day, with an expensive peaker for the other hours
fn solar_day_inputs(shift_limits: Option<(f64, f64)>) -> TempDir {
    let mut solar = Project::new("Solar", 0.0, 60.0);
    solar.is_variable = true;
    let capacity_factors = (1..=24)
        .map(|tp| ("Solar", tp, if (10..=15).contains(&tp) { 1.0 } else { 0.0 }))
        .collect_vec();

    write_model(
        &[50.0; 24],
        &[solar, Project::new("Peaker", 100.0, 200.0)],
        &capacity_factors,
        shift_limits,
    )
}

#[test]
fn test_shift_demand_within_limits_and_net_zero() {
    let dir = solar_day_inputs(Some((5.0, 5.0)));
    let model = load_model(dir.path()).unwrap();
    let registry = build_registry(&model).unwrap();
    let solution = solve(&registry).unwrap();

    let shifts = shift_values(&solution);
    assert_eq!(shifts.len(), 24);
    assert!(
        shifts
            .iter()
            .all(|shift| (-5.0 - TOLERANCE..=5.0 + TOLERANCE).contains(shift))
    );
    assert_approx_eq!(f64, shifts.iter().sum::<f64>(), 0.0, epsilon = TOLERANCE);

    // Demand moves into the hours with surplus solar
    for tp in 10..=15 {
        assert_approx_eq!(
            f64,
            solution.value("ShiftDemand", &zone_tp_key(tp)).unwrap(),
            5.0,
            epsilon = TOLERANCE
        );
    }
}

#[test]
fn test_shift_demand_without_dr_data() {
    let dir = solar_day_inputs(None);
    let model = load_model(dir.path()).unwrap();
    let registry = build_registry(&model).unwrap();
    let solution = solve(&registry).unwrap();

    // No downward shifting is allowed, so no upward shifting can be balanced
    for shift in shift_values(&solution) {
        assert_approx_eq!(f64, shift, 0.0, epsilon = TOLERANCE);
    }
}

#[test]
fn test_baseload_dispatch_is_flat() {
    let mut baseload = Project::new("Geothermal", 1.0, 100.0);
    baseload.is_baseload = true;
    baseload.scheduled_outage_rate = 0.05;
    let dir = write_model(
        &[60.0, 70.0, 80.0],
        &[baseload, Project::new("Peaker", 100.0, 200.0)],
        &[],
        None,
    );
    let model = load_model(dir.path()).unwrap();
    let registry = build_registry(&model).unwrap();
    let solution = solve(&registry).unwrap();

    let dispatch = (1..=3)
        .map(|tp| {
            solution
                .value("DispatchGen", &gen_tp_key("Geothermal", tp))
                .unwrap()
        })
        .collect_vec();
    for value in &dispatch {
        assert_approx_eq!(f64, *value, dispatch[0], epsilon = TOLERANCE);
        assert!(*value <= 95.0 + TOLERANCE);
    }

    // Limited by the lowest demand
    assert_approx_eq!(f64, dispatch[0], 60.0, epsilon = TOLERANCE);
}

#[test]
fn test_variable_excess_generation() {
    let mut solar = Project::new("Solar", 0.0, 50.0);
    solar.is_variable = true;
    let dir = write_model(
        &[12.0],
        &[solar, Project::new("Peaker", 100.0, 200.0)],
        &[("Solar", 1, 0.4)],
        None,
    );
    let model = load_model(dir.path()).unwrap();
    let registry = build_registry(&model).unwrap();
    let solution = solve(&registry).unwrap();

    let key = gen_tp_key("Solar", 1);
    assert_approx_eq!(
        f64,
        solution.expression_value("DispatchUpperLimit", &key).unwrap(),
        20.0,
        epsilon = TOLERANCE
    );
    assert_approx_eq!(
        f64,
        solution.value("DispatchGen", &key).unwrap(),
        12.0,
        epsilon = TOLERANCE
    );
    assert_approx_eq!(
        f64,
        solution.expression_value("ExcessGen", &key).unwrap(),
        8.0,
        epsilon = TOLERANCE
    );
}

#[test]
fn test_shift_down_limit_above_demand() {
    let dir = solar_day_inputs(Some((51.0, 5.0)));
    assert!(load_model(dir.path()).is_err());
}
