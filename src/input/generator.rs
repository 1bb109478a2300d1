//! Code for reading generation projects and their associated data.
use super::{
    check_non_negative, deserialise_flag, deserialise_optional, input_err_msg, read_csv,
    read_csv_optional, try_insert,
};
use crate::fuel::{FuelID, FuelMap};
use crate::generator::{GenerationProject, GenerationProjectID, GenerationProjectMap};
use crate::id::IDCollection;
use crate::load_zone::ZoneSet;
use crate::timescale::{Period, TimeDomain, TimepointID};
use crate::units::{Dimensionless, HeatRate, MoneyPerEnergy, MoneyPerPowerPerYear, Power};
use anyhow::{Context, Result, bail, ensure};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::warn;
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;

const GENERATION_PROJECTS_FILE_NAME: &str = "generation_projects_info.csv";
const MULTIPLE_FUELS_FILE_NAME: &str = "gen_multiple_fuels.csv";
const BUILD_YEARS_FILE_NAME: &str = "gen_build_years.csv";
const BUILD_PREDETERMINED_FILE_NAME: &str = "gen_build_predetermined.csv";
const CAPACITY_FACTORS_FILE_NAME: &str = "variable_capacity_factors.csv";

/// The energy source given to projects which can burn more than one fuel
const MULTIPLE_FUELS: &str = "multiple";

/// A row of `generation_projects_info.csv`
#[derive(PartialEq, Debug, Deserialize)]
struct GenerationProjectRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    id: String,
    gen_tech: String,
    gen_energy_source: String,
    gen_load_zone: String,
    #[serde(default, deserialize_with = "deserialise_flag")]
    gen_is_variable: bool,
    #[serde(default, deserialize_with = "deserialise_flag")]
    gen_is_baseload: bool,
    #[serde(default, deserialize_with = "deserialise_flag")]
    gen_is_storage: bool,
    #[serde(default, deserialize_with = "deserialise_optional")]
    gen_capacity_limit_mw: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    gen_full_load_heat_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    gen_scheduled_outage_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    gen_forced_outage_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    ppa_energy_cost: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    ppa_capacity_cost: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    gen_excess_max: Option<f64>,
}

#[derive(PartialEq, Debug, Deserialize)]
struct MultipleFuelRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    project: String,
    fuel: String,
}

#[derive(PartialEq, Debug, Deserialize)]
struct BuildYearRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    project: String,
    build_year: u32,
}

#[derive(PartialEq, Debug, Deserialize)]
struct PredeterminedBuildRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    project: String,
    build_year: u32,
    gen_predetermined_cap: f64,
}

#[derive(PartialEq, Debug, Deserialize)]
struct CapacityFactorRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    project: String,
    timepoint: u32,
    gen_max_capacity_factor: f64,
}

/// Check that an outage rate is a valid proportion
fn check_outage_rate(value: f64, name: &str) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "{name} must be between 0 and 1 (got {value})"
    );

    Ok(())
}

/// Convert a raw row into a [`GenerationProject`], without the per-year or per-timepoint data
fn project_from_raw(
    raw: GenerationProjectRaw,
    zones: &ZoneSet,
    fuels: &FuelMap,
    multiple_fuels: &IndexMap<GenerationProjectID, IndexSet<FuelID>>,
) -> Result<GenerationProject> {
    let id = GenerationProjectID::from(raw.id);
    let load_zone = zones.get_id(&raw.gen_load_zone)?.clone();

    ensure!(
        !raw.gen_is_storage,
        "Project {id} is a storage project, but storage is not supported"
    );

    let fuel_ids = if raw.gen_energy_source == MULTIPLE_FUELS {
        let fuel_ids = multiple_fuels.get(&id).cloned().unwrap_or_default();
        ensure!(
            !fuel_ids.is_empty(),
            "Project {id} uses multiple fuels, but none are listed in {MULTIPLE_FUELS_FILE_NAME}"
        );
        fuel_ids
    } else if let Some(fuel) = fuels.get(raw.gen_energy_source.as_str()) {
        IndexSet::from([fuel.id.clone()])
    } else {
        IndexSet::new()
    };

    let full_load_heat_rate = match raw.gen_full_load_heat_rate {
        Some(heat_rate) => {
            check_non_negative(heat_rate, "gen_full_load_heat_rate")
                .with_context(|| format!("Invalid heat rate for project {id}"))?;
            Some(HeatRate::new(heat_rate))
        }
        None if !fuel_ids.is_empty() => {
            bail!("Project {id} burns fuel, but gen_full_load_heat_rate is missing")
        }
        None => None,
    };

    let capacity_limit = raw
        .gen_capacity_limit_mw
        .map(|limit| {
            ensure!(
                !limit.is_nan() && limit >= 0.0,
                "gen_capacity_limit_mw for project {id} must be greater than or equal to zero"
            );
            Ok(Power::new(limit))
        })
        .transpose()?;

    let scheduled = raw.gen_scheduled_outage_rate.unwrap_or(0.0);
    check_outage_rate(scheduled, "gen_scheduled_outage_rate")
        .with_context(|| format!("Invalid outage rate for project {id}"))?;
    let forced = raw.gen_forced_outage_rate.unwrap_or(0.0);
    check_outage_rate(forced, "gen_forced_outage_rate")
        .with_context(|| format!("Invalid outage rate for project {id}"))?;

    let ppa_energy_cost = raw.ppa_energy_cost.unwrap_or(0.0);
    let ppa_capacity_cost = raw.ppa_capacity_cost.unwrap_or(0.0);
    ensure!(
        ppa_energy_cost.is_finite() && ppa_capacity_cost.is_finite(),
        "PPA costs for project {id} must be finite numbers"
    );

    let excess_max = raw.gen_excess_max.unwrap_or(f64::INFINITY);
    ensure!(
        !excess_max.is_nan() && excess_max >= 0.0,
        "gen_excess_max for project {id} must be greater than or equal to zero"
    );

    Ok(GenerationProject {
        id,
        tech: raw.gen_tech,
        energy_source: raw.gen_energy_source,
        load_zone,
        is_variable: raw.gen_is_variable,
        is_baseload: raw.gen_is_baseload,
        is_storage: raw.gen_is_storage,
        capacity_limit,
        full_load_heat_rate,
        availability: GenerationProject::availability_from_outage_rates(forced, scheduled),
        fuels: fuel_ids,
        ppa_energy_cost: MoneyPerEnergy::new(ppa_energy_cost),
        ppa_capacity_cost: MoneyPerPowerPerYear::new(ppa_capacity_cost),
        excess_max,
        max_capacity_factors: IndexMap::new(),
        predetermined_capacity: IndexMap::new(),
        build_years: IndexSet::new(),
    })
}

fn read_multiple_fuels_from_iter<I>(
    iter: I,
    fuels: &FuelMap,
) -> Result<IndexMap<GenerationProjectID, IndexSet<FuelID>>>
where
    I: Iterator<Item = MultipleFuelRaw>,
{
    let mut map: IndexMap<GenerationProjectID, IndexSet<FuelID>> = IndexMap::new();
    for raw in iter {
        let fuel = fuels
            .get(raw.fuel.as_str())
            .with_context(|| format!("Unknown fuel {} for project {}", raw.fuel, raw.project))?;
        let project = GenerationProjectID::from(raw.project);
        ensure!(
            map.entry(project.clone()).or_default().insert(fuel.id.clone()),
            "Fuel {} listed more than once for project {project}",
            fuel.id
        );
    }

    Ok(map)
}

fn read_projects_from_iter<I>(
    iter: I,
    zones: &ZoneSet,
    fuels: &FuelMap,
    multiple_fuels: &IndexMap<GenerationProjectID, IndexSet<FuelID>>,
) -> Result<IndexMap<GenerationProjectID, GenerationProject>>
where
    I: Iterator<Item = GenerationProjectRaw>,
{
    let mut projects = IndexMap::new();
    for raw in iter {
        let project = project_from_raw(raw, zones, fuels, multiple_fuels)?;
        try_insert(&mut projects, project.id.clone(), project)?;
    }

    for id in multiple_fuels.keys() {
        let project = projects
            .get(id)
            .with_context(|| format!("Fuels listed for unknown project {id}"))?;
        ensure!(
            project.energy_source == MULTIPLE_FUELS,
            "Fuels listed for project {id}, but its energy source is not \"{MULTIPLE_FUELS}\""
        );
    }

    Ok(projects)
}

fn read_build_years_from_iter<I>(
    iter: I,
    projects: &mut IndexMap<GenerationProjectID, GenerationProject>,
    time_domain: &TimeDomain,
) -> Result<()>
where
    I: Iterator<Item = BuildYearRaw>,
{
    for raw in iter {
        let project = projects
            .get_mut(raw.project.as_str())
            .with_context(|| format!("Unknown project {}", raw.project))?;
        let year = Period(raw.build_year);
        ensure!(
            time_domain.period_info(year).is_some(),
            "Build year {year} for project {} is not a period",
            project.id
        );
        ensure!(
            project.build_years.insert(year),
            "Duplicate build year {year} for project {}",
            project.id
        );
    }

    Ok(())
}

fn read_predetermined_from_iter<I>(
    iter: I,
    projects: &mut IndexMap<GenerationProjectID, GenerationProject>,
) -> Result<()>
where
    I: Iterator<Item = PredeterminedBuildRaw>,
{
    for raw in iter {
        let project = projects
            .get_mut(raw.project.as_str())
            .with_context(|| format!("Unknown project {}", raw.project))?;
        check_non_negative(raw.gen_predetermined_cap, "gen_predetermined_cap")
            .with_context(|| format!("Invalid predetermined capacity for project {}", project.id))?;
        try_insert(
            &mut project.predetermined_capacity,
            Period(raw.build_year),
            Power::new(raw.gen_predetermined_cap),
        )
        .with_context(|| format!("Invalid predetermined capacity for project {}", project.id))?;
    }

    Ok(())
}

fn read_capacity_factors_from_iter<I>(
    iter: I,
    projects: &mut IndexMap<GenerationProjectID, GenerationProject>,
    time_domain: &TimeDomain,
) -> Result<()>
where
    I: Iterator<Item = CapacityFactorRaw>,
{
    for raw in iter {
        let project = projects
            .get_mut(raw.project.as_str())
            .with_context(|| format!("Unknown project {}", raw.project))?;
        ensure!(
            project.is_variable,
            "Capacity factor given for project {}, which is not variable",
            project.id
        );
        let tp = TimepointID(raw.timepoint);
        ensure!(
            time_domain.contains_timepoint(tp),
            "Capacity factor for project {} given for unknown timepoint {tp}",
            project.id
        );
        check_non_negative(raw.gen_max_capacity_factor, "gen_max_capacity_factor")
            .with_context(|| format!("Invalid capacity factor for project {}", project.id))?;
        ensure!(
            project
                .max_capacity_factors
                .insert(tp, Dimensionless::new(raw.gen_max_capacity_factor))
                .is_none(),
            "Duplicate capacity factor for project {} at timepoint {tp}",
            project.id
        );
    }

    Ok(())
}

/// Check that every variable project has a capacity factor for each timepoint it is active in
fn check_capacity_factors(project: &GenerationProject, time_domain: &TimeDomain) -> Result<()> {
    if !project.is_variable {
        return Ok(());
    }

    let missing = time_domain
        .iter_periods()
        .filter(|period| project.is_active_in(*period))
        .flat_map(|period| time_domain.iter_tps_in_period(period))
        .filter(|tp| !project.max_capacity_factors.contains_key(tp))
        .collect_vec();
    ensure!(
        missing.is_empty(),
        "Variable project {} is missing capacity factors for timepoints: {}",
        project.id,
        missing.iter().join(", ")
    );

    Ok(())
}

/// Read generation projects and all of their associated data.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `zones` - All load zones
/// * `fuels` - All fuels
/// * `time_domain` - The model's time domain
pub fn read_generation_projects(
    model_dir: &Path,
    zones: &ZoneSet,
    fuels: &FuelMap,
    time_domain: &TimeDomain,
) -> Result<GenerationProjectMap> {
    let file_path = model_dir.join(MULTIPLE_FUELS_FILE_NAME);
    let multiple_fuels = read_multiple_fuels_from_iter(read_csv_optional(&file_path)?, fuels)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(GENERATION_PROJECTS_FILE_NAME);
    let mut projects =
        read_projects_from_iter(read_csv(&file_path)?, zones, fuels, &multiple_fuels)
            .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(BUILD_YEARS_FILE_NAME);
    read_build_years_from_iter(read_csv_optional(&file_path)?, &mut projects, time_domain)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(BUILD_PREDETERMINED_FILE_NAME);
    read_predetermined_from_iter(read_csv_optional(&file_path)?, &mut projects)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(CAPACITY_FACTORS_FILE_NAME);
    read_capacity_factors_from_iter(read_csv_optional(&file_path)?, &mut projects, time_domain)
        .with_context(|| input_err_msg(&file_path))?;
    for project in projects.values() {
        check_capacity_factors(project, time_domain).with_context(|| input_err_msg(&file_path))?;
    }

    for project in projects.values() {
        if project.first_build_year().is_none() {
            warn!(
                "Project {} has no build years or predetermined capacity and will not be dispatched",
                project.id
            );
        }
    }

    Ok(projects
        .into_iter()
        .map(|(id, project)| (id, Rc::new(project)))
        .collect())
}
