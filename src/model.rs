//! The model represents the static input data provided by the user.
use crate::day::DayPartition;
use crate::demand_response::ShiftLimitMap;
use crate::fuel::{FuelCostMap, FuelMap};
use crate::generator::{GenerationProject, GenerationProjectMap};
use crate::input::day::read_days;
use crate::input::demand_response::read_shift_limits;
use crate::input::fuel::{read_fuel_costs, read_fuels};
use crate::input::generator::read_generation_projects;
use crate::input::load_zone::{read_load_zones, read_zone_demand};
use crate::input::timescale::read_time_domain;
use crate::load_zone::{ZoneDemandMap, ZoneID, ZoneSet};
use crate::timescale::{Period, TimeDomain, TimepointID};
use anyhow::{Result, ensure};
use itertools::Itertools;
use log::info;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Periods, timeseries and timepoints
    pub time_domain: TimeDomain,
    /// The day each timepoint falls in
    pub days: DayPartition,
    /// Load zones
    pub load_zones: ZoneSet,
    /// Demand in each zone at each timepoint
    pub zone_demand: ZoneDemandMap,
    /// Fuels
    pub fuels: FuelMap,
    /// Fuel costs for each zone and period
    pub fuel_costs: FuelCostMap,
    /// Generation projects
    pub generators: GenerationProjectMap,
    /// Demand-response shift limits
    pub shift_limits: ShiftLimitMap,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = ModelParameters::from_path(model_dir)?;
        let time_domain = read_time_domain(model_dir)?;
        let days = read_days(model_dir, &time_domain)?;
        let load_zones = read_load_zones(model_dir)?;
        let zone_demand = read_zone_demand(model_dir, &load_zones, &time_domain)?;
        let fuels = read_fuels(model_dir)?;
        let fuel_costs = read_fuel_costs(model_dir, &load_zones, &fuels, &time_domain)?;
        let generators = read_generation_projects(model_dir, &load_zones, &fuels, &time_domain)?;
        let shift_limits = if parameters.modules.demand_response {
            read_shift_limits(model_dir, &load_zones, &time_domain, &zone_demand)?
        } else {
            info!("Demand response is disabled; ignoring any shift limits");
            ShiftLimitMap::new()
        };

        let model = Model {
            model_path: model_dir.to_path_buf(),
            parameters,
            time_domain,
            days,
            load_zones,
            zone_demand,
            fuels,
            fuel_costs,
            generators,
            shift_limits,
        };
        model.check_fuel_costs()?;

        Ok(model)
    }

    /// Check that there is a fuel cost for every fuel each project can burn, in every period it
    /// is active in
    fn check_fuel_costs(&self) -> Result<()> {
        let missing = self
            .iter_fuel_based_generators()
            .flat_map(|project| {
                self.iter_periods_for_gen(project)
                    .cartesian_product(project.fuels.iter())
                    .map(move |(period, fuel)| (&project.load_zone, fuel, period))
            })
            .filter(|(zone, fuel, period)| {
                !self
                    .fuel_costs
                    .contains_key(&((*zone).clone(), (*fuel).clone(), *period))
            })
            .map(|(zone, fuel, period)| format!("({zone}, {fuel}, {period})"))
            .unique()
            .collect_vec();
        ensure!(
            missing.is_empty(),
            "Fuel costs are missing for the following zones, fuels and periods: {}",
            missing.join(", ")
        );

        Ok(())
    }

    /// Iterate over all generation projects
    pub fn iter_generators(&self) -> impl Iterator<Item = &Rc<GenerationProject>> {
        self.generators.values()
    }

    /// Iterate over generation projects which are not storage
    pub fn iter_non_storage_generators(&self) -> impl Iterator<Item = &Rc<GenerationProject>> {
        self.iter_generators().filter(|project| !project.is_storage)
    }

    /// Iterate over generation projects which burn fuel
    pub fn iter_fuel_based_generators(&self) -> impl Iterator<Item = &Rc<GenerationProject>> {
        self.iter_generators().filter(|project| project.is_fuel_based())
    }

    /// Iterate over baseload generation projects
    pub fn iter_baseload_generators(&self) -> impl Iterator<Item = &Rc<GenerationProject>> {
        self.iter_generators().filter(|project| project.is_baseload)
    }

    /// Iterate over the generation projects in the given zone
    pub fn iter_generators_in_zone<'a>(
        &'a self,
        zone: &'a ZoneID,
    ) -> impl Iterator<Item = &'a Rc<GenerationProject>> {
        self.iter_generators()
            .filter(move |project| project.load_zone == *zone)
    }

    /// Iterate over the periods in which a project can operate
    pub fn iter_periods_for_gen<'a>(
        &'a self,
        project: &'a GenerationProject,
    ) -> impl Iterator<Item = Period> + 'a {
        self.time_domain
            .iter_periods()
            .filter(|period| project.is_active_in(*period))
    }

    /// Iterate over the timepoints in which a project can operate
    pub fn iter_tps_for_gen<'a>(
        &'a self,
        project: &'a GenerationProject,
    ) -> impl Iterator<Item = TimepointID> + 'a {
        self.iter_periods_for_gen(project)
            .flat_map(|period| self.time_domain.iter_tps_in_period(period))
    }

    /// Iterate over every project and each timepoint it can operate in
    pub fn iter_gen_tps(&self) -> impl Iterator<Item = (&Rc<GenerationProject>, TimepointID)> {
        self.iter_generators()
            .flat_map(|project| self.iter_tps_for_gen(project).map(move |tp| (project, tp)))
    }

    /// As [`Model::iter_gen_tps`], but excluding storage projects
    pub fn iter_non_storage_gen_tps(
        &self,
    ) -> impl Iterator<Item = (&Rc<GenerationProject>, TimepointID)> {
        self.iter_gen_tps().filter(|(project, _)| !project.is_storage)
    }

    /// As [`Model::iter_gen_tps`], but only for fuel-based projects
    pub fn iter_fuel_based_gen_tps(
        &self,
    ) -> impl Iterator<Item = (&Rc<GenerationProject>, TimepointID)> {
        self.iter_gen_tps().filter(|(project, _)| project.is_fuel_based())
    }

    /// Iterate over every combination of load zone and timepoint
    pub fn iter_zone_tps(&self) -> impl Iterator<Item = (&ZoneID, TimepointID)> {
        self.load_zones
            .iter()
            .cartesian_product(self.time_domain.iter_timepoints().collect_vec())
    }
}
