//! Code for reading load zones and their demand.
use super::{check_non_negative, input_err_msg, read_csv};
use crate::id::IDCollection;
use crate::load_zone::{ZoneDemandMap, ZoneID, ZoneSet};
use crate::timescale::{TimeDomain, TimepointID};
use crate::units::Power;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

const LOAD_ZONES_FILE_NAME: &str = "load_zones.csv";
const LOADS_FILE_NAME: &str = "loads.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct LoadZoneRaw {
    #[serde(rename = "LOAD_ZONE")]
    id: String,
}

#[derive(PartialEq, Debug, Deserialize)]
struct LoadRaw {
    #[serde(rename = "LOAD_ZONE")]
    zone: String,
    #[serde(rename = "TIMEPOINT")]
    timepoint: u32,
    zone_demand_mw: f64,
}

fn read_load_zones_from_iter<I>(iter: I) -> Result<ZoneSet>
where
    I: Iterator<Item = LoadZoneRaw>,
{
    let mut zones = ZoneSet::new();
    for raw in iter {
        ensure!(
            zones.insert(ZoneID::new(&raw.id)),
            "Duplicate load zone {}",
            raw.id
        );
    }

    Ok(zones)
}

/// Read the IDs of the load zones
pub fn read_load_zones(model_dir: &Path) -> Result<ZoneSet> {
    let file_path = model_dir.join(LOAD_ZONES_FILE_NAME);
    read_load_zones_from_iter(read_csv(&file_path)?).with_context(|| input_err_msg(&file_path))
}

fn read_zone_demand_from_iter<I>(
    iter: I,
    zones: &ZoneSet,
    time_domain: &TimeDomain,
) -> Result<ZoneDemandMap>
where
    I: Iterator<Item = LoadRaw>,
{
    let mut demand = ZoneDemandMap::new();
    for raw in iter {
        let zone = zones.get_id(&raw.zone)?;
        let tp = TimepointID(raw.timepoint);
        ensure!(
            time_domain.contains_timepoint(tp),
            "Demand given for unknown timepoint {tp}"
        );
        check_non_negative(raw.zone_demand_mw, "zone_demand_mw")
            .with_context(|| format!("Invalid demand for zone {zone} at timepoint {tp}"))?;
        ensure!(
            demand
                .insert(zone.clone(), tp, Power::new(raw.zone_demand_mw))
                .is_none(),
            "Duplicate demand entry for zone {zone} at timepoint {tp}"
        );
    }

    // Every zone needs demand for every timepoint
    let missing = zones
        .iter()
        .cartesian_product(time_domain.iter_timepoints())
        .filter(|(zone, tp)| !demand.contains(zone, *tp))
        .map(|(zone, tp)| format!("({zone}, {tp})"))
        .collect_vec();
    ensure!(
        missing.is_empty(),
        "Demand is missing for the following zones and timepoints: {}",
        missing.join(", ")
    );

    Ok(demand)
}

/// Read the demand in each zone at each timepoint.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `zones` - All load zones
/// * `time_domain` - The model's time domain
pub fn read_zone_demand(
    model_dir: &Path,
    zones: &ZoneSet,
    time_domain: &TimeDomain,
) -> Result<ZoneDemandMap> {
    let file_path = model_dir.join(LOADS_FILE_NAME);
    let loads = read_csv(&file_path)?;
    read_zone_demand_from_iter(loads, zones, time_domain).with_context(|| input_err_msg(&file_path))
}
