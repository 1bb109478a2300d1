//! Code for reading demand-response shift limits.
use super::{deserialise_optional, input_err_msg, read_csv_optional};
use crate::demand_response::{ShiftLimitMap, ShiftLimits};
use crate::id::IDCollection;
use crate::load_zone::{ZoneDemandMap, ZoneSet};
use crate::timescale::{TimeDomain, TimepointID};
use crate::units::Power;
use anyhow::{Context, Result, ensure};
use log::debug;
use serde::Deserialize;
use std::path::Path;

const DR_DATA_FILE_NAME: &str = "dr_data.csv";

/// A row of `dr_data.csv`.
///
/// A missing value in either limit column takes the default for that limit.
#[derive(PartialEq, Debug, Deserialize)]
struct ShiftLimitRaw {
    #[serde(rename = "LOAD_ZONE")]
    zone: String,
    #[serde(rename = "TIMEPOINT")]
    timepoint: u32,
    #[serde(default, deserialize_with = "deserialise_optional")]
    dr_shift_down_limit: Option<f64>,
    #[serde(default, deserialize_with = "deserialise_optional")]
    dr_shift_up_limit: Option<f64>,
}

/// Check that a shift limit is non-negative and not NaN (infinity is allowed)
fn check_shift_limit(value: f64, name: &str) -> Result<()> {
    ensure!(
        !value.is_nan() && value >= 0.0,
        "{name} must be greater than or equal to zero (got {value})"
    );

    Ok(())
}

fn read_shift_limits_from_iter<I>(
    iter: I,
    zones: &ZoneSet,
    time_domain: &TimeDomain,
    zone_demand: &ZoneDemandMap,
) -> Result<ShiftLimitMap>
where
    I: Iterator<Item = ShiftLimitRaw>,
{
    let mut limits = ShiftLimitMap::new();
    for raw in iter {
        let zone = zones.get_id(&raw.zone)?;
        let tp = TimepointID(raw.timepoint);
        ensure!(
            time_domain.contains_timepoint(tp),
            "Shift limits given for unknown timepoint {tp}"
        );

        let defaults = ShiftLimits::default();
        let down = raw
            .dr_shift_down_limit
            .map_or(defaults.down, Power::new);
        let up = raw.dr_shift_up_limit.map_or(defaults.up, Power::new);
        check_shift_limit(down.value(), "dr_shift_down_limit")
            .with_context(|| format!("Invalid shift limit for zone {zone} at timepoint {tp}"))?;
        check_shift_limit(up.value(), "dr_shift_up_limit")
            .with_context(|| format!("Invalid shift limit for zone {zone} at timepoint {tp}"))?;

        // Demand can't be reduced by more than there is
        let demand = zone_demand
            .get(zone, tp)
            .with_context(|| format!("No demand given for zone {zone} at timepoint {tp}"))?;
        ensure!(
            down <= demand,
            "dr_shift_down_limit for zone {zone} at timepoint {tp} ({}) exceeds \
            zone_demand_mw ({})",
            down.value(),
            demand.value()
        );

        ensure!(
            limits
                .insert(zone.clone(), tp, ShiftLimits { down, up })
                .is_none(),
            "Duplicate shift limits for zone {zone} at timepoint {tp}"
        );
    }

    Ok(limits)
}

/// Read demand-response shift limits.
///
/// The file is optional. If it is absent, every zone and timepoint takes the default limits.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `zones` - All load zones
/// * `time_domain` - The model's time domain
/// * `zone_demand` - Demand in each zone at each timepoint
pub fn read_shift_limits(
    model_dir: &Path,
    zones: &ZoneSet,
    time_domain: &TimeDomain,
    zone_demand: &ZoneDemandMap,
) -> Result<ShiftLimitMap> {
    let file_path = model_dir.join(DR_DATA_FILE_NAME);
    let limits = read_shift_limits_from_iter(
        read_csv_optional(&file_path)?,
        zones,
        time_domain,
        zone_demand,
    )
    .with_context(|| input_err_msg(&file_path))?;
    debug!("Read {} explicit demand-response shift limits", limits.len());

    Ok(limits)
}
