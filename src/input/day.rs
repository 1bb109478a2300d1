//! Code for reading the day each timepoint falls in.
use super::{input_err_msg, read_csv};
use crate::day::DayPartition;
use crate::timescale::{TimeDomain, TimepointID};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const DAYS_FILE_NAME: &str = "days.csv";

/// A row of `days.csv`.
///
/// Any other columns (e.g. `tp_in_subset`) are ignored.
#[derive(PartialEq, Debug, Deserialize)]
struct DayRaw {
    timepoint_id: u32,
    tp_day: u16,
}

/// Read the partitioning of timepoints into days.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `time_domain` - The model's time domain
pub fn read_days(model_dir: &Path, time_domain: &TimeDomain) -> Result<DayPartition> {
    let file_path = model_dir.join(DAYS_FILE_NAME);
    let labels =
        read_csv::<DayRaw>(&file_path)?.map(|raw| (TimepointID(raw.timepoint_id), raw.tp_day));

    DayPartition::new(time_domain, labels).with_context(|| input_err_msg(&file_path))
}
