//! Code for reading periods, timeseries and timepoints from CSV files.
use super::{input_err_msg, read_csv, try_insert};
use crate::timescale::{Period, PeriodInfo, TimeDomain, Timeseries, TimeseriesID, TimepointID};
use crate::units::Hours;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const PERIODS_FILE_NAME: &str = "periods.csv";
const TIMESERIES_FILE_NAME: &str = "timeseries.csv";
const TIMEPOINTS_FILE_NAME: &str = "timepoints.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct PeriodRaw {
    #[serde(rename = "INVESTMENT_PERIOD")]
    period: u32,
    period_start: u32,
    period_end: u32,
}

#[derive(PartialEq, Debug, Deserialize)]
struct TimeseriesRaw {
    #[serde(rename = "TIMESERIES")]
    id: String,
    ts_period: u32,
    ts_duration_of_tp: f64,
    ts_num_tps: u32,
    ts_scale_to_period: f64,
}

#[derive(PartialEq, Debug, Deserialize)]
struct TimepointRaw {
    timepoint_id: u32,
    timestamp: String,
    timeseries: String,
}

fn read_periods_from_iter<I>(iter: I) -> Result<IndexMap<Period, PeriodInfo>>
where
    I: Iterator<Item = PeriodRaw>,
{
    let mut periods = IndexMap::new();
    for raw in iter {
        let info = PeriodInfo {
            start: raw.period_start,
            end: raw.period_end,
        };
        try_insert(&mut periods, Period(raw.period), info)?;
    }

    Ok(periods)
}

fn read_timeseries_from_iter<I>(iter: I) -> Result<IndexMap<TimeseriesID, Timeseries>>
where
    I: Iterator<Item = TimeseriesRaw>,
{
    let mut timeseries = IndexMap::new();
    for raw in iter {
        let id: TimeseriesID = raw.id.into();
        let ts = Timeseries {
            id: id.clone(),
            period: Period(raw.ts_period),
            duration_of_tp: Hours::new(raw.ts_duration_of_tp),
            num_tps: raw.ts_num_tps,
            scale_to_period: raw.ts_scale_to_period,
        };
        try_insert(&mut timeseries, id, ts)?;
    }

    Ok(timeseries)
}

/// Read the model's time domain.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The [`TimeDomain`] or an error if any of the files are missing or invalid
pub fn read_time_domain(model_dir: &Path) -> Result<TimeDomain> {
    let file_path = model_dir.join(PERIODS_FILE_NAME);
    let periods = read_periods_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(TIMESERIES_FILE_NAME);
    let timeseries = read_timeseries_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(TIMEPOINTS_FILE_NAME);
    let timepoints = read_csv::<TimepointRaw>(&file_path)?
        .map(|raw| {
            (
                TimepointID(raw.timepoint_id),
                raw.timestamp,
                raw.timeseries.into(),
            )
        })
        .collect();

    TimeDomain::new(periods, timeseries, timepoints).with_context(|| input_err_msg(&file_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir_path: &Path, file_name: &str, contents: &str) {
        let mut file = File::create(dir_path.join(file_name)).unwrap();
        writeln!(file, "{contents}").unwrap();
    }

    fn create_time_domain_files(dir_path: &Path) {
        write_file(
            dir_path,
            PERIODS_FILE_NAME,
            "INVESTMENT_PERIOD,period_start,period_end\n2030,2028,2032",
        );
        write_file(
            dir_path,
            TIMESERIES_FILE_NAME,
            "TIMESERIES,ts_period,ts_duration_of_tp,ts_num_tps,ts_scale_to_period
2030_all,2030,1,3,1826.25",
        );
        write_file(
            dir_path,
            TIMEPOINTS_FILE_NAME,
            "timepoint_id,timestamp,timeseries
1,01/01/2030 00:00,2030_all
2,01/01/2030 01:00,2030_all
3,01/01/2030 02:00,2030_all",
        );
    }

    #[test]
    fn test_read_time_domain() {
        let dir = tempdir().unwrap();
        create_time_domain_files(dir.path());

        let domain = read_time_domain(dir.path()).unwrap();
        assert_eq!(domain.iter_periods().collect::<Vec<_>>(), [Period(2030)]);
        assert_eq!(
            domain.period_info(Period(2030)),
            Some(&PeriodInfo {
                start: 2028,
                end: 2032
            })
        );
        assert_eq!(domain.num_timepoints(), 3);
        assert_eq!(domain.timepoint(TimepointID(2)).timestamp, "01/01/2030 01:00");
        assert_approx_eq!(f64, domain.tp_weight(TimepointID(1)).value(), 1826.25);
    }

    #[test]
    fn test_read_time_domain_duplicate_period() {
        let dir = tempdir().unwrap();
        create_time_domain_files(dir.path());
        write_file(
            dir.path(),
            PERIODS_FILE_NAME,
            "INVESTMENT_PERIOD,period_start,period_end\n2030,2028,2032\n2030,2028,2032",
        );

        assert!(read_time_domain(dir.path()).is_err());
    }

    #[test]
    fn test_read_time_domain_missing_file() {
        let dir = tempdir().unwrap();
        create_time_domain_files(dir.path());
        std::fs::remove_file(dir.path().join(TIMEPOINTS_FILE_NAME)).unwrap();

        assert!(read_time_domain(dir.path()).is_err());
    }
}
