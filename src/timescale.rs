//! Code for working with the model's time domain.
//!
//! Timepoints are the smallest scheduled unit of time (typically one hour). Each belongs to exactly
//! one timeseries, and each timeseries belongs to exactly one investment period.
use crate::id::{define_id_type, define_numeric_id_type};
use crate::units::Hours;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;

define_numeric_id_type!(
    /// An investment period, identified by its label year (e.g. 2030)
    Period,
    u32
);
define_numeric_id_type!(
    /// The ID of a timepoint
    TimepointID,
    u32
);
define_id_type! {TimeseriesID}

/// The span of years an investment period represents
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodInfo {
    /// First year of the period
    pub start: u32,
    /// Last year of the period
    pub end: u32,
}

/// A sequence of timepoints sharing a duration and a scaling factor
#[derive(Debug, Clone, PartialEq)]
pub struct Timeseries {
    /// The timeseries ID
    pub id: TimeseriesID,
    /// The period this timeseries falls in
    pub period: Period,
    /// The length of each timepoint in the timeseries
    pub duration_of_tp: Hours,
    /// The number of timepoints in the timeseries
    pub num_tps: u32,
    /// How many times this timeseries is repeated to represent its period
    pub scale_to_period: f64,
}

/// A single timepoint
#[derive(Debug, Clone, PartialEq)]
pub struct Timepoint {
    /// The timepoint ID
    pub id: TimepointID,
    /// A human-readable label (e.g. "01/01/2030 00:00")
    pub timestamp: String,
    /// The timeseries the timepoint belongs to
    pub timeseries: TimeseriesID,
    /// The period the timepoint belongs to
    pub period: Period,
    /// Number of hours the timepoint represents within its period
    pub weight: Hours,
}

/// The model's time domain: periods, timeseries and timepoints
#[derive(Debug, PartialEq)]
pub struct TimeDomain {
    periods: IndexMap<Period, PeriodInfo>,
    timepoints: IndexMap<TimepointID, Timepoint>,
    tps_in_period: IndexMap<Period, Vec<TimepointID>>,
}

impl TimeDomain {
    /// Create a new [`TimeDomain`], deriving each timepoint's period and weight.
    ///
    /// # Arguments
    ///
    /// * `periods` - Investment periods, in order
    /// * `timeseries` - Timeseries, each of which must refer to one of `periods`
    /// * `timepoints` - Timepoint IDs along with their timestamp and timeseries, in order
    pub fn new(
        periods: IndexMap<Period, PeriodInfo>,
        timeseries: IndexMap<TimeseriesID, Timeseries>,
        timepoints: Vec<(TimepointID, String, TimeseriesID)>,
    ) -> Result<Self> {
        ensure!(!periods.is_empty(), "At least one period must be defined");
        for (period, info) in &periods {
            ensure!(
                info.start <= info.end,
                "Period {period} starts ({}) after it ends ({})",
                info.start,
                info.end
            );
        }

        for ts in timeseries.values() {
            ensure!(
                periods.contains_key(&ts.period),
                "Timeseries {} refers to unknown period {}",
                ts.id,
                ts.period
            );
            ensure!(
                ts.duration_of_tp.is_finite() && ts.duration_of_tp > Hours::new(0.0),
                "ts_duration_of_tp for timeseries {} must be a positive number",
                ts.id
            );
            ensure!(
                ts.scale_to_period.is_finite() && ts.scale_to_period > 0.0,
                "ts_scale_to_period for timeseries {} must be a positive number",
                ts.id
            );
        }

        let mut tps_in_period: IndexMap<Period, Vec<TimepointID>> =
            periods.keys().map(|period| (*period, Vec::new())).collect();
        let mut tps = IndexMap::new();
        for (id, timestamp, ts_id) in timepoints {
            let ts = timeseries
                .get(&ts_id)
                .with_context(|| format!("Timepoint {id} refers to unknown timeseries {ts_id}"))?;
            let timepoint = Timepoint {
                id,
                timestamp,
                timeseries: ts.id.clone(),
                period: ts.period,
                weight: Hours::new(ts.duration_of_tp.value() * ts.scale_to_period),
            };
            ensure!(
                tps.insert(id, timepoint).is_none(),
                "Duplicate timepoint {id}"
            );
            tps_in_period[&ts.period].push(id);
        }
        ensure!(!tps.is_empty(), "At least one timepoint must be defined");

        for ts in timeseries.values() {
            let count = tps.values().filter(|tp| tp.timeseries == ts.id).count();
            ensure!(
                count == ts.num_tps as usize,
                "Timeseries {} declares {} timepoints but {count} were provided",
                ts.id,
                ts.num_tps
            );
        }

        Ok(Self {
            periods,
            timepoints: tps,
            tps_in_period,
        })
    }

    /// Iterate over the periods, in order
    pub fn iter_periods(&self) -> impl Iterator<Item = Period> + Clone + '_ {
        self.periods.keys().copied()
    }

    /// Get information about the given period
    pub fn period_info(&self, period: Period) -> Option<&PeriodInfo> {
        self.periods.get(&period)
    }

    /// Iterate over all timepoint IDs, in order
    pub fn iter_timepoints(&self) -> impl Iterator<Item = TimepointID> + Clone + '_ {
        self.timepoints.keys().copied()
    }

    /// The number of timepoints in the model
    pub fn num_timepoints(&self) -> usize {
        self.timepoints.len()
    }

    /// Whether the given timepoint exists
    pub fn contains_timepoint(&self, id: TimepointID) -> bool {
        self.timepoints.contains_key(&id)
    }

    /// Get the [`Timepoint`] with the given ID.
    ///
    /// Panics if the timepoint is unknown.
    pub fn timepoint(&self, id: TimepointID) -> &Timepoint {
        self.timepoints
            .get(&id)
            .unwrap_or_else(|| panic!("Unknown timepoint {id}"))
    }

    /// The period a timepoint belongs to
    pub fn tp_period(&self, id: TimepointID) -> Period {
        self.timepoint(id).period
    }

    /// The number of hours a timepoint represents in its period
    pub fn tp_weight(&self, id: TimepointID) -> Hours {
        self.timepoint(id).weight
    }

    /// Iterate over the timepoints in the given period, in order
    pub fn iter_tps_in_period(&self, period: Period) -> impl Iterator<Item = TimepointID> + '_ {
        self.tps_in_period
            .get(&period)
            .into_iter()
            .flat_map(|tps| tps.iter().copied())
    }
}
