//! Partitioning of timepoints into calendar days.
//!
//! Days are numbered 1 to 365 (a non-leap year). Each timepoint belongs to exactly one day and a
//! day never spans two periods.
use crate::id::define_numeric_id_type;
use crate::timescale::{TimeDomain, TimepointID};
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use std::ops::RangeInclusive;

/// The range of valid day numbers
pub const DAYS: RangeInclusive<u16> = 1..=365;

define_numeric_id_type!(
    /// A day of the year, from 1 to 365
    Day,
    u16
);

/// Maps each timepoint to a day and each day to its ordered timepoints
#[derive(Debug, PartialEq)]
pub struct DayPartition {
    tp_day: IndexMap<TimepointID, Day>,
    tps_in_day: Vec<Vec<TimepointID>>,
}

impl DayPartition {
    /// Create a new [`DayPartition`] from per-timepoint day labels.
    ///
    /// Every timepoint in `time_domain` must be labelled exactly once and every label must be in
    /// the range 1 to 365.
    pub fn new<I>(time_domain: &TimeDomain, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (TimepointID, u16)>,
    {
        let mut unordered = IndexMap::new();
        for (tp, day) in labels {
            ensure!(
                time_domain.contains_timepoint(tp),
                "Day label given for unknown timepoint {tp}"
            );
            ensure!(
                DAYS.contains(&day),
                "Invalid day {day} for timepoint {tp}: must be between {} and {}",
                DAYS.start(),
                DAYS.end()
            );
            ensure!(
                unordered.insert(tp, Day(day)).is_none(),
                "Duplicate day label for timepoint {tp}"
            );
        }

        // Store in the same order as the time domain
        let mut tp_day = IndexMap::with_capacity(unordered.len());
        let mut tps_in_day = vec![Vec::new(); DAYS.len()];
        let mut missing = Vec::new();
        for tp in time_domain.iter_timepoints() {
            match unordered.get(&tp) {
                Some(day) => {
                    tp_day.insert(tp, *day);
                    tps_in_day[Self::day_index(*day)].push(tp);
                }
                None => missing.push(tp.0),
            }
        }
        ensure!(
            missing.is_empty(),
            "The following timepoints are not assigned to a day: {missing:?}"
        );

        for (day, tps) in DAYS.zip(&tps_in_day) {
            let mut periods = tps.iter().map(|tp| time_domain.tp_period(*tp));
            if let Some(first) = periods.next() {
                ensure!(
                    periods.all(|period| period == first),
                    "Day {day} spans more than one period"
                );
            }
        }

        Ok(Self { tp_day, tps_in_day })
    }

    fn day_index(day: Day) -> usize {
        usize::from(day.0 - DAYS.start())
    }

    /// Iterate over all days of the year, including those without timepoints
    pub fn iter_days(&self) -> impl Iterator<Item = Day> {
        DAYS.map(Day)
    }

    /// The day the given timepoint falls in, or `None` if the timepoint is unknown
    pub fn day_of(&self, tp: TimepointID) -> Option<Day> {
        self.tp_day.get(&tp).copied()
    }

    /// The timepoints in the given day, in time-domain order.
    ///
    /// Days without any timepoints yield an empty slice.
    pub fn tps_in_day(&self, day: Day) -> &[TimepointID] {
        assert!(DAYS.contains(&day.0), "Invalid day {day}");
        &self.tps_in_day[Self::day_index(day)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, time_domain};
    use rstest::rstest;

    /// 48 hourly timepoints covering days 1 and 2
    fn two_day_labels() -> Vec<(TimepointID, u16)> {
        (1..=48u32)
            .map(|tp| (TimepointID(tp), u16::try_from((tp - 1) / 24 + 1).unwrap()))
            .collect()
    }

    #[rstest]
    fn test_new(time_domain: TimeDomain) {
        let days = DayPartition::new(&time_domain, two_day_labels()).unwrap();
        assert_eq!(days.day_of(TimepointID(1)), Some(Day(1)));
        assert_eq!(days.day_of(TimepointID(25)), Some(Day(2)));
        assert_eq!(days.day_of(TimepointID(49)), None);
        assert_eq!(days.tps_in_day(Day(1)).len(), 24);
        assert_eq!(days.tps_in_day(Day(2))[0], TimepointID(25));
        assert!(days.tps_in_day(Day(3)).is_empty());
        assert_eq!(days.iter_days().count(), 365);
    }

    #[rstest]
    fn test_new_preserves_time_domain_order(time_domain: TimeDomain) {
        let labels = two_day_labels().into_iter().rev();
        let days = DayPartition::new(&time_domain, labels).unwrap();
        let expected: Vec<_> = (1..=24).map(TimepointID).collect();
        assert_eq!(days.tps_in_day(Day(1)), expected.as_slice());
    }

    #[rstest]
    #[case(0)]
    #[case(366)]
    fn test_new_day_out_of_range(time_domain: TimeDomain, #[case] day: u16) {
        let mut labels = two_day_labels();
        labels[0].1 = day;
        assert_error!(
            DayPartition::new(&time_domain, labels),
            format!("Invalid day {day} for timepoint 1: must be between 1 and 365")
        );
    }

    #[rstest]
    fn test_new_missing_timepoint(time_domain: TimeDomain) {
        let mut labels = two_day_labels();
        labels.pop();
        assert_error!(
            DayPartition::new(&time_domain, labels),
            "The following timepoints are not assigned to a day: [48]"
        );
    }

    #[rstest]
    fn test_new_duplicate_timepoint(time_domain: TimeDomain) {
        let mut labels = two_day_labels();
        labels.push((TimepointID(1), 1));
        assert_error!(
            DayPartition::new(&time_domain, labels),
            "Duplicate day label for timepoint 1"
        );
    }

    #[rstest]
    fn test_new_unknown_timepoint(time_domain: TimeDomain) {
        let mut labels = two_day_labels();
        labels.push((TimepointID(100), 1));
        assert_error!(
            DayPartition::new(&time_domain, labels),
            "Day label given for unknown timepoint 100"
        );
    }
}
