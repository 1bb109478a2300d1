//! Generation projects are the power plants and resources which can be dispatched to meet demand.
use crate::fuel::FuelID;
use crate::id::{define_id_getter, define_id_type};
use crate::load_zone::ZoneID;
use crate::timescale::{Period, TimepointID};
use crate::units::{Dimensionless, HeatRate, MoneyPerEnergy, MoneyPerPowerPerYear, Power};
use indexmap::{IndexMap, IndexSet};
use std::rc::Rc;

define_id_type! {GenerationProjectID}

/// A map of [`GenerationProject`]s, keyed by project ID
pub type GenerationProjectMap = IndexMap<GenerationProjectID, Rc<GenerationProject>>;

/// The maximum capacity factor of a variable generator at each timepoint
pub type CapacityFactorMap = IndexMap<TimepointID, Dimensionless>;

/// A power plant or other generation resource
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProject {
    /// Unique identifier for the project
    pub id: GenerationProjectID,
    /// Technology label (e.g. "Solar_PV")
    pub tech: String,
    /// The energy source, which is either a fuel ID, a non-fuel source or "multiple"
    pub energy_source: String,
    /// The load zone the project is located in
    pub load_zone: ZoneID,
    /// Whether output depends on a weather-driven resource
    pub is_variable: bool,
    /// Whether output must be flat across each period
    pub is_baseload: bool,
    /// Whether the project is a storage resource
    pub is_storage: bool,
    /// Maximum capacity which can be built, if limited
    pub capacity_limit: Option<Power>,
    /// Fuel use per unit of electricity for fuel-based projects
    pub full_load_heat_rate: Option<HeatRate>,
    /// Fraction of capacity available on average once outages are accounted for
    pub availability: Dimensionless,
    /// The fuels the project can burn (empty for non-fuel projects)
    pub fuels: IndexSet<FuelID>,
    /// Contracted price per MWh of available energy
    pub ppa_energy_cost: MoneyPerEnergy,
    /// Contracted price per MW of capacity per year
    pub ppa_capacity_cost: MoneyPerPowerPerYear,
    /// Maximum annual excess generation, as hours of full-capacity output.
    ///
    /// Infinite if there is no cap.
    pub excess_max: f64,
    /// Maximum capacity factors (variable projects only)
    pub max_capacity_factors: CapacityFactorMap,
    /// Capacity already built or contracted, keyed by build year
    pub predetermined_capacity: IndexMap<Period, Power>,
    /// Years in which new capacity may be built
    pub build_years: IndexSet<Period>,
}
define_id_getter! {GenerationProject, GenerationProjectID}

impl GenerationProject {
    /// Availability from forced and scheduled outage rates
    pub fn availability_from_outage_rates(forced: f64, scheduled: f64) -> Dimensionless {
        Dimensionless::new((1.0 - forced) * (1.0 - scheduled))
    }

    /// Whether the project burns fuel
    pub fn is_fuel_based(&self) -> bool {
        !self.fuels.is_empty()
    }

    /// Whether the project has a finite cap on annual excess generation
    pub fn has_excess_cap(&self) -> bool {
        self.excess_max.is_finite()
    }

    /// The maximum capacity factor at the given timepoint.
    ///
    /// Non-variable projects always have a capacity factor of one.
    pub fn max_capacity_factor(&self, tp: TimepointID) -> Dimensionless {
        if !self.is_variable {
            return Dimensionless::new(1.0);
        }

        *self
            .max_capacity_factors
            .get(&tp)
            .unwrap_or_else(|| panic!("No capacity factor for project {} at {tp}", self.id))
    }

    /// Iterate over all the years in which capacity is (or may be) added
    pub fn iter_build_years(&self) -> impl Iterator<Item = Period> + '_ {
        self.predetermined_capacity
            .keys()
            .chain(self.build_years.iter())
            .copied()
    }

    /// The first year in which the project has any capacity
    pub fn first_build_year(&self) -> Option<Period> {
        self.iter_build_years().min()
    }

    /// Whether the project can operate in the given period
    pub fn is_active_in(&self, period: Period) -> bool {
        self.first_build_year().is_some_and(|year| year <= period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{baseload_gen, solar_gen};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_availability_from_outage_rates() {
        let availability = GenerationProject::availability_from_outage_rates(0.05, 0.0);
        assert_approx_eq!(f64, availability.value(), 0.95);
        let availability = GenerationProject::availability_from_outage_rates(0.1, 0.2);
        assert_approx_eq!(f64, availability.value(), 0.72);
    }

    #[rstest]
    fn test_max_capacity_factor(solar_gen: GenerationProject, baseload_gen: GenerationProject) {
        assert_approx_eq!(f64, solar_gen.max_capacity_factor(TimepointID(1)).value(), 0.0);
        assert_approx_eq!(f64, solar_gen.max_capacity_factor(TimepointID(13)).value(), 0.4);
        assert_approx_eq!(
            f64,
            baseload_gen.max_capacity_factor(TimepointID(13)).value(),
            1.0
        );
    }

    #[rstest]
    fn test_is_active_in(mut baseload_gen: GenerationProject) {
        assert!(baseload_gen.is_active_in(Period(2030)));
        assert!(!baseload_gen.is_active_in(Period(2020)));

        baseload_gen.predetermined_capacity.clear();
        assert!(!baseload_gen.is_active_in(Period(2030)));

        baseload_gen.build_years.insert(Period(2030));
        assert!(baseload_gen.is_active_in(Period(2030)));
    }
}
