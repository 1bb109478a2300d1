//! Fuels are combustible energy sources consumed by thermal generators.
use crate::id::{define_id_getter, define_id_type};
use crate::load_zone::ZoneID;
use crate::timescale::Period;
use crate::units::MoneyPerFuel;
use indexmap::IndexMap;

define_id_type! {FuelID}

/// A map of [`Fuel`]s, keyed by fuel ID
pub type FuelMap = IndexMap<FuelID, Fuel>;

/// The cost of each fuel for a given load zone and period
pub type FuelCostMap = IndexMap<(ZoneID, FuelID, Period), MoneyPerFuel>;

/// A fuel which can be burned by fuel-based generators
#[derive(Debug, Clone, PartialEq)]
pub struct Fuel {
    /// Unique identifier for the fuel (e.g. "NaturalGas")
    pub id: FuelID,
    /// Direct emissions intensity (tCO2/MMBtu)
    pub co2_intensity: f64,
    /// Upstream emissions intensity (tCO2/MMBtu)
    pub upstream_co2_intensity: f64,
}
define_id_getter! {Fuel, FuelID}
