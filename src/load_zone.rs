//! Load zones are the electrical demand areas which generators serve.
use crate::id::define_id_type;
use crate::timescale::TimepointID;
use crate::units::Power;
use indexmap::{IndexMap, IndexSet};

define_id_type! {ZoneID}

/// The set of load zones in the model
pub type ZoneSet = IndexSet<ZoneID>;

/// Demand in each load zone for every timepoint
#[derive(Debug, Default, PartialEq)]
pub struct ZoneDemandMap(IndexMap<(ZoneID, TimepointID), Power>);

impl ZoneDemandMap {
    /// Create a new, empty [`ZoneDemandMap`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a demand value, returning the previous value if there was one
    pub fn insert(&mut self, zone: ZoneID, tp: TimepointID, demand: Power) -> Option<Power> {
        self.0.insert((zone, tp), demand)
    }

    /// Get the demand for the given zone and timepoint, if present
    pub fn get(&self, zone: &ZoneID, tp: TimepointID) -> Option<Power> {
        self.0.get(&(zone.clone(), tp)).copied()
    }

    /// Whether demand has been given for the zone and timepoint
    pub fn contains(&self, zone: &ZoneID, tp: TimepointID) -> bool {
        self.0.contains_key(&(zone.clone(), tp))
    }
}
