//! Limits on how far demand in a load zone can be shifted up or down at each timepoint.
use crate::load_zone::ZoneID;
use crate::timescale::TimepointID;
use crate::units::Power;
use indexmap::IndexMap;

/// How much demand may be moved away from or into a single (zone, timepoint)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftLimits {
    /// Maximum reduction in demand (MW)
    pub down: Power,
    /// Maximum increase in demand (MW). Infinite if unlimited.
    pub up: Power,
}

impl Default for ShiftLimits {
    fn default() -> Self {
        Self {
            down: Power::new(0.0),
            up: Power::new(f64::INFINITY),
        }
    }
}

/// Shift limits for every (zone, timepoint) given explicitly in the input data.
///
/// Pairs which are absent take the default limits: no downward shifting and unlimited upward
/// shifting.
#[derive(Debug, Default, PartialEq)]
pub struct ShiftLimitMap(IndexMap<(ZoneID, TimepointID), ShiftLimits>);

impl ShiftLimitMap {
    /// Create a new, empty [`ShiftLimitMap`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits for a (zone, timepoint), returning the previous limits if there were any
    pub fn insert(
        &mut self,
        zone: ZoneID,
        tp: TimepointID,
        limits: ShiftLimits,
    ) -> Option<ShiftLimits> {
        self.0.insert((zone, tp), limits)
    }

    /// Get the limits for the given zone and timepoint, falling back to the defaults
    pub fn get(&self, zone: &ZoneID, tp: TimepointID) -> ShiftLimits {
        self.0
            .get(&(zone.clone(), tp))
            .copied()
            .unwrap_or_default()
    }

    /// The number of explicitly given entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no limits were given explicitly
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_falls_back_to_defaults() {
        let zone: ZoneID = "North".into();
        let mut limits = ShiftLimitMap::new();
        limits.insert(
            zone.clone(),
            TimepointID(1),
            ShiftLimits {
                down: Power::new(5.0),
                up: Power::new(3.0),
            },
        );

        assert_eq!(limits.get(&zone, TimepointID(1)).down, Power::new(5.0));
        assert_eq!(limits.get(&zone, TimepointID(1)).up, Power::new(3.0));

        let default = limits.get(&zone, TimepointID(2));
        assert_eq!(default.down, Power::new(0.0));
        assert!(!default.up.is_finite());
        assert_eq!(limits.get(&"South".into(), TimepointID(1)), ShiftLimits::default());
    }
}
