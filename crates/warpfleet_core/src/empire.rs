//! Empires and the fleets they own.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fleet::FleetId;

/// Stable handle for an empire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct EmpireId(pub u32);

impl fmt::Display for EmpireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "empire#{}", self.0)
    }
}

/// A player or AI faction owning a set of fleets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empire {
    /// Stable identifier.
    pub id: EmpireId,
    /// Display name.
    pub name: String,
    fleets: BTreeSet<FleetId>,
}

impl Empire {
    /// Create an empire with no fleets.
    #[must_use]
    pub fn new(id: EmpireId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fleets: BTreeSet::new(),
        }
    }

    /// Register a fleet as owned by this empire.
    pub fn add_fleet(&mut self, fleet: FleetId) {
        self.fleets.insert(fleet);
    }

    /// Release a fleet. Returns `false` if it was not owned here.
    pub fn remove_fleet(&mut self, fleet: FleetId) -> bool {
        self.fleets.remove(&fleet)
    }

    /// Check ownership of a fleet.
    #[must_use]
    pub fn owns(&self, fleet: FleetId) -> bool {
        self.fleets.contains(&fleet)
    }

    /// Owned fleets in ascending id order.
    pub fn fleets(&self) -> impl Iterator<Item = FleetId> + '_ {
        self.fleets.iter().copied()
    }

    /// Number of owned fleets.
    #[must_use]
    pub fn fleet_count(&self) -> usize {
        self.fleets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_fleet() {
        let mut empire = Empire::new(EmpireId(1), "Terran Union");
        empire.add_fleet(FleetId(7));
        empire.add_fleet(FleetId(3));
        assert!(empire.owns(FleetId(7)));
        assert_eq!(empire.fleets().collect::<Vec<_>>(), vec![FleetId(3), FleetId(7)]);

        assert!(empire.remove_fleet(FleetId(7)));
        assert!(!empire.remove_fleet(FleetId(7)));
        assert_eq!(empire.fleet_count(), 1);
    }
}
