//! Game state owned by the host and mutated only by the turn scheduler.
//!
//! # Determinism
//!
//! - No floating-point math (fleet speeds are [`Fixed`](crate::math::Fixed))
//! - Fleets are always walked in ascending [`FleetId`] order
//! - Same state and orders always produce the same next state
//!
//! [`state_hash`](GameState::state_hash) summarises everything that affects
//! future turns and is used for replay verification.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::empire::{Empire, EmpireId};
use crate::error::{GameError, Result};
use crate::fleet::{Fleet, FleetId, FleetRegistry, Order};
use crate::galaxy::Galaxy;
use crate::hex::HexCoord;

/// Read-only view used by routing and interception queries.
///
/// Holding a view borrows the state immutably, so previews can never
/// overlap with a turn in progress.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// Galaxy snapshot.
    pub galaxy: &'a Galaxy,
    /// All live fleets.
    pub fleets: &'a FleetRegistry,
    /// Simulation parameters.
    pub config: &'a SimConfig,
}

impl<'a> WorldView<'a> {
    /// Bundle the pieces of a view.
    #[must_use]
    pub const fn new(galaxy: &'a Galaxy, fleets: &'a FleetRegistry, config: &'a SimConfig) -> Self {
        Self {
            galaxy,
            fleets,
            config,
        }
    }
}

/// Everything the movement core simulates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Number of completed turns.
    pub turn: u64,
    /// The galaxy, including planet ownership.
    pub galaxy: Galaxy,
    /// Empires by id.
    pub empires: BTreeMap<EmpireId, Empire>,
    /// All live fleets.
    pub fleets: FleetRegistry,
}

impl GameState {
    /// Create a state at turn zero with no empires or fleets.
    #[must_use]
    pub fn new(galaxy: Galaxy) -> Self {
        Self {
            turn: 0,
            galaxy,
            empires: BTreeMap::new(),
            fleets: FleetRegistry::new(),
        }
    }

    /// A read-only view for routing queries.
    #[must_use]
    pub fn view<'a>(&'a self, config: &'a SimConfig) -> WorldView<'a> {
        WorldView::new(&self.galaxy, &self.fleets, config)
    }

    /// Register an empire.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the id is already taken.
    pub fn add_empire(&mut self, id: EmpireId, name: impl Into<String>) -> Result<()> {
        if self.empires.contains_key(&id) {
            return Err(GameError::InvalidState(format!("Duplicate empire {id}")));
        }
        self.empires.insert(id, Empire::new(id, name));
        Ok(())
    }

    /// Look up an empire.
    #[must_use]
    pub fn empire(&self, id: EmpireId) -> Option<&Empire> {
        self.empires.get(&id)
    }

    /// Add a fleet and hand it to its owning empire.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmpireNotFound`] if the owner is not registered.
    pub fn spawn_fleet(&mut self, fleet: Fleet) -> Result<FleetId> {
        let owner = fleet.owner;
        if !self.empires.contains_key(&owner) {
            return Err(GameError::EmpireNotFound(owner.0));
        }
        let id = self.fleets.insert(fleet);
        if let Some(empire) = self.empires.get_mut(&owner) {
            empire.add_fleet(id);
        }
        Ok(id)
    }

    /// Remove a fleet from the game and from its empire.
    ///
    /// Orders elsewhere that reference it will resolve to "not found".
    pub fn destroy_fleet(&mut self, id: FleetId) -> Option<Fleet> {
        let fleet = self.fleets.remove(id)?;
        if let Some(empire) = self.empires.get_mut(&fleet.owner) {
            empire.remove_fleet(id);
        }
        Some(fleet)
    }

    /// Look up a fleet.
    #[must_use]
    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.get(id)
    }

    /// Replace a fleet's orders with a single order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::FleetNotFound`] for a dead handle.
    pub fn issue_order(&mut self, id: FleetId, order: Order) -> Result<()> {
        let fleet = self.fleets.get_mut(id).ok_or(GameError::FleetNotFound(id))?;
        fleet.clear_orders();
        fleet.orders.push(order);
        Ok(())
    }

    /// Append an order to a fleet's queue.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::FleetNotFound`] for a dead handle.
    pub fn queue_order(&mut self, id: FleetId, order: Order) -> Result<()> {
        let fleet = self.fleets.get_mut(id).ok_or(GameError::FleetNotFound(id))?;
        fleet.orders.push(order);
        Ok(())
    }

    /// Drop every order of a fleet along with its cached path.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::FleetNotFound`] for a dead handle.
    pub fn cancel_orders(&mut self, id: FleetId) -> Result<()> {
        let fleet = self.fleets.get_mut(id).ok_or(GameError::FleetNotFound(id))?;
        fleet.clear_orders();
        Ok(())
    }

    /// Fleets at a global hex, in ascending id order.
    #[must_use]
    pub fn fleets_at(&self, hex: HexCoord) -> Vec<FleetId> {
        self.fleets
            .sorted_ids()
            .into_iter()
            .filter(|&id| self.fleets.get(id).is_some_and(|f| f.location == hex))
            .collect()
    }

    /// Hash of everything that influences future turns.
    ///
    /// Two states with identical hashes replay identically.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.hash(&mut hasher);

        for system in self.galaxy.systems() {
            for planet in &system.planets {
                planet.id.hash(&mut hasher);
                planet.owner.hash(&mut hasher);
            }
        }

        for (id, empire) in &self.empires {
            id.hash(&mut hasher);
            for fleet in empire.fleets() {
                fleet.hash(&mut hasher);
            }
        }

        let ids = self.fleets.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            if let Some(fleet) = self.fleets.get(id) {
                id.hash(&mut hasher);
                fleet.owner.hash(&mut hasher);
                fleet.location.hash(&mut hasher);
                fleet.speed.to_bits().hash(&mut hasher);
                fleet.ships.hash(&mut hasher);
                for order in fleet.orders.iter() {
                    order.hash(&mut hasher);
                }
                fleet.path.hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    /// Serialize the state for replay or network sync.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize game state: {e}")))
    }

    /// Deserialize state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize game state: {e}")))
    }
}
