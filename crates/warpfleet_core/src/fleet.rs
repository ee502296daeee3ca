//! Fleets, their order queues, and the handle table that owns them.
//!
//! Orders refer to other fleets by [`FleetId`] rather than by reference.
//! A destroyed fleet simply disappears from the [`FleetRegistry`], so any
//! order still pointing at it resolves to "not found" on its next use.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::empire::EmpireId;
use crate::galaxy::PlanetId;
use crate::hex::HexCoord;
use crate::math::{fixed_serde, whole_part, Fixed};

/// Stable handle for a fleet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct FleetId(pub u64);

impl fmt::Display for FleetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fleet#{}", self.0)
    }
}

/// A single ship. Opaque to the movement core; only carried and merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    /// Ship name.
    pub name: String,
    /// Hull class, e.g. `"Frigate"` or `"Colony Ship"`.
    pub class: String,
}

impl Ship {
    /// Create a ship.
    #[must_use]
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
        }
    }
}

/// A fleet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Travel to a global hex.
    Move(HexCoord),
    /// Colonize a specific planet, or the first unowned planet at the
    /// fleet's hex when `None`. Executed at end of turn.
    Colonize(Option<PlanetId>),
    /// Pursue another fleet, re-targeting every time the order is resolved.
    MoveToFleet(FleetId),
    /// Merge into another fleet once co-located.
    JoinFleet(FleetId),
}

/// Why an order was dropped without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelReason {
    /// The referenced fleet no longer exists.
    TargetFleetLost,
    /// The fleet was not at the required location.
    NotCoLocated,
    /// The planet already has an owner.
    PlanetOwned,
    /// The referenced planet does not exist.
    PlanetMissing,
    /// No unowned planet at the fleet's hex.
    NoUnownedPlanet,
    /// The order targets the fleet itself or a fleet of another empire.
    InvalidTarget,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TargetFleetLost => "target fleet no longer exists",
            Self::NotCoLocated => "not at the target location",
            Self::PlanetOwned => "planet is already owned",
            Self::PlanetMissing => "planet does not exist",
            Self::NoUnownedPlanet => "no unowned planet here",
            Self::InvalidTarget => "target fleet cannot be joined",
        };
        f.write_str(text)
    }
}

/// Result of one order-processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOutcome {
    /// The order finished and was removed from the queue.
    Completed,
    /// The order was dropped.
    Cancelled(CancelReason),
    /// The order stays at the head of the queue.
    Pending,
}

/// FIFO queue of orders. The head is the current order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueue {
    orders: VecDeque<Order>,
}

impl OrderQueue {
    /// Create an empty order queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
        }
    }

    /// Add an order to the back of the queue.
    pub fn push(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    /// Replace all orders with a single new order.
    pub fn set(&mut self, order: Order) {
        self.orders.clear();
        self.orders.push_back(order);
    }

    /// The order currently being executed.
    #[must_use]
    pub fn current(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Remove and return the current order.
    pub fn pop(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Drop all orders.
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of queued orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Orders front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

/// A group of ships moving together under one order queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    /// Handle assigned by the [`FleetRegistry`].
    pub id: FleetId,
    /// Owning empire.
    pub owner: EmpireId,
    /// Display name.
    pub name: String,
    /// Current global hex.
    pub location: HexCoord,
    /// Hexes of movement per turn. Truncated to whole steps when moving.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Ships in this fleet.
    pub ships: Vec<Ship>,
    /// Pending orders.
    pub orders: OrderQueue,
    /// Remaining steps for the current order, next hex first.
    pub path: VecDeque<HexCoord>,
}

impl Fleet {
    /// Create a fleet with no orders. The id is assigned on registration.
    #[must_use]
    pub fn new(owner: EmpireId, name: impl Into<String>, location: HexCoord, speed: Fixed) -> Self {
        Self {
            id: FleetId(0),
            owner,
            name: name.into(),
            location,
            speed,
            ships: Vec::new(),
            orders: OrderQueue::new(),
            path: VecDeque::new(),
        }
    }

    /// Builder-style helper to add ships.
    #[must_use]
    pub fn with_ships(mut self, ships: impl IntoIterator<Item = Ship>) -> Self {
        self.ships.extend(ships);
        self
    }

    /// Whole hexes moved per turn (`floor(speed)`).
    #[must_use]
    pub fn steps_per_turn(&self) -> u32 {
        whole_part(self.speed)
    }

    /// Sub-ticks between moves: `max(1, floor(ticks_per_turn / speed))`.
    ///
    /// Returns `None` for a fleet that cannot move. The fractional part of
    /// the interval is dropped and never carried into the next turn.
    #[must_use]
    pub fn move_interval(&self, ticks_per_turn: u32) -> Option<u32> {
        if self.speed <= Fixed::ZERO {
            return None;
        }
        let interval = Fixed::from_num(ticks_per_turn)
            .checked_div(self.speed)
            .map_or(u32::MAX, whole_part);
        Some(interval.max(1))
    }

    /// The hex the cached path ends on.
    #[must_use]
    pub fn path_destination(&self) -> Option<HexCoord> {
        self.path.back().copied()
    }

    /// Replace the cached path with a freshly computed route.
    ///
    /// Leading hexes equal to the current location are dropped so that the
    /// front of the path is always the next hex to enter.
    pub fn set_path(&mut self, route: Vec<HexCoord>) {
        let skip = route
            .iter()
            .take_while(|&&hex| hex == self.location)
            .count();
        self.path = route.into_iter().skip(skip).collect();
    }

    /// Pop the current order and discard its cached path.
    pub fn finish_order(&mut self) -> Option<Order> {
        self.path.clear();
        self.orders.pop()
    }

    /// Cancel everything. No partial-completion cleanup is needed.
    pub fn clear_orders(&mut self) {
        self.orders.clear();
        self.path.clear();
    }
}

/// Liveness-checked table of all fleets.
///
/// Uses a `HashMap` for O(1) lookup by id, with deterministic iteration via
/// [`sorted_ids`](Self::sorted_ids) whenever the simulation walks fleets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetRegistry {
    fleets: HashMap<FleetId, Fleet>,
    next_id: u64,
}

impl FleetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fleets: HashMap::new(),
            next_id: 1,
        }
    }

    /// Register a fleet and return its new handle.
    pub fn insert(&mut self, mut fleet: Fleet) -> FleetId {
        let id = FleetId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        fleet.id = id;
        self.fleets.insert(id, fleet);
        id
    }

    /// Remove a fleet. Later lookups of `id` return `None`.
    pub fn remove(&mut self, id: FleetId) -> Option<Fleet> {
        self.fleets.remove(&id)
    }

    /// Get a fleet by handle.
    #[must_use]
    pub fn get(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.get(&id)
    }

    /// Get a mutable fleet by handle.
    pub fn get_mut(&mut self, id: FleetId) -> Option<&mut Fleet> {
        self.fleets.get_mut(&id)
    }

    /// Check if a handle is still live.
    #[must_use]
    pub fn contains(&self, id: FleetId) -> bool {
        self.fleets.contains_key(&id)
    }

    /// Number of live fleets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fleets.len()
    }

    /// Check if no fleets are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fleets.is_empty()
    }

    /// Live fleet ids in ascending order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<FleetId> {
        let mut ids: Vec<_> = self.fleets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all fleets (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = &Fleet> {
        self.fleets.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(speed: i32) -> Fleet {
        Fleet::new(EmpireId(1), "Home Guard", HexCoord::ORIGIN, Fixed::from_num(speed))
    }

    #[test]
    fn test_order_queue_fifo() {
        let mut queue = OrderQueue::new();
        queue.push(Order::Move(HexCoord::new(1, 0)));
        queue.push(Order::Colonize(None));
        assert_eq!(queue.current(), Some(&Order::Move(HexCoord::new(1, 0))));
        assert_eq!(queue.pop(), Some(Order::Move(HexCoord::new(1, 0))));
        assert_eq!(queue.current(), Some(&Order::Colonize(None)));

        queue.set(Order::JoinFleet(FleetId(4)));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.current(), Some(&Order::JoinFleet(FleetId(4))));
    }

    #[test]
    fn test_move_interval() {
        assert_eq!(fleet(5).move_interval(100), Some(20));
        assert_eq!(fleet(10).move_interval(100), Some(10));
        assert_eq!(fleet(3).move_interval(100), Some(33));
        assert_eq!(fleet(250).move_interval(100), Some(1));
        assert_eq!(fleet(0).move_interval(100), None);

        let mut slow = fleet(0);
        slow.speed = Fixed::from_num(0.5);
        assert_eq!(slow.move_interval(100), Some(200));
        assert_eq!(slow.steps_per_turn(), 0);
    }

    #[test]
    fn test_set_path_drops_current_hex() {
        let mut f = fleet(2);
        f.set_path(vec![HexCoord::ORIGIN, HexCoord::new(1, 0), HexCoord::new(2, 0)]);
        assert_eq!(f.path.front(), Some(&HexCoord::new(1, 0)));
        assert_eq!(f.path_destination(), Some(HexCoord::new(2, 0)));
    }

    #[test]
    fn test_clear_orders_discards_path() {
        let mut f = fleet(2);
        f.orders.push(Order::Move(HexCoord::new(2, 0)));
        f.set_path(vec![HexCoord::new(1, 0), HexCoord::new(2, 0)]);
        f.clear_orders();
        assert!(f.orders.is_empty());
        assert!(f.path.is_empty());
    }

    #[test]
    fn test_registry_handles_are_not_reused() {
        let mut registry = FleetRegistry::new();
        let a = registry.insert(fleet(1));
        let b = registry.insert(fleet(1));
        assert_eq!(registry.get(a).unwrap().id, a);

        registry.remove(a);
        assert!(!registry.contains(a));
        let c = registry.insert(fleet(1));
        assert_ne!(c, a);
        assert_eq!(registry.sorted_ids(), vec![b, c]);
    }
}
