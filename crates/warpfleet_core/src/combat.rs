//! Combat resolver seam.
//!
//! The scheduler only detects contested hexes and asks a resolver who wins
//! each encounter. Resolvers may use their own seeded randomness; nothing
//! else in the core may.

use crate::fleet::{Fleet, FleetId};

/// Decides the outcome of a single encounter between two hostile fleets.
pub trait CombatResolver {
    /// Return the id of the surviving fleet, which must be `a.id` or `b.id`.
    fn resolve_encounter(&mut self, a: &Fleet, b: &Fleet) -> FleetId;
}

/// The fleet with more ships wins; ties go to the lower fleet id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFleetWins;

impl CombatResolver for LargestFleetWins {
    fn resolve_encounter(&mut self, a: &Fleet, b: &Fleet) -> FleetId {
        match a.ships.len().cmp(&b.ships.len()) {
            std::cmp::Ordering::Greater => a.id,
            std::cmp::Ordering::Less => b.id,
            std::cmp::Ordering::Equal => a.id.min(b.id),
        }
    }
}

impl<F> CombatResolver for F
where
    F: FnMut(&Fleet, &Fleet) -> FleetId,
{
    fn resolve_encounter(&mut self, a: &Fleet, b: &Fleet) -> FleetId {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::empire::EmpireId;
    use crate::fleet::Ship;
    use crate::hex::HexCoord;
    use crate::math::Fixed;

    fn fleet(id: u64, ships: usize) -> Fleet {
        let mut f = Fleet::new(EmpireId(1), "F", HexCoord::ORIGIN, Fixed::ONE)
            .with_ships((0..ships).map(|i| Ship::new(format!("S{i}"), "Frigate")));
        f.id = FleetId(id);
        f
    }

    #[test]
    fn test_largest_fleet_wins() {
        let mut resolver = LargestFleetWins;
        assert_eq!(resolver.resolve_encounter(&fleet(1, 2), &fleet(2, 5)), FleetId(2));
        assert_eq!(resolver.resolve_encounter(&fleet(3, 4), &fleet(2, 4)), FleetId(2));
    }

    #[test]
    fn test_closure_resolver() {
        let mut calls = 0;
        let mut resolver = |a: &Fleet, _: &Fleet| {
            calls += 1;
            a.id
        };
        assert_eq!(resolver.resolve_encounter(&fleet(7, 0), &fleet(8, 9)), FleetId(7));
        drop(resolver);
        assert_eq!(calls, 1);
    }
}
