//! Star systems, planets, and the warp-point graph linking them.
//!
//! Systems live on a single global hex grid. Everything inside a system
//! (warp points, planets) is stored with a location relative to the
//! system centre and converted to global hexes on demand.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::empire::EmpireId;
use crate::error::{GameError, Result};
use crate::hex::HexCoord;

/// Stable handle for a star system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SystemId(pub u32);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// Stable handle for a planet, unique across the whole galaxy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct PlanetId(pub u32);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "planet#{}", self.0)
    }
}

/// One end of a warp link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpPoint {
    /// System on the far side of the link.
    pub destination: SystemId,
    /// Position relative to the owning system's centre.
    pub location: HexCoord,
}

impl WarpPoint {
    /// Global hex of this warp point inside `owner`.
    #[must_use]
    pub fn global_location(&self, owner: &StarSystem) -> HexCoord {
        owner.global_location + self.location
    }
}

/// A colonizable body inside a system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    /// Galaxy-wide identifier.
    pub id: PlanetId,
    /// Display name.
    pub name: String,
    /// Owning empire, `None` while uncolonized.
    pub owner: Option<EmpireId>,
    /// Position relative to the system centre.
    pub location: HexCoord,
}

/// A star system node in the warp graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSystem {
    /// Stable identifier.
    pub id: SystemId,
    /// Unique display name.
    pub name: String,
    /// Centre of the system on the global grid.
    pub global_location: HexCoord,
    /// Outgoing warp links.
    pub warp_points: Vec<WarpPoint>,
    /// Planets orbiting this star.
    pub planets: Vec<Planet>,
}

impl StarSystem {
    /// The warp point in this system leading to `destination`, if any.
    #[must_use]
    pub fn warp_point_to(&self, destination: SystemId) -> Option<&WarpPoint> {
        self.warp_points
            .iter()
            .find(|wp| wp.destination == destination)
    }

    /// Global hex of a planet in this system.
    #[must_use]
    pub fn planet_global_location(&self, planet: &Planet) -> HexCoord {
        self.global_location + planet.location
    }
}

/// The full galaxy: systems indexed by id, location, and name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Galaxy {
    systems: Vec<StarSystem>,
    by_location: BTreeMap<HexCoord, SystemId>,
    by_name: HashMap<String, SystemId>,
    next_planet: u32,
}

impl Galaxy {
    /// Create an empty galaxy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a star system centred on `global_location`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the name or location is taken.
    pub fn add_system(
        &mut self,
        name: impl Into<String>,
        global_location: HexCoord,
    ) -> Result<SystemId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GameError::InvalidState(format!(
                "Duplicate system name '{name}'"
            )));
        }
        if self.by_location.contains_key(&global_location) {
            return Err(GameError::InvalidState(format!(
                "A system already occupies {global_location}"
            )));
        }

        let id = SystemId(self.systems.len() as u32);
        self.systems.push(StarSystem {
            id,
            name: name.clone(),
            global_location,
            warp_points: Vec::new(),
            planets: Vec::new(),
        });
        self.by_location.insert(global_location, id);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Add a planet to a system at a location relative to the system centre.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SystemNotFound`] if `system` does not exist.
    pub fn add_planet(
        &mut self,
        system: SystemId,
        name: impl Into<String>,
        location: HexCoord,
    ) -> Result<PlanetId> {
        let id = PlanetId(self.next_planet);
        let star = self
            .system_mut(system)
            .ok_or(GameError::SystemNotFound(system))?;
        star.planets.push(Planet {
            id,
            name: name.into(),
            owner: None,
            location,
        });
        self.next_planet += 1;
        Ok(id)
    }

    /// Create a reciprocal warp link between two systems.
    ///
    /// `loc_a` is the warp point's position inside `a`, `loc_b` inside `b`.
    /// Links are always created in pairs, so the graph is undirected.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidLink`] for self-links or duplicates, and
    /// [`GameError::SystemNotFound`] for unknown systems.
    pub fn link(
        &mut self,
        a: SystemId,
        b: SystemId,
        loc_a: HexCoord,
        loc_b: HexCoord,
    ) -> Result<()> {
        if a == b {
            return Err(GameError::InvalidLink {
                a,
                b,
                reason: "a system cannot link to itself".into(),
            });
        }
        let sys_a = self.system(a).ok_or(GameError::SystemNotFound(a))?;
        if self.system(b).is_none() {
            return Err(GameError::SystemNotFound(b));
        }
        if sys_a.warp_point_to(b).is_some() {
            return Err(GameError::InvalidLink {
                a,
                b,
                reason: "systems are already linked".into(),
            });
        }

        if let Some(sys) = self.system_mut(a) {
            sys.warp_points.push(WarpPoint {
                destination: b,
                location: loc_a,
            });
        }
        if let Some(sys) = self.system_mut(b) {
            sys.warp_points.push(WarpPoint {
                destination: a,
                location: loc_b,
            });
        }
        Ok(())
    }

    pub(crate) fn system_mut(&mut self, id: SystemId) -> Option<&mut StarSystem> {
        self.systems.get_mut(id.0 as usize)
    }

    /// Look up a system by id.
    #[must_use]
    pub fn system(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.get(id.0 as usize)
    }

    /// Look up the system centred exactly on `hex`.
    #[must_use]
    pub fn system_at(&self, hex: HexCoord) -> Option<&StarSystem> {
        self.by_location.get(&hex).and_then(|&id| self.system(id))
    }

    /// Look up a system by name.
    #[must_use]
    pub fn system_by_name(&self, name: &str) -> Option<&StarSystem> {
        self.by_name.get(name).and_then(|&id| self.system(id))
    }

    /// All systems in id order.
    pub fn systems(&self) -> impl Iterator<Item = &StarSystem> {
        self.systems.iter()
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// True if the galaxy has no systems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// The closest system whose centre is within `radius` of `hex`.
    ///
    /// Ties break on the lower [`SystemId`].
    #[must_use]
    pub fn system_containing(&self, hex: HexCoord, radius: u32) -> Option<&StarSystem> {
        self.nearest_system(hex)
            .filter(|sys| sys.global_location.distance(hex) <= radius)
    }

    /// The system that owns `hex` for routing purposes.
    ///
    /// A hex inside a system's radius belongs to it; any other hex belongs
    /// to the nearest system. Returns `None` only for an empty galaxy.
    #[must_use]
    pub fn owning_system(&self, hex: HexCoord, radius: u32) -> Option<&StarSystem> {
        self.system_containing(hex, radius)
            .or_else(|| self.nearest_system(hex))
    }

    fn nearest_system(&self, hex: HexCoord) -> Option<&StarSystem> {
        self.systems
            .iter()
            .min_by_key(|sys| (sys.global_location.distance(hex), sys.id))
    }

    /// Find a planet and the system it orbits.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<(&StarSystem, &Planet)> {
        self.systems.iter().find_map(|sys| {
            sys.planets
                .iter()
                .find(|p| p.id == id)
                .map(|planet| (sys, planet))
        })
    }

    /// Mutable access to a planet.
    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.systems
            .iter_mut()
            .flat_map(|sys| sys.planets.iter_mut())
            .find(|p| p.id == id)
    }

    /// Global hex of a planet.
    #[must_use]
    pub fn planet_location(&self, id: PlanetId) -> Option<HexCoord> {
        self.planet(id)
            .map(|(sys, planet)| sys.planet_global_location(planet))
    }

    /// Planets whose global location is `hex`, in id order.
    #[must_use]
    pub fn planets_at(&self, hex: HexCoord) -> Vec<&Planet> {
        let mut found: Vec<&Planet> = self
            .systems
            .iter()
            .flat_map(|sys| {
                sys.planets
                    .iter()
                    .filter(move |p| sys.planet_global_location(p) == hex)
            })
            .collect();
        found.sort_by_key(|p| p.id);
        found
    }
}
