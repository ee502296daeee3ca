//! Scenario data loaded from RON files.
//!
//! These structs describe an initial game: systems, warp links, empires,
//! fleets, and their opening orders. Everything is referenced by name so
//! files stay readable; [`ScenarioData::build`] resolves names to ids and
//! validates the result.
//!
//! # Example RON
//!
//! ```ron
//! ScenarioData(
//!     name: "Border Skirmish",
//!     systems: [
//!         (name: "Sol", location: (q: 0, r: 0),
//!          planets: [(name: "Earth", location: (q: 1, r: 0))]),
//!         (name: "Vega", location: (q: 20, r: 0)),
//!     ],
//!     links: [(a: "Sol", b: "Vega", at_a: (q: 3, r: 0), at_b: (q: -3, r: 0))],
//!     empires: [(id: 1, name: "Terran Union")],
//!     fleets: [
//!         (name: "Home Fleet", empire: 1, location: (q: 0, r: 0), speed: 5.0,
//!          orders: [Move((q: 21, r: 0))]),
//!     ],
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::empire::EmpireId;
use crate::error::{GameError, Result};
use crate::fleet::{Fleet, FleetId, Order, Ship};
use crate::galaxy::{Galaxy, PlanetId};
use crate::hex::HexCoord;
use crate::math::{decimal_serde, Fixed};
use crate::state::GameState;

/// A complete scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Simulation parameters.
    #[serde(default)]
    pub config: SimConfig,
    /// Star systems.
    pub systems: Vec<SystemData>,
    /// Warp links between systems.
    #[serde(default)]
    pub links: Vec<LinkData>,
    /// Participating empires.
    pub empires: Vec<EmpireData>,
    /// Starting fleets.
    #[serde(default)]
    pub fleets: Vec<FleetData>,
}

/// A star system definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemData {
    /// Unique system name.
    pub name: String,
    /// Centre on the global grid.
    pub location: HexCoord,
    /// Planets, located relative to the centre.
    #[serde(default)]
    pub planets: Vec<PlanetData>,
}

/// A planet definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetData {
    /// Planet name, unique across the scenario.
    pub name: String,
    /// Location relative to the system centre.
    pub location: HexCoord,
    /// Id of the owning empire, if already colonized.
    #[serde(default)]
    pub owner: Option<u32>,
}

/// A reciprocal warp link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkData {
    /// First system name.
    pub a: String,
    /// Second system name.
    pub b: String,
    /// Warp point location inside `a`, relative to its centre.
    pub at_a: HexCoord,
    /// Warp point location inside `b`, relative to its centre.
    pub at_b: HexCoord,
}

/// An empire definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpireData {
    /// Numeric empire id.
    pub id: u32,
    /// Display name.
    pub name: String,
}

/// A fleet definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetData {
    /// Fleet name, unique across the scenario.
    pub name: String,
    /// Owning empire id.
    pub empire: u32,
    /// Starting global hex.
    pub location: HexCoord,
    /// Hexes per turn.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Ships in the fleet.
    #[serde(default)]
    pub ships: Vec<Ship>,
    /// Opening orders, front first.
    #[serde(default)]
    pub orders: Vec<OrderData>,
}

/// An order with name-based references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderData {
    /// Travel to a global hex.
    Move(HexCoord),
    /// Colonize a named planet, or the first free one on arrival.
    Colonize(Option<String>),
    /// Pursue a named fleet.
    MoveToFleet(String),
    /// Merge into a named fleet.
    JoinFleet(String),
}

/// A scenario resolved into a playable state.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Simulation parameters.
    pub config: SimConfig,
    /// Initial state.
    pub state: GameState,
    /// Fleet handles by scenario name.
    pub fleets_by_name: BTreeMap<String, FleetId>,
}

impl ScenarioData {
    /// Parse a scenario from RON text.
    ///
    /// # Errors
    /// Returns [`GameError::DataParseError`] if the text is not valid.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Load a scenario from a RON file.
    ///
    /// # Errors
    /// Returns [`GameError::DataParseError`] if the file cannot be read or
    /// parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let parse_error = |message: String| GameError::DataParseError {
            path: path.display().to_string(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        ron::from_str(&contents).map_err(|e| parse_error(e.to_string()))
    }

    /// Resolve names and build the initial game state.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidScenario`] for dangling names, duplicate
    /// names, negative speeds, or owners that are not declared empires.
    pub fn build(&self) -> Result<Scenario> {
        let (galaxy, planets) = self.build_galaxy()?;
        let mut state = GameState::new(galaxy);

        for empire in &self.empires {
            state.add_empire(EmpireId(empire.id), empire.name.clone())?;
        }
        for system in &self.systems {
            for planet in system.planets.iter().filter_map(|p| p.owner) {
                if state.empire(EmpireId(planet)).is_none() {
                    return Err(invalid(format!(
                        "planet in '{}' is owned by undeclared empire {planet}",
                        system.name
                    )));
                }
            }
        }

        let mut fleets_by_name = BTreeMap::new();
        for data in &self.fleets {
            if data.speed < Fixed::ZERO {
                return Err(invalid(format!("fleet '{}' has negative speed", data.name)));
            }
            let fleet = Fleet::new(
                EmpireId(data.empire),
                data.name.clone(),
                data.location,
                data.speed,
            )
            .with_ships(data.ships.iter().cloned());
            let id = state.spawn_fleet(fleet).map_err(|_| {
                invalid(format!(
                    "fleet '{}' belongs to undeclared empire {}",
                    data.name, data.empire
                ))
            })?;
            if fleets_by_name.insert(data.name.clone(), id).is_some() {
                return Err(invalid(format!("duplicate fleet name '{}'", data.name)));
            }
        }

        for data in &self.fleets {
            let id = fleets_by_name[&data.name];
            for order in &data.orders {
                let order = resolve_order(order, &planets, &fleets_by_name).map_err(|name| {
                    invalid(format!("fleet '{}' references unknown '{name}'", data.name))
                })?;
                state.queue_order(id, order)?;
            }
        }

        tracing::debug!(
            scenario = %self.name,
            systems = state.galaxy.len(),
            fleets = state.fleets.len(),
            "Scenario built"
        );

        Ok(Scenario {
            name: self.name.clone(),
            config: self.config,
            state,
            fleets_by_name,
        })
    }

    fn build_galaxy(&self) -> Result<(Galaxy, BTreeMap<String, PlanetId>)> {
        let mut galaxy = Galaxy::new();
        let mut planets = BTreeMap::new();

        for system in &self.systems {
            let id = galaxy
                .add_system(system.name.clone(), system.location)
                .map_err(|e| invalid(e.to_string()))?;
            for data in &system.planets {
                let planet = galaxy.add_planet(id, data.name.clone(), data.location)?;
                if let Some(owner) = data.owner {
                    if let Some(p) = galaxy.planet_mut(planet) {
                        p.owner = Some(EmpireId(owner));
                    }
                }
                if planets.insert(data.name.clone(), planet).is_some() {
                    return Err(invalid(format!("duplicate planet name '{}'", data.name)));
                }
            }
        }

        for link in &self.links {
            let find = |name: &str| {
                galaxy
                    .system_by_name(name)
                    .map(|s| s.id)
                    .ok_or_else(|| invalid(format!("link references unknown system '{name}'")))
            };
            let (a, b) = (find(&link.a)?, find(&link.b)?);
            galaxy.link(a, b, link.at_a, link.at_b)?;
        }

        Ok((galaxy, planets))
    }
}

fn invalid(message: String) -> GameError {
    GameError::InvalidScenario(message)
}

/// Resolve name references; the error is the unknown name.
fn resolve_order(
    order: &OrderData,
    planets: &BTreeMap<String, PlanetId>,
    fleets: &BTreeMap<String, FleetId>,
) -> std::result::Result<Order, String> {
    let fleet = |name: &String| fleets.get(name).copied().ok_or_else(|| name.clone());
    Ok(match order {
        OrderData::Move(hex) => Order::Move(*hex),
        OrderData::Colonize(None) => Order::Colonize(None),
        OrderData::Colonize(Some(name)) => {
            Order::Colonize(Some(planets.get(name).copied().ok_or_else(|| name.clone())?))
        }
        OrderData::MoveToFleet(name) => Order::MoveToFleet(fleet(name)?),
        OrderData::JoinFleet(name) => Order::JoinFleet(fleet(name)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIRMISH: &str = r#"
ScenarioData(
    name: "Border Skirmish",
    config: (intercept: (max_turns: 20)),
    systems: [
        (name: "Sol", location: (q: 0, r: 0), planets: [
            (name: "Earth", location: (q: 1, r: 0), owner: Some(1)),
            (name: "Mars", location: (q: 0, r: 2)),
        ]),
        (name: "Vega", location: (q: 20, r: 0)),
    ],
    links: [(a: "Sol", b: "Vega", at_a: (q: 3, r: 0), at_b: (q: -3, r: 0))],
    empires: [(id: 1, name: "Terran Union"), (id: 2, name: "Vorr Hegemony")],
    fleets: [
        (name: "Home Fleet", empire: 1, location: (q: 0, r: 0), speed: 5.0,
         ships: [(name: "Resolute", class: "Cruiser")],
         orders: [MoveToFleet("Raiders")]),
        (name: "Colony", empire: 1, location: (q: 0, r: 0), speed: 2.5,
         orders: [Move((q: 0, r: 2)), Colonize(Some("Mars"))]),
        (name: "Raiders", empire: 2, location: (q: 21, r: 0), speed: 3.0),
    ],
)
"#;

    #[test]
    fn test_parse_and_build() {
        let data = ScenarioData::from_ron_str(SKIRMISH).unwrap();
        let scenario = data.build().unwrap();

        assert_eq!(scenario.config.intercept.max_turns, 20);
        assert_eq!(scenario.state.galaxy.len(), 2);
        assert_eq!(scenario.state.fleets.len(), 3);

        let raiders = scenario.fleets_by_name["Raiders"];
        let home = scenario.state.fleet(scenario.fleets_by_name["Home Fleet"]).unwrap();
        assert_eq!(home.orders.current(), Some(&Order::MoveToFleet(raiders)));
        assert_eq!(home.ships.len(), 1);

        let colony = scenario.state.fleet(scenario.fleets_by_name["Colony"]).unwrap();
        assert_eq!(colony.speed, Fixed::from_num(2.5));
        assert_eq!(colony.orders.len(), 2);

        let sol = scenario.state.galaxy.system_by_name("Sol").unwrap();
        assert_eq!(sol.planets[0].owner, Some(EmpireId(1)));
        let vega = scenario.state.galaxy.system_by_name("Vega").unwrap();
        assert!(sol.warp_point_to(vega.id).is_some());
    }

    #[test]
    fn test_unknown_fleet_reference() {
        let text = SKIRMISH.replace("MoveToFleet(\"Raiders\")", "MoveToFleet(\"Ghosts\")");
        let err = ScenarioData::from_ron_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, GameError::InvalidScenario(msg) if msg.contains("Ghosts")));
    }

    #[test]
    fn test_unknown_link_system() {
        let text = SKIRMISH.replace("b: \"Vega\"", "b: \"Altair\"");
        let err = ScenarioData::from_ron_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, GameError::InvalidScenario(msg) if msg.contains("Altair")));
    }

    #[test]
    fn test_undeclared_empire() {
        let text = SKIRMISH.replace("empire: 2,", "empire: 7,");
        let err = ScenarioData::from_ron_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, GameError::InvalidScenario(_)));
    }

    #[test]
    fn test_parse_error_reported() {
        let err = ScenarioData::from_ron_str("ScenarioData(").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skirmish.ron");
        std::fs::write(&path, SKIRMISH).unwrap();
        let data = ScenarioData::load(&path).unwrap();
        assert_eq!(data.name, "Border Skirmish");

        let missing = ScenarioData::load(dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(GameError::DataParseError { .. })));
    }
}
