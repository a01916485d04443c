//! Per-tick world entities.
//!
//! Entities are plain values rebuilt from every incoming snapshot. None of
//! them carry routing state: path-following progress lives in the
//! [`Router`](crate::router::Router), keyed by [`TankId`].

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::map::Map;

/// Server-assigned tank identifier. Changes when a tank respawns.
pub type TankId = String;

/// Tank chassis class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TankKind {
    /// Fast, lightly armoured tank.
    Fast,
    /// Slow, heavily armoured tank.
    Slow,
    /// Chassis name the client does not recognise.
    Other(String),
}

impl TankKind {
    /// Parse the server's tank type string.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "TankFast" => Self::Fast,
            "TankSlow" => Self::Slow,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A projectile in flight. Read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Projectile identifier.
    pub id: String,
    /// Current position.
    pub position: Point,
    /// Travel direction in radians relative to the +x axis.
    pub direction: f64,
    /// Speed in m/s.
    pub speed: f64,
    /// Damage dealt on hit.
    pub damage: f64,
    /// Remaining travel distance before expiry.
    pub range: f64,
}

/// A tank as reported in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Tank identifier.
    pub id: TankId,
    /// Remaining health.
    pub health: f64,
    /// Radius used for projectile hits.
    pub hit_radius: f64,
    /// Radius used for terrain collision.
    pub collision_radius: f64,
    /// Chassis class.
    pub kind: TankKind,
    /// Current position.
    pub position: Point,
    /// Track heading in radians relative to the +x axis.
    pub track_angle: f64,
    /// Turret heading in radians relative to the +x axis.
    pub turret_angle: f64,
    /// Maximum speed in m/s.
    pub speed: f64,
    /// Projectiles fired by this tank that are still in flight.
    pub projectiles: Vec<Projectile>,
}

impl Tank {
    /// Distance to another tank.
    #[must_use]
    pub fn distance_to(&self, other: &Tank) -> f64 {
        self.position.distance(other.position)
    }
}

/// A team and its tanks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Team name.
    pub name: String,
    /// Current score.
    pub score: i64,
    /// Living tanks.
    pub tanks: Vec<Tank>,
}

/// Everything the engine knows about one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Seconds left in the game.
    pub time_remaining: f64,
    /// Map and obstacles.
    pub map: Map,
    /// All players, ours included.
    pub players: Vec<Player>,
}

impl WorldSnapshot {
    /// Split players into our team and every enemy tank.
    ///
    /// Returns `None` when no player carries `team_name`.
    #[must_use]
    pub fn split_teams(&self, team_name: &str) -> Option<(&Player, Vec<&Tank>)> {
        let own = self.players.iter().find(|p| p.name == team_name)?;
        let enemies = self
            .players
            .iter()
            .filter(|p| p.name != team_name)
            .flat_map(|p| p.tanks.iter())
            .collect();
        Some((own, enemies))
    }
}
