//! JSON wire protocol between the game server and the client.
//!
//! Every message is one JSON object tagged by `comm_type`:
//!
//! **Input (server -> client):** `GAMESTATE`, `GAME_START`, `GAME_END`,
//! `MatchEnd`
//! **Output (client -> server):** `MOVE`, `ROTATE`, `ROTATE_TURRET`, `FIRE`,
//! `STOP`, each addressed to one tank and carrying the client token.
//!
//! # Example Session
//!
//! ```text
//! <- {"comm_type":"GAME_START","game_name":"Alpha","game_num":1,"game_count":3}
//! <- {"comm_type":"GAMESTATE","timeRemaining":120.0,"map":{...},"players":[...]}
//! -> {"tank_id":"t1","client_token":"abc","comm_type":"ROTATE","direction":"CCW","rads":0.5}
//! -> {"tank_id":"t1","client_token":"abc","comm_type":"MOVE","direction":"FWD","distance":12.0}
//! <- {"comm_type":"GAME_END"}
//! <- {"comm_type":"MatchEnd"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tank_core::aim::RotationDirection;
use tank_core::entities::{Player, Projectile, Tank, TankId, TankKind, WorldSnapshot};
use tank_core::error::EngineError;
use tank_core::geometry::Point;
use tank_core::map::Map;
use tank_core::obstacle::{Obstacle, ObstacleKind};

/// Errors raised while decoding server messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not JSON, unknown `comm_type`, or a required field is missing.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// The map description cannot be turned into a map.
    #[error("invalid map: {0}")]
    InvalidMap(#[from] EngineError),
}

/// Decode one server message.
pub fn parse_message(line: &str) -> Result<GameMessage, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

// ============================================================================
// Input Messages (server -> client)
// ============================================================================

/// Messages published by the game server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "comm_type")]
pub enum GameMessage {
    /// Full world state for one tick.
    #[serde(rename = "GAMESTATE")]
    GameState(GameStateMessage),

    /// A new game in the match is starting.
    #[serde(rename = "GAME_START")]
    GameStart(GameStartMessage),

    /// The current game is over; another may follow.
    #[serde(rename = "GAME_END")]
    GameEnd,

    /// The whole match is over.
    #[serde(rename = "MatchEnd")]
    MatchEnd,
}

/// Announcement of a new game.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameStartMessage {
    /// Game name.
    #[serde(default)]
    pub game_name: Option<String>,
    /// Server time in milliseconds.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// One-based game number within the match.
    #[serde(default)]
    pub game_num: Option<u32>,
    /// Number of games in the match.
    #[serde(default)]
    pub game_count: Option<u32>,
}

/// World state as sent on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateMessage {
    /// Seconds left in the game.
    pub time_remaining: f64,
    /// Server time in milliseconds.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Map and terrain.
    pub map: WireMap,
    /// Every player, ours included.
    pub players: Vec<WirePlayer>,
}

/// Map description on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMap {
    /// `[width, height]` in metres.
    pub size: [f64; 2],
    /// Terrain objects in server order.
    #[serde(default, alias = "obstacles")]
    pub terrain: Vec<WireTerrain>,
}

/// One terrain object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireTerrain {
    /// Terrain type, e.g. `SOLID`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Position and extent.
    #[serde(flatten)]
    pub bounds: WireBounds,
}

/// Terrain extent, either wrapped in `boundingBox` or given inline.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireBounds {
    /// `{"boundingBox": {"corner": [x, y], "size": [w, h]}}`
    Boxed {
        /// The wrapped box.
        #[serde(rename = "boundingBox")]
        bounding_box: WireBox,
    },
    /// `{"corner": [x, y], "size": [w, h]}`
    Inline(WireBox),
}

impl WireBounds {
    /// The box regardless of encoding.
    #[must_use]
    pub fn as_box(&self) -> &WireBox {
        match self {
            Self::Boxed { bounding_box } => bounding_box,
            Self::Inline(b) => b,
        }
    }
}

/// Axis-aligned box: bottom-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WireBox {
    /// Bottom-left corner.
    pub corner: [f64; 2],
    /// `[width, height]`.
    pub size: [f64; 2],
}

/// A player on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePlayer {
    /// Team name.
    pub name: String,
    /// Current score.
    #[serde(default)]
    pub score: i64,
    /// Tanks owned by the player, kept raw so one malformed record only
    /// costs that tank. See [`WirePlayer::decode_tanks`].
    #[serde(default)]
    pub tanks: Vec<serde_json::Value>,
}

impl WirePlayer {
    /// Decode each tank on its own. Malformed and dead tanks are logged
    /// and left out.
    #[must_use]
    pub fn decode_tanks(&self) -> Vec<Tank> {
        self.tanks
            .iter()
            .filter_map(|raw| match WireTank::deserialize(raw) {
                Ok(tank) if tank.alive == Some(false) => {
                    tracing::warn!(tank = %tank.id, player = %self.name, "Skipping dead tank");
                    None
                }
                Ok(tank) => Some(Tank::from(tank)),
                Err(err) => {
                    let id = raw.get("id").and_then(serde_json::Value::as_str).unwrap_or("?");
                    tracing::warn!(%err, tank = id, player = %self.name, "Skipping malformed tank");
                    None
                }
            })
            .collect()
    }
}

/// A tank on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTank {
    /// Tank id.
    pub id: TankId,
    /// Remaining health.
    pub health: f64,
    /// Projectile hit radius.
    pub hit_radius: f64,
    /// Terrain collision radius.
    pub collision_radius: f64,
    /// Chassis type, e.g. `TankFast`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[x, y]`.
    pub position: [f64; 2],
    /// Track heading in radians.
    pub tracks: f64,
    /// Turret heading in radians.
    pub turret: f64,
    /// Maximum speed.
    pub speed: f64,
    /// Whether the tank is alive. Absent means alive.
    #[serde(default)]
    pub alive: Option<bool>,
    /// Projectiles in flight.
    #[serde(default)]
    pub projectiles: Vec<WireProjectile>,
}

/// A projectile on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireProjectile {
    /// Projectile id.
    pub id: String,
    /// `[x, y]`.
    pub position: [f64; 2],
    /// Travel direction in radians.
    pub direction: f64,
    /// Speed.
    pub speed: f64,
    /// Damage on hit.
    pub damage: f64,
    /// Remaining range.
    pub range: f64,
}

impl GameStateMessage {
    /// Convert into the engine's world model.
    ///
    /// Terrain objects with invalid extents, malformed tanks and tanks
    /// reported dead are logged and left out.
    pub fn into_snapshot(self) -> Result<WorldSnapshot, ProtocolError> {
        let obstacles = self
            .map
            .terrain
            .into_iter()
            .filter_map(|terrain| {
                let bounds = *terrain.bounds.as_box();
                let kind = ObstacleKind::from_wire(&terrain.kind);
                match Obstacle::new(kind, bounds.corner.into(), bounds.size[0], bounds.size[1]) {
                    Ok(obstacle) => Some(obstacle),
                    Err(err) => {
                        tracing::warn!(%err, terrain_type = %terrain.kind, "Skipping terrain");
                        None
                    }
                }
            })
            .collect();
        let map = Map::new(self.map.size[0], self.map.size[1], obstacles)?;

        let players = self
            .players
            .into_iter()
            .map(|player| Player {
                tanks: player.decode_tanks(),
                name: player.name,
                score: player.score,
            })
            .collect();

        Ok(WorldSnapshot {
            time_remaining: self.time_remaining,
            map,
            players,
        })
    }
}

impl From<WireTank> for Tank {
    fn from(wire: WireTank) -> Self {
        Tank {
            id: wire.id,
            health: wire.health,
            hit_radius: wire.hit_radius,
            collision_radius: wire.collision_radius,
            kind: TankKind::from_wire(&wire.kind),
            position: Point::from(wire.position),
            track_angle: wire.tracks,
            turret_angle: wire.turret,
            speed: wire.speed,
            projectiles: wire.projectiles.into_iter().map(Projectile::from).collect(),
        }
    }
}

impl From<WireProjectile> for Projectile {
    fn from(wire: WireProjectile) -> Self {
        Projectile {
            id: wire.id,
            position: Point::from(wire.position),
            direction: wire.direction,
            speed: wire.speed,
            damage: wire.damage,
            range: wire.range,
        }
    }
}

// ============================================================================
// Output Commands (client -> server)
// ============================================================================

/// A command for one tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankCommand {
    /// Tank the command addresses.
    pub tank_id: TankId,
    /// Token issued to this client at connect time.
    pub client_token: String,
    /// What to do.
    #[serde(flatten)]
    pub action: TankAction,
}

/// Tank actions understood by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "comm_type")]
pub enum TankAction {
    /// Drive the tracks.
    #[serde(rename = "MOVE")]
    Move {
        /// Forward or reverse.
        direction: MoveDirection,
        /// Distance in metres.
        distance: f64,
    },

    /// Turn the tracks.
    #[serde(rename = "ROTATE")]
    Rotate {
        /// Turn direction.
        direction: RotationDirection,
        /// Turn magnitude in radians.
        rads: f64,
    },

    /// Turn the turret.
    #[serde(rename = "ROTATE_TURRET")]
    RotateTurret {
        /// Turn direction.
        direction: RotationDirection,
        /// Turn magnitude in radians.
        rads: f64,
    },

    /// Fire the main gun.
    #[serde(rename = "FIRE")]
    Fire,

    /// Cancel an ongoing action.
    #[serde(rename = "STOP")]
    Stop {
        /// Action to cancel.
        control: Control,
    },
}

/// Track drive direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Forward.
    #[serde(rename = "FWD")]
    Forward,
    /// Reverse.
    #[serde(rename = "REV")]
    Reverse,
}

/// Actions a `STOP` command can cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Control {
    /// Track movement.
    Move,
    /// Track rotation.
    Rotate,
    /// Turret rotation.
    RotateTurret,
    /// Firing.
    Fire,
}

impl Control {
    /// Every cancellable action.
    pub const ALL: [Self; 4] = [Self::Move, Self::Rotate, Self::RotateTurret, Self::Fire];
}

impl TankCommand {
    /// Encode as one JSON line (without the trailing newline).
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
