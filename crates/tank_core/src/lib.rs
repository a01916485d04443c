//! # Tank Core
//!
//! Spatial reasoning core for the battle tanks client.
//!
//! This crate contains **only** pure decision logic:
//! - No network IO
//! - No wire (de)serialization of game messages
//! - No randomness
//!
//! Given a world snapshot it answers two questions per friendly tank:
//! which enemy to engage, and which single move brings the tank closer
//! to that enemy without driving through walls.
//!
//! ## Crate Structure
//!
//! - [`geometry`] - Points, segments, intersection tests, epsilon rules
//! - [`obstacle`] - Axis-aligned obstacles with padded corners/edges
//! - [`map`] - Map bounds and the collision obstacle set
//! - [`grid`] - Occupancy grid rasterization and A* search
//! - [`visibility`] - Visibility graph construction and Dijkstra search
//! - [`spatial`] - The routing strategy seam shared by both indexes
//! - [`router`] - Per-tank path-following state machine
//! - [`targeting`] - Enemy ranking by distance
//! - [`aim`] - Heading, rotation and friendly-fire helpers
//! - [`entities`] - Tanks, projectiles, players, world snapshots
//! - [`config`] - Engine tunables loaded from RON
//! - [`error`] - Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod aim;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod map;
pub mod obstacle;
pub mod router;
pub mod spatial;
pub mod targeting;
pub mod visibility;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aim::{Rotation, RotationDirection};
    pub use crate::config::{EngineConfig, RoutingStrategy};
    pub use crate::entities::{Player, Projectile, Tank, TankId, TankKind, WorldSnapshot};
    pub use crate::error::{EngineError, Result};
    pub use crate::geometry::{Point, Segment, EPSILON};
    pub use crate::grid::{Cell, OccupancyGrid};
    pub use crate::map::Map;
    pub use crate::obstacle::{Obstacle, ObstacleKind};
    pub use crate::router::{FollowState, RouteStep, Router};
    pub use crate::spatial::{NavIndex, SpatialIndex};
    pub use crate::targeting::{closest, rank_by_distance};
    pub use crate::visibility::VisibilityGraph;
}
