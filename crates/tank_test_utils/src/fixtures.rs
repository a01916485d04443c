//! Test fixtures and helpers.
//!
//! Pre-built tanks, obstacles and maps for consistent testing.

use tank_core::entities::{Player, Tank, TankKind, WorldSnapshot};
use tank_core::geometry::Point;
use tank_core::map::Map;
use tank_core::obstacle::{Obstacle, ObstacleKind};

/// A full-health fast tank facing +x.
#[must_use]
pub fn tank(id: &str, x: f64, y: f64) -> Tank {
    tank_facing(id, x, y, 0.0)
}

/// A full-health fast tank with tracks and turret at `angle`.
#[must_use]
pub fn tank_facing(id: &str, x: f64, y: f64, angle: f64) -> Tank {
    Tank {
        id: id.to_string(),
        health: 100.0,
        hit_radius: 2.0,
        collision_radius: 2.0,
        kind: TankKind::Fast,
        position: Point::new(x, y),
        track_angle: angle,
        turret_angle: angle,
        speed: 10.0,
        projectiles: Vec::new(),
    }
}

/// Build an obstacle.
///
/// # Panics
///
/// Panics on negative or non-finite sizes.
#[must_use]
pub fn obstacle(kind: ObstacleKind, x: f64, y: f64, width: f64, height: f64) -> Obstacle {
    Obstacle::new(kind, Point::new(x, y), width, height).expect("valid obstacle")
}

/// A solid obstacle.
#[must_use]
pub fn solid(x: f64, y: f64, width: f64, height: f64) -> Obstacle {
    obstacle(ObstacleKind::Solid, x, y, width, height)
}

/// An impassable obstacle.
#[must_use]
pub fn impassable(x: f64, y: f64, width: f64, height: f64) -> Obstacle {
    obstacle(ObstacleKind::Impassable, x, y, width, height)
}

/// A map with the given obstacles.
///
/// # Panics
///
/// Panics on a negative map size.
#[must_use]
pub fn map(width: f64, height: f64, obstacles: Vec<Obstacle>) -> Map {
    Map::new(width, height, obstacles).expect("valid map")
}

/// An open map.
#[must_use]
pub fn empty_map(width: f64, height: f64) -> Map {
    map(width, height, Vec::new())
}

/// 10x5 map with two horizontal walls leaving a gap at alternating ends:
///
/// ```text
/// 0000000000   y = 4
/// 0111111111   y = 3  impassable, open at x = 0
/// 0000000000   y = 2
/// 2222222220   y = 1  solid, open at x = 9
/// 0000000000   y = 0
/// ```
///
/// Rendered top row first; cell digits follow [`tank_core::grid::Cell::symbol`].
#[must_use]
pub fn switchback_map() -> Map {
    map(10.0, 5.0, vec![solid(0.0, 1.0, 9.0, 1.0), impassable(1.0, 3.0, 9.0, 1.0)])
}

/// 60x60 map with one solid wall in the middle, leaving lanes above and
/// below it.
#[must_use]
pub fn walled_map() -> Map {
    map(60.0, 60.0, vec![solid(20.0, 10.0, 10.0, 40.0)])
}

/// 200x200 map scattered with blocks of every blocking kind.
#[must_use]
pub fn arena_map() -> Map {
    let mut obstacles = Vec::new();
    for row in 0..4 {
        for col in 0..4 {
            let x = 20.0 + f64::from(col) * 45.0;
            let y = 20.0 + f64::from(row) * 45.0;
            let kind = match (row + col) % 3 {
                0 => ObstacleKind::Solid,
                1 => ObstacleKind::Impassable,
                _ => ObstacleKind::Normal,
            };
            obstacles.push(obstacle(kind, x, y, 15.0, 15.0));
        }
    }
    map(200.0, 200.0, obstacles)
}

/// A player owning `tanks`.
#[must_use]
pub fn player(name: &str, tanks: Vec<Tank>) -> Player {
    Player {
        name: name.to_string(),
        score: 0,
        tanks,
    }
}

/// A snapshot with plenty of time left.
#[must_use]
pub fn snapshot(map: Map, players: Vec<Player>) -> WorldSnapshot {
    WorldSnapshot {
        time_remaining: 300.0,
        map,
        players,
    }
}
