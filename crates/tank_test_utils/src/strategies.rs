//! Proptest strategies for geometry, obstacles and tanks.

use proptest::prelude::*;
use tank_core::entities::Tank;
use tank_core::geometry::{Point, Segment};
use tank_core::map::Map;
use tank_core::obstacle::{Obstacle, ObstacleKind};

use crate::fixtures;

/// Strategy for coordinates in `[-max, max]`.
pub fn arb_coordinate(max: f64) -> impl Strategy<Value = f64> {
    -max..=max
}

/// Strategy for points anywhere in a 200x200 box around the origin.
pub fn arb_point() -> impl Strategy<Value = Point> {
    (arb_coordinate(100.0), arb_coordinate(100.0)).prop_map(|(x, y)| Point::new(x, y))
}

/// Strategy for points on a small integer lattice. Collinear and touching
/// configurations come up often here.
pub fn arb_lattice_point() -> impl Strategy<Value = Point> {
    (-5i32..=5, -5i32..=5).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
}

/// Strategy for arbitrary segments, degenerate ones included.
pub fn arb_segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        (arb_point(), arb_point()).prop_map(|(a, b)| Segment::new(a, b)),
        (arb_lattice_point(), arb_lattice_point()).prop_map(|(a, b)| Segment::new(a, b)),
    ]
}

/// Strategy for obstacle kinds, including unrecognised ones.
pub fn arb_obstacle_kind() -> impl Strategy<Value = ObstacleKind> {
    prop_oneof![
        Just(ObstacleKind::Normal),
        Just(ObstacleKind::Impassable),
        Just(ObstacleKind::Solid),
        "[a-z]{1,8}".prop_map(ObstacleKind::Unknown),
    ]
}

/// Strategy for obstacles near a `width` x `height` map. Corners may fall
/// outside the map and extents may overrun it.
pub fn arb_obstacle(width: f64, height: f64) -> impl Strategy<Value = Obstacle> {
    (
        arb_obstacle_kind(),
        -20.0..width + 20.0,
        -20.0..height + 20.0,
        0.0..40.0,
        0.0..40.0,
    )
        .prop_map(|(kind, x, y, w, h)| fixtures::obstacle(kind, x, y, w, h))
}

/// Strategy for maps up to 80x80 with up to `max_obstacles` obstacles.
pub fn arb_map(max_obstacles: usize) -> impl Strategy<Value = Map> {
    (10u32..=80, 10u32..=80).prop_flat_map(move |(w, h)| {
        let (width, height) = (f64::from(w), f64::from(h));
        proptest::collection::vec(arb_obstacle(width, height), 0..=max_obstacles)
            .prop_map(move |obstacles| fixtures::map(width, height, obstacles))
    })
}

/// Strategy for a tank somewhere in a 200x200 box around the origin.
pub fn arb_tank(id: &'static str) -> impl Strategy<Value = Tank> {
    (arb_point(), 0.0..std::f64::consts::TAU)
        .prop_map(move |(p, angle)| fixtures::tank_facing(id, p.x, p.y, angle))
}

/// Strategy for a list of tanks with ids `t0`, `t1`, ...
pub fn arb_tanks(max_tanks: usize) -> impl Strategy<Value = Vec<Tank>> {
    proptest::collection::vec(arb_point(), 0..=max_tanks).prop_map(|points| {
        points
            .into_iter()
            .enumerate()
            .map(|(i, p)| fixtures::tank(&format!("t{i}"), p.x, p.y))
            .collect()
    })
}
