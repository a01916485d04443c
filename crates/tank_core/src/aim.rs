//! Heading, rotation and line-of-fire helpers.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::entities::Tank;
use crate::geometry::{Point, EPSILON};

/// Direction of a track or turret rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    /// Clockwise (decreasing angle).
    #[serde(rename = "CW")]
    Clockwise,
    /// Counter-clockwise (increasing angle).
    #[serde(rename = "CCW")]
    CounterClockwise,
}

/// A turn request: direction plus magnitude in radians, at most π.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Turn direction.
    pub direction: RotationDirection,
    /// Turn magnitude in radians.
    pub radians: f64,
}

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Bearing from one point to another, in radians relative to +x.
/// Positive is counter-clockwise.
#[must_use]
pub fn heading_to(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Shortest turn from `current` heading to `desired` heading.
#[must_use]
pub fn rotation_towards(current: f64, desired: f64) -> Rotation {
    let delta = normalize_angle(current) - normalize_angle(desired);
    let (direction, radians) = if delta < 0.0 {
        if -delta > PI {
            (RotationDirection::Clockwise, TAU + delta)
        } else {
            (RotationDirection::CounterClockwise, -delta)
        }
    } else if delta > PI {
        (RotationDirection::CounterClockwise, TAU - delta)
    } else {
        (RotationDirection::Clockwise, delta)
    };
    Rotation { direction, radians }
}

/// Turn needed to point a heading of `current` at `target` from `from`.
/// `None` when the points coincide and no bearing exists.
#[must_use]
pub fn rotation_to_point(from: Point, current: f64, target: Point) -> Option<Rotation> {
    if from.distance(target) < EPSILON {
        return None;
    }
    Some(rotation_towards(current, heading_to(from, target)))
}

/// Check whether firing from `shooter` at `enemy` risks hitting an ally.
///
/// An ally blocks the shot when it sits ahead of the shooter, closer than
/// the enemy, and within `margin` collision radii of the firing line.
#[must_use]
pub fn is_friendly_fire(shooter: &Tank, allies: &[&Tank], enemy: &Tank, margin: f64) -> bool {
    let origin = shooter.position;
    let line = enemy.position - origin;
    let enemy_dist = line.length();
    if enemy_dist < EPSILON {
        return false;
    }

    allies.iter().filter(|ally| ally.id != shooter.id).any(|ally| {
        let offset = ally.position - origin;
        let ahead = offset.dot(line) > 0.0;
        let line_dist = (line.cross(offset) / enemy_dist).abs();
        let ally_dist = offset.length();
        ahead && line_dist <= margin * ally.collision_radius + EPSILON && enemy_dist - EPSILON > ally_dist
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TankKind;
    use std::f64::consts::FRAC_PI_4;

    fn tank(id: &str, x: f64, y: f64) -> Tank {
        Tank {
            id: id.to_string(),
            health: 100.0,
            hit_radius: 2.0,
            collision_radius: 2.0,
            kind: TankKind::Fast,
            position: Point::new(x, y),
            track_angle: 0.0,
            turret_angle: 0.0,
            speed: 10.0,
            projectiles: Vec::new(),
        }
    }

    #[test]
    fn test_heading_to() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 100.0);
        assert!((heading_to(a, b) - FRAC_PI_4).abs() < 1e-9);
        assert!((heading_to(b, a) + 3.0 * FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_quarter_turn_ccw() {
        let r = rotation_towards(0.0, FRAC_PI_4);
        assert_eq!(r.direction, RotationDirection::CounterClockwise);
        assert!((r.radians - FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_takes_short_way_round() {
        // Facing +x, target bearing -135 degrees: turn clockwise 135
        let r = rotation_towards(0.0, -3.0 * FRAC_PI_4);
        assert_eq!(r.direction, RotationDirection::Clockwise);
        assert!((r.radians - 3.0 * FRAC_PI_4).abs() < 1e-9);

        // Facing 350 degrees, target 10 degrees: 20 degrees counter-clockwise
        let r = rotation_towards(350f64.to_radians(), 10f64.to_radians());
        assert_eq!(r.direction, RotationDirection::CounterClockwise);
        assert!((r.radians - 20f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_never_exceeds_pi() {
        for i in 0..36 {
            for j in 0..36 {
                let r = rotation_towards(f64::from(i) * 0.2, f64::from(j) * -0.3);
                assert!(r.radians >= 0.0 && r.radians <= PI + 1e-12);
            }
        }
    }

    #[test]
    fn test_rotation_to_coincident_point() {
        assert!(rotation_to_point(Point::ORIGIN, 0.0, Point::ORIGIN).is_none());
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-FRAC_PI_4) - 7.0 * FRAC_PI_4).abs() < 1e-9);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-9);
        assert!(normalize_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_friendly_fire_ally_in_line() {
        let shooter = tank("s", 0.0, 0.0);
        let ally = tank("a", 10.0, 1.0);
        let enemy = tank("e", 20.0, 0.0);
        assert!(is_friendly_fire(&shooter, &[&shooter, &ally], &enemy, 2.0));
    }

    #[test]
    fn test_friendly_fire_ally_beyond_enemy() {
        let shooter = tank("s", 0.0, 0.0);
        let ally = tank("a", 30.0, 0.0);
        let enemy = tank("e", 20.0, 0.0);
        assert!(!is_friendly_fire(&shooter, &[&ally], &enemy, 2.0));
    }

    #[test]
    fn test_friendly_fire_ally_behind_shooter() {
        let shooter = tank("s", 0.0, 0.0);
        let ally = tank("a", -5.0, 0.0);
        let enemy = tank("e", 20.0, 0.0);
        assert!(!is_friendly_fire(&shooter, &[&ally], &enemy, 2.0));
    }

    #[test]
    fn test_friendly_fire_ally_off_line() {
        let shooter = tank("s", 0.0, 0.0);
        let ally = tank("a", 10.0, 8.0);
        let enemy = tank("e", 20.0, 0.0);
        assert!(!is_friendly_fire(&shooter, &[&ally], &enemy, 2.0));
    }

    #[test]
    fn test_friendly_fire_margin_widens_line() {
        let shooter = tank("s", 0.0, 0.0);
        let ally = tank("a", 10.0, 5.0);
        let enemy = tank("e", 20.0, 0.0);
        assert!(!is_friendly_fire(&shooter, &[&ally], &enemy, 2.0));
        assert!(is_friendly_fire(&shooter, &[&ally], &enemy, 3.0));
    }

    #[test]
    fn test_shooter_ignores_itself() {
        let shooter = tank("s", 0.0, 0.0);
        let enemy = tank("e", 20.0, 0.0);
        assert!(!is_friendly_fire(&shooter, &[&shooter], &enemy, 2.0));
    }
}
