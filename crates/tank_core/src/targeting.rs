//! Target selection by straight-line distance.

use crate::entities::Tank;

/// Rank candidates by distance from `tank`, nearest first.
///
/// The sort is stable: equidistant candidates keep their input order.
#[must_use]
pub fn rank_by_distance<'a>(tank: &Tank, candidates: &[&'a Tank]) -> Vec<(f64, &'a Tank)> {
    let mut ranked: Vec<(f64, &'a Tank)> = candidates
        .iter()
        .map(|candidate| (tank.distance_to(candidate), *candidate))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked
}

/// Nearest candidate and its distance, `None` when there are none.
#[must_use]
pub fn closest<'a>(tank: &Tank, candidates: &[&'a Tank]) -> Option<(f64, &'a Tank)> {
    candidates
        .iter()
        .map(|candidate| (tank.distance_to(candidate), *candidate))
        // min_by keeps the first of equal elements
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TankKind;
    use crate::geometry::Point;

    fn tank(id: &str, x: f64, y: f64) -> Tank {
        Tank {
            id: id.to_string(),
            health: 100.0,
            hit_radius: 2.0,
            collision_radius: 2.0,
            kind: TankKind::Slow,
            position: Point::new(x, y),
            track_angle: 0.0,
            turret_angle: 0.0,
            speed: 5.0,
            projectiles: Vec::new(),
        }
    }

    #[test]
    fn test_rank_by_distance() {
        let me = tank("me", -1.0, -1.0);
        let far = tank("far", 300.0, 300.0);
        let near = tank("near", 0.0, 0.0);
        let mid = tank("mid", 100.0, 100.0);
        let mid2 = tank("mid2", 200.0, 200.0);

        let ranked = rank_by_distance(&me, &[&far, &mid2, &near, &mid]);
        let ids: Vec<&str> = ranked.iter().map(|(_, t)| t.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "mid2", "far"]);

        let distances: Vec<f64> = ranked.iter().map(|(d, _)| *d).collect();
        let expected = [
            1.414_213_562_373,
            142.835_569_799_683,
            284.256_926_036_992,
            425.678_282_274_302,
        ];
        for (got, want) in distances.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn test_equidistant_candidates_keep_input_order() {
        let me = tank("me", 0.0, 0.0);
        let east = tank("east", 10.0, 0.0);
        let north = tank("north", 0.0, 10.0);
        let west = tank("west", -10.0, 0.0);

        let ranked = rank_by_distance(&me, &[&north, &west, &east]);
        let ids: Vec<&str> = ranked.iter().map(|(_, t)| t.id.as_str()).collect();
        assert_eq!(ids, vec!["north", "west", "east"]);

        let (_, first) = closest(&me, &[&west, &north, &east]).unwrap();
        assert_eq!(first.id, "west");
    }

    #[test]
    fn test_empty_candidates() {
        let me = tank("me", 0.0, 0.0);
        assert!(rank_by_distance(&me, &[]).is_empty());
        assert!(closest(&me, &[]).is_none());
    }

    #[test]
    fn test_closest() {
        let me = tank("me", 50.0, 50.0);
        let a = tank("a", 0.0, 0.0);
        let b = tank("b", 60.0, 50.0);
        let (distance, target) = closest(&me, &[&a, &b]).unwrap();
        assert_eq!(target.id, "b");
        assert!((distance - 10.0).abs() < 1e-9);
    }
}
