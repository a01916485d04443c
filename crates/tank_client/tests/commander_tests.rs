//! Per-tick commander scenarios.

use tank_client::protocol::{Control, MoveDirection, TankAction};
use tank_client::{Commander, TankOrders};
use tank_core::prelude::*;
use tank_test_utils::fixtures::{self, player, snapshot, tank};

fn commander(strategy: RoutingStrategy, parallel: bool) -> Commander {
    let config = EngineConfig {
        strategy,
        parallel,
        ..EngineConfig::default()
    };
    Commander::new("us", "token-1", config)
}

fn orders_for<'a>(orders: &'a [TankOrders], id: &str) -> &'a TankOrders {
    orders.iter().find(|o| o.tank_id == id).unwrap()
}

#[test]
fn test_each_tank_engages_its_closest_enemy() {
    let world = snapshot(
        fixtures::empty_map(200.0, 200.0),
        vec![
            player("us", vec![tank("a", 10.0, 10.0), tank("b", 190.0, 190.0)]),
            player("them", vec![tank("x", 30.0, 10.0), tank("y", 170.0, 190.0)]),
        ],
    );
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);
    let orders = commander.plan_tick(&world);

    assert_eq!(orders.len(), 2);
    assert_eq!(orders_for(&orders, "a").target.as_deref(), Some("x"));
    assert_eq!(orders_for(&orders, "b").target.as_deref(), Some("y"));

    // Open map: straight at the enemy, which sits within range
    let a = orders_for(&orders, "a");
    assert!((a.step.distance - 20.0).abs() < 1e-9);
    assert!(a.fire);
}

#[test]
fn test_target_choice_ignores_strategy() {
    let world = snapshot(
        fixtures::arena_map(),
        vec![
            player("us", vec![tank("a", 5.0, 5.0), tank("b", 100.0, 5.0)]),
            player(
                "them",
                vec![tank("x", 195.0, 195.0), tank("y", 5.0, 120.0), tank("z", 150.0, 8.0)],
            ),
        ],
    );
    let targets = |strategy| {
        let mut commander = commander(strategy, true);
        commander
            .plan_tick(&world)
            .into_iter()
            .map(|o| (o.tank_id, o.target))
            .collect::<Vec<_>>()
    };
    assert_eq!(
        targets(RoutingStrategy::VisibilityGraph),
        targets(RoutingStrategy::Grid)
    );
}

#[test]
fn test_no_enemies_means_stop() {
    let world = snapshot(
        fixtures::empty_map(100.0, 100.0),
        vec![player("us", vec![tank("a", 1.0, 1.0)]), player("them", vec![])],
    );
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);
    let commands = commander.commands(&world);

    let controls: Vec<Control> = commands
        .iter()
        .map(|c| match c.action {
            TankAction::Stop { control } => control,
            ref other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(controls, Control::ALL.to_vec());
    assert!(commands.iter().all(|c| c.client_token == "token-1"));
}

#[test]
fn test_holds_fire_when_ally_in_line() {
    let world = snapshot(
        fixtures::empty_map(100.0, 100.0),
        vec![
            player("us", vec![tank("a", 0.0, 50.0), tank("b", 10.0, 50.5)]),
            player("them", vec![tank("x", 20.0, 50.0)]),
        ],
    );
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);
    let orders = commander.plan_tick(&world);
    assert!(!orders_for(&orders, "a").fire);
    assert!(orders_for(&orders, "b").fire);
}

#[test]
fn test_holds_fire_until_turret_is_on_target() {
    let enemy = || player("them", vec![tank("x", 30.0, 10.0)]);
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);

    // Turret facing away from the enemy
    let world = snapshot(
        fixtures::empty_map(100.0, 100.0),
        vec![
            player("us", vec![fixtures::tank_facing("a", 10.0, 10.0, std::f64::consts::PI)]),
            enemy(),
        ],
    );
    let orders = commander.plan_tick(&world);
    let a = orders_for(&orders, "a");
    assert!(a.turret.is_some_and(|r| r.radians > 3.0));
    assert!(!a.fire);

    // Turret swung round
    let world = snapshot(
        fixtures::empty_map(100.0, 100.0),
        vec![player("us", vec![tank("a", 10.0, 10.0)]), enemy()],
    );
    assert!(orders_for(&commander.plan_tick(&world), "a").fire);
}

#[test]
fn test_out_of_range_enemy_is_approached_not_fired_on() {
    let world = snapshot(
        fixtures::empty_map(300.0, 300.0),
        vec![
            player("us", vec![tank("a", 0.0, 0.0)]),
            player("them", vec![tank("x", 0.0, 200.0)]),
        ],
    );
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);
    let commands = commander.commands(&world);

    assert!(commands.iter().all(|c| c.action != TankAction::Fire));
    assert!(commands.iter().any(|c| matches!(
        c.action,
        TankAction::Move {
            direction: MoveDirection::Forward,
            ..
        }
    )));
    assert!(commands.iter().any(|c| matches!(c.action, TankAction::Rotate { .. })));
    assert!(commands
        .iter()
        .any(|c| matches!(c.action, TankAction::RotateTurret { .. })));
}

#[test]
fn test_routes_around_wall_and_keeps_state() {
    let world = snapshot(
        fixtures::walled_map(),
        vec![
            player("us", vec![tank("a", 10.0, 30.0)]),
            player("them", vec![tank("x", 45.0, 30.0)]),
        ],
    );
    let mut commander = commander(RoutingStrategy::VisibilityGraph, true);
    let orders = commander.plan_tick(&world);

    // First waypoint is the padded bottom-left corner of the wall
    let expected = Point::new(10.0, 30.0).distance(Point::new(15.0, 5.0));
    assert!((orders[0].step.distance - expected).abs() < 1e-9);
    assert!(commander.router().state("a").unwrap().is_following());
    assert_eq!(commander.index().unwrap().strategy(), RoutingStrategy::VisibilityGraph);
}

#[test]
fn test_departed_tanks_are_forgotten() {
    let map = fixtures::walled_map();
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);

    commander.plan_tick(&snapshot(
        map.clone(),
        vec![
            player("us", vec![tank("a", 10.0, 30.0), tank("b", 10.0, 35.0)]),
            player("them", vec![tank("x", 45.0, 30.0)]),
        ],
    ));
    assert!(commander.router().state("b").is_some());

    commander.plan_tick(&snapshot(
        map,
        vec![
            player("us", vec![tank("a", 15.0, 5.0)]),
            player("them", vec![tank("x", 45.0, 30.0)]),
        ],
    ));
    assert!(commander.router().state("a").is_some());
    assert!(commander.router().state("b").is_none());
}

#[test]
fn test_parallel_and_sequential_agree() {
    let world = snapshot(
        fixtures::arena_map(),
        vec![
            player(
                "us",
                (0..8)
                    .map(|i| tank(&format!("u{i}"), 2.0 + f64::from(i) * 24.0, 3.0))
                    .collect(),
            ),
            player("them", vec![tank("x", 190.0, 196.0), tank("y", 4.0, 196.0)]),
        ],
    );
    let sequential = commander(RoutingStrategy::Grid, false).plan_tick(&world);
    let parallel = commander(RoutingStrategy::Grid, true).plan_tick(&world);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_missing_team_yields_nothing() {
    let world = snapshot(
        fixtures::empty_map(10.0, 10.0),
        vec![player("them", vec![tank("x", 1.0, 1.0)])],
    );
    let mut commander = commander(RoutingStrategy::VisibilityGraph, false);
    assert!(commander.plan_tick(&world).is_empty());
}
