//! Per-tick decision pipeline.
//!
//! The commander turns each world snapshot into orders for every friendly
//! tank: pick the closest enemy, route towards it, swing the turret onto it
//! and fire once the turret is on target, in range and clear of allies.
//!
//! The spatial index is built from the first map seen and rebuilt only when
//! the obstacle layout changes. Follow state lives in the [`Router`]; during
//! a tick each tank's state is taken out, advanced on its own (in parallel
//! when configured) and stored back.

use rayon::prelude::*;

use tank_core::aim::{self, Rotation};
use tank_core::config::EngineConfig;
use tank_core::entities::{Tank, TankId, WorldSnapshot};
use tank_core::geometry::EPSILON;
use tank_core::map::Map;
use tank_core::router::{self, FollowState, RouteStep, Router};
use tank_core::spatial::{NavIndex, SpatialIndex};
use tank_core::targeting;

use crate::protocol::{Control, MoveDirection, TankAction, TankCommand};

/// Everything one tank should do this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TankOrders {
    /// Tank the orders are for.
    pub tank_id: TankId,
    /// Enemy being engaged. `None` means stand down.
    pub target: Option<TankId>,
    /// Track movement.
    pub step: RouteStep,
    /// Turret turn onto the target.
    pub turret: Option<Rotation>,
    /// Fire this tick.
    pub fire: bool,
}

impl TankOrders {
    /// Orders for a tank with nothing to engage.
    #[must_use]
    pub fn stand_down(tank_id: TankId) -> Self {
        Self {
            tank_id,
            target: None,
            step: RouteStep::IDLE,
            turret: None,
            fire: false,
        }
    }

    /// Translate into wire commands.
    ///
    /// A tank without a target gets a `STOP` for every control. Otherwise
    /// rotations and moves below [`EPSILON`] are dropped.
    #[must_use]
    pub fn into_commands(self, client_token: &str) -> Vec<TankCommand> {
        let command = |action| TankCommand {
            tank_id: self.tank_id.clone(),
            client_token: client_token.to_string(),
            action,
        };

        if self.target.is_none() {
            return Control::ALL
                .into_iter()
                .map(|control| command(TankAction::Stop { control }))
                .collect();
        }

        let mut commands = Vec::with_capacity(4);
        if let Some(rotation) = self.step.rotation.filter(|r| r.radians > EPSILON) {
            commands.push(command(TankAction::Rotate {
                direction: rotation.direction,
                rads: rotation.radians,
            }));
        }
        if self.step.distance > EPSILON {
            commands.push(command(TankAction::Move {
                direction: MoveDirection::Forward,
                distance: self.step.distance,
            }));
        }
        if let Some(rotation) = self.turret.filter(|r| r.radians > EPSILON) {
            commands.push(command(TankAction::RotateTurret {
                direction: rotation.direction,
                rads: rotation.radians,
            }));
        }
        if self.fire {
            commands.push(command(TankAction::Fire));
        }
        commands
    }
}

/// Decision state for one team across a match.
#[derive(Debug)]
pub struct Commander {
    team: String,
    client_token: String,
    config: EngineConfig,
    map: Option<Map>,
    index: Option<NavIndex>,
    router: Router,
}

impl Commander {
    /// Create a commander for `team`.
    #[must_use]
    pub fn new(team: impl Into<String>, client_token: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            team: team.into(),
            client_token: client_token.into(),
            config,
            map: None,
            index: None,
            router: Router::new(),
        }
    }

    /// Our team name.
    #[must_use]
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current spatial index, once a map has been seen.
    #[must_use]
    pub fn index(&self) -> Option<&NavIndex> {
        self.index.as_ref()
    }

    /// Stored follow state.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Forget every route, e.g. between games. The index is kept and reused
    /// if the next game shares the layout.
    pub fn reset(&mut self) {
        self.router.clear();
    }

    /// Rebuild the spatial index if the obstacle layout changed.
    fn refresh_index(&mut self, map: &Map) {
        let unchanged = self.index.is_some() && self.map.as_ref().is_some_and(|m| m.same_layout(map));
        if unchanged {
            return;
        }
        tracing::debug!(
            strategy = ?self.config.strategy,
            obstacles = map.obstacles().len(),
            "Rebuilding spatial index"
        );
        self.index = Some(NavIndex::build(map, &self.config));
        self.map = Some(map.clone());
        self.router.clear();
    }

    /// Decide orders for every friendly tank, in snapshot order.
    ///
    /// Returns nothing when our team is missing from the snapshot.
    pub fn plan_tick(&mut self, snapshot: &WorldSnapshot) -> Vec<TankOrders> {
        let Some((own, enemies)) = snapshot.split_teams(&self.team) else {
            tracing::warn!(team = %self.team, "Team missing from snapshot");
            return Vec::new();
        };

        self.refresh_index(&snapshot.map);
        self.router
            .retain_tanks(own.tanks.iter().map(|tank| tank.id.as_str()));

        let Some(index) = self.index.as_ref() else {
            return Vec::new();
        };
        let config = &self.config;
        let allies: Vec<&Tank> = own.tanks.iter().collect();

        let jobs: Vec<(&Tank, FollowState)> = own
            .tanks
            .iter()
            .map(|tank| (tank, self.router.take_state(&tank.id)))
            .collect();

        let plan = |(tank, state): (&Tank, FollowState)| {
            plan_tank(index, config, tank, state, &enemies, &allies)
        };
        let results: Vec<(FollowState, TankOrders)> = if config.parallel {
            jobs.into_par_iter().map(plan).collect()
        } else {
            jobs.into_iter().map(plan).collect()
        };

        results
            .into_iter()
            .map(|(state, orders)| {
                self.router.store(orders.tank_id.clone(), state);
                orders
            })
            .collect()
    }

    /// Decide orders and encode them as wire commands.
    pub fn commands(&mut self, snapshot: &WorldSnapshot) -> Vec<TankCommand> {
        let orders = self.plan_tick(snapshot);
        let token = self.client_token.as_str();
        orders
            .into_iter()
            .flat_map(|o| o.into_commands(token))
            .collect()
    }
}

/// Orders for one tank. Owns the tank's follow state for the duration.
fn plan_tank(
    index: &NavIndex,
    config: &EngineConfig,
    tank: &Tank,
    state: FollowState,
    enemies: &[&Tank],
    allies: &[&Tank],
) -> (FollowState, TankOrders) {
    let Some((distance, target)) = targeting::closest(tank, enemies) else {
        return (state, TankOrders::stand_down(tank.id.clone()));
    };

    let (state, step) = router::advance(index, state, tank, target, config);
    let turret = aim::rotation_to_point(tank.position, tank.turret_angle, target.position);
    let in_range = distance <= config.fire_range;
    let aimed = turret.map_or(true, |r| r.radians <= config.aim_tolerance);
    let blocked = in_range && aimed && aim::is_friendly_fire(tank, allies, target, config.friendly_fire_margin);
    if blocked {
        tracing::debug!(tank = %tank.id, target = %target.id, "Holding fire, ally in line");
    }
    let fire = in_range && aimed && !blocked;

    let orders = TankOrders {
        tank_id: tank.id.clone(),
        target: Some(target.id.clone()),
        step,
        turret,
        fire,
    };
    (state, orders)
}
