//! Per-tank path following.
//!
//! Each friendly tank moves through three states:
//!
//! - [`FollowState::NoPath`]: nothing planned. The next call searches the
//!   spatial index; an empty result leaves the tank here and the step heads
//!   straight for the target.
//! - [`FollowState::Following`]: a route is stored. Waypoints the tank has
//!   reached are consumed, and the step heads for the next one.
//! - [`FollowState::Arrived`]: every waypoint is consumed. The step heads
//!   straight for the target without consulting the index.
//!
//! A stored route is dropped and re-planned when the target changes, the
//! target moves to a different index node, the recorded last-visited node
//! disagrees with the route, or the tank drifts off its current leg.
//!
//! State is owned by the router and keyed by tank id; [`advance`] is the
//! pure transition used by both [`Router`] and parallel callers that hold
//! states themselves.

use std::collections::{HashMap, HashSet};

use crate::aim::{self, Rotation};
use crate::config::EngineConfig;
use crate::entities::{Tank, TankId};
use crate::geometry::{Point, EPSILON};
use crate::spatial::SpatialIndex;

/// One tick's movement request for a tank's tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStep {
    /// Distance to drive forward, in metres.
    pub distance: f64,
    /// Track turn to apply first. `None` when no heading is defined.
    pub rotation: Option<Rotation>,
}

impl RouteStep {
    /// No movement and no turn. Returned when the tank already sits on its
    /// destination and no heading can be computed.
    pub const IDLE: Self = Self {
        distance: 0.0,
        rotation: None,
    };

    /// Returns true for the idle sentinel.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.rotation.is_none() && self.distance < EPSILON
    }

    /// Turn the tracks towards `point` and drive the full distance to it.
    #[must_use]
    pub fn towards(tank: &Tank, point: Point) -> Self {
        match aim::rotation_to_point(tank.position, tank.track_angle, point) {
            Some(rotation) => Self {
                distance: tank.position.distance(point),
                rotation: Some(rotation),
            },
            None => Self::IDLE,
        }
    }
}

/// Path-following state of one tank.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FollowState {
    /// No route stored.
    #[default]
    NoPath,
    /// Driving along a stored route.
    Following {
        /// Enemy the route was planned towards.
        target: TankId,
        /// Index node nearest the target at planning time.
        goal: Point,
        /// Waypoints in driving order.
        path: Vec<Point>,
        /// Index of the next waypoint to reach.
        cursor: usize,
        /// Last waypoint the tank reached, if any.
        last_visited: Option<Point>,
        /// Tank position when the route was planned.
        planned_from: Point,
    },
    /// Route exhausted; heading straight for the target.
    Arrived {
        /// Enemy being approached.
        target: TankId,
        /// Index node nearest the target when the route finished.
        goal: Point,
    },
}

impl FollowState {
    /// Returns true while a route is being followed.
    #[must_use]
    pub fn is_following(&self) -> bool {
        matches!(self, Self::Following { .. })
    }

    /// Returns true once a route has been exhausted.
    #[must_use]
    pub fn is_arrived(&self) -> bool {
        matches!(self, Self::Arrived { .. })
    }

    /// Next waypoint to drive to.
    #[must_use]
    pub fn waypoint(&self) -> Option<Point> {
        match self {
            Self::Following { path, cursor, .. } => path.get(*cursor).copied(),
            _ => None,
        }
    }
}

/// Advance one tank's follow state by a tick.
///
/// Never fails: unreachable targets fall back to a direct heading, and
/// coincident positions yield [`RouteStep::IDLE`].
pub fn advance<I>(
    index: &I,
    state: FollowState,
    tank: &Tank,
    target: &Tank,
    config: &EngineConfig,
) -> (FollowState, RouteStep)
where
    I: SpatialIndex + ?Sized,
{
    let state = if let Some(reason) = replan_reason(index, &state, tank, target, config) {
        tracing::debug!(tank = %tank.id, target = %target.id, reason, "Discarding route");
        FollowState::NoPath
    } else {
        state
    };

    let state = match state {
        FollowState::NoPath => match plan(index, tank, target) {
            Some(planned) => planned,
            None => return (FollowState::NoPath, RouteStep::towards(tank, target.position)),
        },
        other => other,
    };

    match state {
        FollowState::Following {
            target: target_id,
            goal,
            path,
            mut cursor,
            mut last_visited,
            planned_from,
        } => {
            while let Some(&waypoint) = path.get(cursor) {
                if tank.position.distance(waypoint) >= config.waypoint_radius {
                    let step = RouteStep::towards(tank, waypoint);
                    let state = FollowState::Following {
                        target: target_id,
                        goal,
                        path,
                        cursor,
                        last_visited,
                        planned_from,
                    };
                    return (state, step);
                }
                last_visited = Some(waypoint);
                cursor += 1;
            }
            tracing::debug!(tank = %tank.id, target = %target.id, "Route complete");
            let state = FollowState::Arrived {
                target: target_id,
                goal,
            };
            (state, RouteStep::towards(tank, target.position))
        }
        arrived @ FollowState::Arrived { .. } => {
            (arrived, RouteStep::towards(tank, target.position))
        }
        FollowState::NoPath => (FollowState::NoPath, RouteStep::towards(tank, target.position)),
    }
}

/// Search the index for a route from the tank to the target.
fn plan<I>(index: &I, tank: &Tank, target: &Tank) -> Option<FollowState>
where
    I: SpatialIndex + ?Sized,
{
    let start = index.nearest_node(tank.position)?;
    let goal = index.nearest_node(target.position)?;
    let path = index.shortest_path(start, goal);
    if path.is_empty() {
        tracing::debug!(tank = %tank.id, target = %target.id, "No route to target");
        return None;
    }
    tracing::debug!(
        tank = %tank.id,
        target = %target.id,
        waypoints = path.len(),
        "Planned route"
    );
    Some(FollowState::Following {
        target: target.id.clone(),
        goal,
        path,
        cursor: 0,
        last_visited: None,
        planned_from: tank.position,
    })
}

/// Why a stored route can no longer be trusted, if it can't.
fn replan_reason<I>(
    index: &I,
    state: &FollowState,
    tank: &Tank,
    target: &Tank,
    config: &EngineConfig,
) -> Option<&'static str>
where
    I: SpatialIndex + ?Sized,
{
    let (stored_target, goal) = match state {
        FollowState::NoPath => return None,
        FollowState::Following { target, goal, .. } | FollowState::Arrived { target, goal } => {
            (target, *goal)
        }
    };

    if *stored_target != target.id {
        return Some("target changed");
    }
    let goal_moved = index
        .nearest_node(target.position)
        .map_or(true, |node| !node.approx_eq(goal));
    if goal_moved {
        return Some("target moved to another node");
    }

    let FollowState::Following {
        path,
        cursor,
        last_visited,
        planned_from,
        ..
    } = state
    else {
        return None;
    };

    if *cursor > path.len() {
        return Some("cursor past end of route");
    }
    let expected = cursor.checked_sub(1).map(|i| path[i]);
    let consistent = match (*last_visited, expected) {
        (None, None) => true,
        (Some(visited), Some(expected)) => visited.approx_eq(expected),
        _ => false,
    };
    if !consistent {
        return Some("last visited node disagrees with route");
    }

    if let Some(&head) = path.get(*cursor) {
        let leg_start = last_visited.unwrap_or(*planned_from);
        let allowed = leg_start.distance(head) + config.deviation_tolerance;
        if tank.position.distance(head) > allowed + EPSILON {
            return Some("tank drifted off course");
        }
    }
    None
}

/// Owner of every friendly tank's follow state for one match.
#[derive(Debug, Clone, Default)]
pub struct Router {
    states: HashMap<TankId, FollowState>,
}

impl Router {
    /// Create a router with no stored routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the next step for `tank` towards `target`, updating the
    /// tank's stored state.
    pub fn route<I>(
        &mut self,
        index: &I,
        tank: &Tank,
        target: &Tank,
        config: &EngineConfig,
    ) -> RouteStep
    where
        I: SpatialIndex + ?Sized,
    {
        let state = self.take_state(&tank.id);
        let (state, step) = advance(index, state, tank, target, config);
        self.store(tank.id.clone(), state);
        step
    }

    /// Stored state of a tank, if any.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<&FollowState> {
        self.states.get(id)
    }

    /// Remove and return a tank's state (`NoPath` if none stored).
    pub fn take_state(&mut self, id: &str) -> FollowState {
        self.states.remove(id).unwrap_or_default()
    }

    /// Store a tank's state.
    pub fn store(&mut self, id: TankId, state: FollowState) {
        self.states.insert(id, state);
    }

    /// Drop state for every tank not in `alive`. Respawned tanks carry new
    /// ids, so their old routes go with this.
    pub fn retain_tanks<'a>(&mut self, alive: impl IntoIterator<Item = &'a str>) {
        let alive: HashSet<&str> = alive.into_iter().collect();
        self.states.retain(|id, _| alive.contains(id.as_str()));
    }

    /// Forget every stored route, e.g. when the map changes.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Number of tanks with stored state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true when no state is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
