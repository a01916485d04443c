//! Engine configuration.
//!
//! Loaded from a RON file at client startup; every field has a default
//! so a partial file only overrides what it names.
//!
//! # Example RON
//!
//! ```ron
//! EngineConfig(
//!     clearance_padding: 5.0,
//!     grid_resolution: 1.0,
//!     strategy: VisibilityGraph,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::geometry::EPSILON;

/// Default clearance kept between planned routes and obstacle walls.
pub const DEFAULT_CLEARANCE_PADDING: f64 = 5.0;

/// Default occupancy grid cell size in metres.
pub const DEFAULT_GRID_RESOLUTION: f64 = 1.0;

/// Default distance a tank may stray from its current leg before re-planning.
pub const DEFAULT_DEVIATION_TOLERANCE: f64 = 2.0;

/// Default maximum engagement distance (projectile range).
pub const DEFAULT_FIRE_RANGE: f64 = 50.0;

/// Default firing-line clearance for allies, in collision radii.
pub const DEFAULT_FRIENDLY_FIRE_MARGIN: f64 = 2.0;

/// Default turret misalignment, in radians, below which a shot is taken.
pub const DEFAULT_AIM_TOLERANCE: f64 = 0.1;

/// Which spatial index routes are planned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoutingStrategy {
    /// Dijkstra over padded obstacle corners. Sparse, realistic waypoints.
    #[default]
    VisibilityGraph,
    /// A* over the rasterized occupancy grid.
    Grid,
}

/// Tunables for index construction, routing and engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Margin added around obstacles when seeding visibility graph nodes.
    pub clearance_padding: f64,
    /// Occupancy grid cell size in metres.
    pub grid_resolution: f64,
    /// Active routing strategy.
    pub strategy: RoutingStrategy,
    /// Extra distance beyond the current leg length tolerated before a
    /// tank is considered off course.
    pub deviation_tolerance: f64,
    /// A waypoint counts as reached once the tank is closer than this.
    pub waypoint_radius: f64,
    /// Enemies further than this are approached but not fired upon.
    pub fire_range: f64,
    /// Allies within this many collision radii of the firing line block
    /// the shot.
    pub friendly_fire_margin: f64,
    /// Only fire once the turret is within this many radians of the target.
    pub aim_tolerance: f64,
    /// Route each tick's tanks on a thread pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clearance_padding: DEFAULT_CLEARANCE_PADDING,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            strategy: RoutingStrategy::default(),
            deviation_tolerance: DEFAULT_DEVIATION_TOLERANCE,
            waypoint_radius: EPSILON,
            fire_range: DEFAULT_FIRE_RANGE,
            friendly_fire_margin: DEFAULT_FRIENDLY_FIRE_MARGIN,
            aim_tolerance: DEFAULT_AIM_TOLERANCE,
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: EngineConfig = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.grid_resolution.is_finite() && self.grid_resolution > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "grid_resolution",
                message: format!("must be positive, got {}", self.grid_resolution),
            });
        }
        if !(self.clearance_padding.is_finite() && self.clearance_padding >= 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "clearance_padding",
                message: format!("must be non-negative, got {}", self.clearance_padding),
            });
        }
        if !(self.deviation_tolerance.is_finite() && self.deviation_tolerance >= 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "deviation_tolerance",
                message: format!("must be non-negative, got {}", self.deviation_tolerance),
            });
        }
        if !(self.waypoint_radius.is_finite() && self.waypoint_radius >= EPSILON) {
            return Err(EngineError::InvalidConfig {
                field: "waypoint_radius",
                message: format!("must be at least {EPSILON}, got {}", self.waypoint_radius),
            });
        }
        if !(self.fire_range.is_finite() && self.fire_range >= 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "fire_range",
                message: format!("must be non-negative, got {}", self.fire_range),
            });
        }
        if !(self.friendly_fire_margin.is_finite() && self.friendly_fire_margin >= 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "friendly_fire_margin",
                message: format!("must be non-negative, got {}", self.friendly_fire_margin),
            });
        }
        if !(self.aim_tolerance.is_finite() && self.aim_tolerance >= 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "aim_tolerance",
                message: format!("must be non-negative, got {}", self.aim_tolerance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.clearance_padding, 5.0);
        assert_eq!(config.grid_resolution, 1.0);
        assert_eq!(config.strategy, RoutingStrategy::VisibilityGraph);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = EngineConfig::from_ron_str("(strategy: Grid, grid_resolution: 10.0)").unwrap();
        assert_eq!(config.strategy, RoutingStrategy::Grid);
        assert_eq!(config.grid_resolution, 10.0);
        assert_eq!(config.clearance_padding, DEFAULT_CLEARANCE_PADDING);
    }

    #[test]
    fn test_rejects_zero_resolution() {
        let result = EngineConfig::from_ron_str("(grid_resolution: 0.0)");
        assert!(matches!(
            result,
            Err(EngineError::InvalidConfig {
                field: "grid_resolution",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let result = EngineConfig::from_ron_str("(strategy: Teleport)");
        assert!(matches!(result, Err(EngineError::ConfigParse(_))));
    }
}
