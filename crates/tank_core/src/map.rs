//! Game map: bounds plus obstacle set.
//!
//! Map origin (0, 0) is the bottom-left corner. Obstacles may extend past
//! the map edges; consumers clip rather than reject them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::geometry::{self, Point, Segment};
use crate::obstacle::{self, Obstacle};

/// Largest accepted map side, in metres.
pub const MAX_MAP_EXTENT: f64 = 1.0e6;

/// Immutable map description for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    width: f64,
    height: f64,
    obstacles: Vec<Obstacle>,
}

impl Map {
    /// Create a map.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidMapSize`] if either dimension is
    /// negative, not finite, or larger than [`MAX_MAP_EXTENT`].
    pub fn new(width: f64, height: f64, obstacles: Vec<Obstacle>) -> Result<Self> {
        let valid = |side: f64| side.is_finite() && (0.0..=MAX_MAP_EXTENT).contains(&side);
        if !(valid(width) && valid(height)) {
            return Err(EngineError::InvalidMapSize { width, height });
        }
        Ok(Self {
            width,
            height,
            obstacles,
        })
    }

    /// Map width in metres.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Map height in metres.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// All obstacles in server order, `Normal` ones included.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Obstacles that take part in collision geometry.
    pub fn blocking_obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        obstacle::blocking(&self.obstacles)
    }

    /// Raw edges of every blocking obstacle.
    #[must_use]
    pub fn blocking_edges(&self) -> Vec<Segment> {
        self.blocking_obstacles().flat_map(Obstacle::edges).collect()
    }

    /// Check if a point is on the map (borders included within epsilon).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        geometry::in_bounds(p, self.width, self.height)
    }

    /// True when both maps share the same obstacle layout.
    ///
    /// Spatial indexes only need rebuilding when this returns false.
    #[must_use]
    pub fn same_layout(&self, other: &Map) -> bool {
        self == other
    }
}
