//! Axis-aligned obstacle model.
//!
//! Obstacles are bounding boxes anchored at their bottom-left corner.
//! Everything here is a pure transform of the box: raw edges for
//! visibility blocking, padded corners for graph nodes.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::geometry::{Point, Segment};

/// Terrain class of an obstacle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Passable by tanks and projectiles. Ignored by collision geometry.
    Normal,
    /// Blocks tanks, lets projectiles through.
    Impassable,
    /// Blocks tanks and projectiles.
    Solid,
    /// Type string the client does not recognise. Treated as blocking.
    Unknown(String),
}

impl ObstacleKind {
    /// Parse the server's terrain type string.
    ///
    /// Unrecognised values are logged and kept as [`ObstacleKind::Unknown`].
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "NORMAL" => Self::Normal,
            "IMPASSABLE" => Self::Impassable,
            "SOLID" => Self::Solid,
            other => {
                tracing::warn!(terrain_type = other, "Unknown terrain type");
                Self::Unknown(other.to_string())
            }
        }
    }

    /// Returns true if this obstacle takes part in collision geometry.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Axis-aligned rectangular obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    kind: ObstacleKind,
    /// Bottom-left corner (closest to the map origin).
    corner: Point,
    width: f64,
    height: f64,
}

impl Obstacle {
    /// Create an obstacle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidObstacle`] if the size is negative or
    /// any value is not finite.
    pub fn new(kind: ObstacleKind, corner: Point, width: f64, height: f64) -> Result<Self> {
        let finite = corner.x.is_finite()
            && corner.y.is_finite()
            && width.is_finite()
            && height.is_finite();
        if !finite || width < 0.0 || height < 0.0 {
            return Err(EngineError::InvalidObstacle {
                x: corner.x,
                y: corner.y,
                width,
                height,
            });
        }
        Ok(Self {
            kind,
            corner,
            width,
            height,
        })
    }

    /// Terrain class.
    #[must_use]
    pub const fn kind(&self) -> &ObstacleKind {
        &self.kind
    }

    /// Bottom-left corner.
    #[must_use]
    pub const fn corner(&self) -> Point {
        self.corner
    }

    /// Width in metres.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Height in metres.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Returns true if this obstacle takes part in collision geometry.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }

    /// The four corners of the box grown by `padding` on every side,
    /// counter-clockwise from bottom-left.
    #[must_use]
    pub fn corners(&self, padding: f64) -> [Point; 4] {
        let min_x = self.corner.x - padding;
        let min_y = self.corner.y - padding;
        let max_x = self.corner.x + self.width + padding;
        let max_y = self.corner.y + self.height + padding;
        [
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ]
    }

    /// The four boundary segments of the raw box.
    #[must_use]
    pub fn edges(&self) -> [Segment; 4] {
        self.padded_edges(0.0)
    }

    /// The four boundary segments of the box grown by `padding`.
    #[must_use]
    pub fn padded_edges(&self, padding: f64) -> [Segment; 4] {
        let [bl, br, tr, tl] = self.corners(padding);
        [
            Segment::new(bl, br),
            Segment::new(br, tr),
            Segment::new(tr, tl),
            Segment::new(tl, bl),
        ]
    }
}

/// Iterate over the obstacles that take part in collision geometry.
pub fn blocking(obstacles: &[Obstacle]) -> impl Iterator<Item = &Obstacle> {
    obstacles.iter().filter(|o| o.is_blocking())
}
