//! Geometry kernel: points, segments and tolerance-aware comparisons.
//!
//! Every comparison involving computed reals goes through [`EPSILON`].
//! Exact float equality is never used to decide intersection, arrival
//! or bounds membership.

use serde::{Deserialize, Serialize};

/// Tolerance for all comparisons of computed coordinates and distances.
pub const EPSILON: f64 = 1e-6;

/// A position in map-metre coordinates. Origin is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (metres, grows to the right).
    pub x: f64,
    /// Y coordinate (metres, grows upward).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin point.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// True when both coordinates match within [`EPSILON`].
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product of two vectors.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A closed line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Direction vector from start to end.
    #[must_use]
    pub fn direction(&self) -> Point {
        self.end - self.start
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Check whether this segment touches or crosses another.
    #[must_use]
    pub fn intersects(&self, other: &Segment) -> bool {
        segments_intersect(self, other)
    }

    /// Perpendicular distance from `p` to the infinite line through this
    /// segment. `None` for zero-length segments, which define no line.
    fn line_distance(&self, p: Point) -> Option<f64> {
        let d = self.direction();
        let len = d.length();
        if len < EPSILON {
            return None;
        }
        Some((d.cross(p - self.start) / len).abs())
    }

    /// True when both endpoints of `other` lie on this segment's line.
    /// Vacuously true for a zero-length segment.
    fn carries(&self, other: &Segment) -> bool {
        let on_line = |p: Point| self.line_distance(p).map_or(true, |d| d < EPSILON);
        on_line(other.start) && on_line(other.end)
    }

    fn x_range(&self) -> (f64, f64) {
        (self.start.x.min(self.end.x), self.start.x.max(self.end.x))
    }

    fn y_range(&self) -> (f64, f64) {
        (self.start.y.min(self.end.y), self.start.y.max(self.end.y))
    }
}

/// Check whether two closed segments intersect.
///
/// The general case solves the 2x2 system `s1.start + t*d1 = s2.start + u*d2`
/// and accepts `t, u` in `[-EPSILON, 1 + EPSILON]`. When the determinant is
/// below [`EPSILON`] the segments are parallel: they intersect only when
/// collinear and their extents overlap on both axes.
///
/// The result is symmetric in its arguments.
#[must_use]
pub fn segments_intersect(s1: &Segment, s2: &Segment) -> bool {
    let d1 = s1.direction();
    let d2 = s2.direction();
    let det = d1.cross(d2);

    if det.abs() < EPSILON {
        return collinear_overlap(s1, s2);
    }

    let r = s2.start - s1.start;
    let t = r.cross(d2) / det;
    let u = r.cross(d1) / det;

    within_unit(t) && within_unit(u)
}

#[inline]
fn within_unit(param: f64) -> bool {
    param >= -EPSILON && param <= 1.0 + EPSILON
}

fn collinear_overlap(s1: &Segment, s2: &Segment) -> bool {
    if !(s1.carries(s2) && s2.carries(s1)) {
        return false;
    }
    ranges_overlap(s1.x_range(), s2.x_range()) && ranges_overlap(s1.y_range(), s2.y_range())
}

#[inline]
fn ranges_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.1 + EPSILON && b.0 <= a.1 + EPSILON
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(p1: Point, p2: Point) -> f64 {
    p1.distance(p2)
}

/// True when `p` lies inside a `width x height` map, borders included
/// within [`EPSILON`].
#[must_use]
pub fn in_bounds(p: Point, width: f64, height: f64) -> bool {
    p.x >= -EPSILON && p.x <= width + EPSILON && p.y >= -EPSILON && p.y <= height + EPSILON
}
