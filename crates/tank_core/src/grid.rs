//! Occupancy grid and A* search.
//!
//! The grid rasterizes blocking obstacles at a configurable resolution.
//! Searches run over 8-connected cells with squared step costs (1 axial,
//! 2 diagonal) and a squared Euclidean heuristic. Diagonal steps may cut
//! past the corner of a blocked cell.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, EPSILON};
use crate::map::Map;
use crate::obstacle::ObstacleKind;

/// Upper bound on rasterized cells. Maps that would exceed it at the
/// requested resolution are rasterized with coarser cells.
pub const MAX_GRID_CELLS: usize = 4_000_000;

/// Passability class of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Open terrain.
    #[default]
    Free,
    /// Covered by an impassable obstacle.
    Impassable,
    /// Covered by a solid obstacle.
    Solid,
    /// Covered by an obstacle of unrecognised type.
    Unknown,
}

impl Cell {
    /// Returns true if tanks may drive through this cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Free)
    }

    /// Digit used by [`OccupancyGrid::render`].
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Free => '0',
            Self::Impassable => '1',
            Self::Solid => '2',
            Self::Unknown => '9',
        }
    }

    /// Cell class painted by an obstacle kind. `None` for passable terrain.
    #[must_use]
    pub const fn for_obstacle(kind: &ObstacleKind) -> Option<Self> {
        match kind {
            ObstacleKind::Normal => None,
            ObstacleKind::Impassable => Some(Self::Impassable),
            ObstacleKind::Solid => Some(Self::Solid),
            ObstacleKind::Unknown(_) => Some(Self::Unknown),
        }
    }
}

/// Rasterized passability map.
///
/// Cell `(x, y)` covers `[x*r, (x+1)*r) x [y*r, (y+1)*r)` in map metres,
/// where `r` is the resolution. Cell `(0, 0)` is at the map origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyGrid {
    /// Grid width in cells.
    width: usize,
    /// Grid height in cells.
    height: usize,
    /// Cell data stored in row-major order.
    cells: Vec<Cell>,
    /// Size of each cell in map metres.
    resolution: f64,
}

impl OccupancyGrid {
    /// Create a grid with every cell free.
    ///
    /// # Panics
    ///
    /// Panics if `resolution` is not positive or the cell count overflows.
    #[must_use]
    pub fn new(width: usize, height: usize, resolution: f64) -> Self {
        assert!(resolution > 0.0, "OccupancyGrid resolution must be positive");
        let Some(len) = width.checked_mul(height) else {
            panic!("OccupancyGrid of {width} x {height} cells is too large");
        };
        Self {
            width,
            height,
            cells: vec![Cell::Free; len],
            resolution,
        }
    }

    /// Rasterize a map's blocking obstacles.
    ///
    /// Obstacles are painted in map order, so later obstacles overwrite
    /// earlier ones where they overlap. Cells falling outside the grid are
    /// dropped silently. The resolution is coarsened when the map would
    /// need more than about [`MAX_GRID_CELLS`] cells.
    #[must_use]
    pub fn from_map(map: &Map, resolution: f64) -> Self {
        let resolution = bounded_resolution(map.width(), map.height(), resolution);
        let width = cells_spanning(map.width(), resolution);
        let height = cells_spanning(map.height(), resolution);
        let mut grid = Self::new(width, height, resolution);

        for obstacle in map.obstacles() {
            let Some(cell) = Cell::for_obstacle(obstacle.kind()) else {
                continue;
            };
            let corner = obstacle.corner();
            let x0 = (corner.x / resolution + EPSILON).floor() as i64;
            let y0 = (corner.y / resolution + EPSILON).floor() as i64;
            let x1 = ((corner.x + obstacle.width()) / resolution - EPSILON).ceil() as i64;
            let y1 = ((corner.y + obstacle.height()) / resolution - EPSILON).ceil() as i64;
            grid.fill_rect(x0, y0, x1, y1, cell);
        }

        tracing::debug!(
            width = grid.width,
            height = grid.height,
            blocked = grid.cells.iter().filter(|c| !c.is_passable()).count(),
            "Built occupancy grid"
        );
        grid
    }

    /// Paint the half-open cell rectangle `[x0, x1) x [y0, y1)`, clipped to
    /// the grid.
    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, cell: Cell) {
        let x_start = x0.max(0);
        let y_start = y0.max(0);
        let x_end = x1.min(self.width as i64);
        let y_end = y1.min(self.height as i64);
        for y in y_start..y_end {
            for x in x_start..x_end {
                self.set(x as usize, y as usize, cell);
            }
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Cell size in map metres.
    #[must_use]
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Check if cell coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Cell at coordinates, `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.in_bounds(x, y).then(|| self.cells[self.index(x, y)])
    }

    /// Set cell at coordinates. Returns `false` if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        if self.in_bounds(x, y) {
            let index = self.index(x, y);
            self.cells[index] = cell;
            true
        } else {
            false
        }
    }

    /// Check if a cell can be driven through.
    #[must_use]
    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(Cell::is_passable)
    }

    /// Cell containing a map position, `None` outside the grid.
    #[must_use]
    pub fn world_to_cell(&self, p: Point) -> Option<(usize, usize)> {
        let x = (p.x / self.resolution + EPSILON).floor();
        let y = (p.y / self.resolution + EPSILON).floor();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        self.in_bounds(x, y).then_some((x, y))
    }

    /// Cell containing a map position, clamped onto the grid.
    /// `None` only for an empty grid.
    #[must_use]
    pub fn clamp_to_cell(&self, p: Point) -> Option<(usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let clamp = |v: f64, cells: usize| {
            let c = (v / self.resolution + EPSILON).floor().max(0.0) as usize;
            c.min(cells - 1)
        };
        Some((clamp(p.x, self.width), clamp(p.y, self.height)))
    }

    /// Map position of a cell's origin corner.
    #[must_use]
    pub fn cell_to_world(&self, x: usize, y: usize) -> Point {
        Point::new(x as f64 * self.resolution, y as f64 * self.resolution)
    }

    /// Text rendering as the visualizer shows it: top row is the highest
    /// `y`, one digit per cell (`0` free, `1` impassable, `2` solid,
    /// `9` unknown), newline after every row.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.cells[self.index(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    /// Find a route between two map positions.
    ///
    /// Returns the waypoints after the start cell up to and including the
    /// goal cell, reduced to direction changes. Empty when either position
    /// is off the grid, the goal is blocked, start and goal share a cell, or
    /// no route exists.
    #[must_use]
    pub fn shortest_path(&self, start: Point, goal: Point) -> Vec<Point> {
        let (Some(start), Some(goal)) = (self.world_to_cell(start), self.world_to_cell(goal)) else {
            return Vec::new();
        };
        self.shortest_cell_path(start, goal)
            .into_iter()
            .map(|(x, y)| self.cell_to_world(x, y))
            .collect()
    }

    /// A* over cell coordinates. See [`OccupancyGrid::shortest_path`].
    #[must_use]
    pub fn shortest_cell_path(
        &self,
        start: (usize, usize),
        goal: (usize, usize),
    ) -> Vec<(usize, usize)> {
        if !self.in_bounds(start.0, start.1) || !self.is_passable(goal.0, goal.1) || start == goal
        {
            return Vec::new();
        }

        let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
        let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        let mut g_score: HashMap<(usize, usize), u64> = HashMap::new();

        g_score.insert(start, 0);
        open_set.push(AStarNode::new(start, heuristic(start, goal)));

        while let Some(current) = open_set.pop() {
            if current.cell == goal {
                let cells = reconstruct_path(&came_from, start, goal);
                return collapse_waypoints(start, &cells);
            }

            let current_g = g_score.get(&current.cell).copied().unwrap_or(u64::MAX);
            // Stale heap entry superseded by a cheaper route
            if current.f_score > current_g.saturating_add(heuristic(current.cell, goal)) {
                continue;
            }

            for &(dx, dy) in &DIRECTIONS {
                let Some(next) = self.neighbor(current.cell, dx, dy) else {
                    continue;
                };
                let step_cost = if dx != 0 && dy != 0 { 2 } else { 1 };
                let tentative_g = current_g + step_cost;
                if tentative_g < g_score.get(&next).copied().unwrap_or(u64::MAX) {
                    came_from.insert(next, current.cell);
                    g_score.insert(next, tentative_g);
                    open_set.push(AStarNode::new(next, tentative_g + heuristic(next, goal)));
                }
            }
        }

        Vec::new()
    }

    fn neighbor(&self, (x, y): (usize, usize), dx: i64, dy: i64) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dx as isize)?;
        let ny = y.checked_add_signed(dy as isize)?;
        self.is_passable(nx, ny).then_some((nx, ny))
    }
}

/// `resolution`, or the finest coarser one keeping the grid near
/// [`MAX_GRID_CELLS`].
fn bounded_resolution(width: f64, height: f64, resolution: f64) -> f64 {
    let cells = (width / resolution).ceil() * (height / resolution).ceil();
    if cells <= MAX_GRID_CELLS as f64 {
        return resolution;
    }
    let coarse = (width * height / MAX_GRID_CELLS as f64).sqrt().max(resolution);
    tracing::warn!(
        requested = resolution,
        used = coarse,
        "Map too large for grid resolution, coarsening cells"
    );
    coarse
}

/// Number of cells needed to cover `extent` metres.
fn cells_spanning(extent: f64, resolution: f64) -> usize {
    (extent / resolution - EPSILON).ceil().max(0.0) as usize
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    cell: (usize, usize),
    /// g + h
    f_score: u64,
    /// Lower coordinates win ties so searches are reproducible.
    tie_breaker: u64,
}

impl AStarNode {
    fn new(cell: (usize, usize), f_score: u64) -> Self {
        Self {
            cell,
            f_score,
            tie_breaker: ((cell.1 as u64) << 32) | (cell.0 as u64),
        }
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for min-heap behavior.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction offsets for 8-directional movement.
const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),   // East
    (1, 1),   // Northeast
    (0, 1),   // North
    (-1, 1),  // Northwest
    (-1, 0),  // West
    (-1, -1), // Southwest
    (0, -1),  // South
    (1, -1),  // Southeast
];

/// Squared Euclidean distance between cells.
#[inline]
fn heuristic(a: (usize, usize), b: (usize, usize)) -> u64 {
    let dx = a.0.abs_diff(b.0) as u64;
    let dy = a.1.abs_diff(b.1) as u64;
    dx * dx + dy * dy
}

/// Walk `came_from` back from the goal. Excludes the start cell.
fn reconstruct_path(
    came_from: &HashMap<(usize, usize), (usize, usize)>,
    start: (usize, usize),
    goal: (usize, usize),
) -> Vec<(usize, usize)> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

fn step(from: (usize, usize), to: (usize, usize)) -> (i64, i64) {
    (
        to.0 as i64 - from.0 as i64,
        to.1 as i64 - from.1 as i64,
    )
}

/// Keep only the cells where the heading changes, plus the final cell.
fn collapse_waypoints(start: (usize, usize), cells: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut waypoints = Vec::new();
    let mut prev = start;
    for (i, &cell) in cells.iter().enumerate() {
        let heading = step(prev, cell);
        let continues = cells
            .get(i + 1)
            .is_some_and(|&next| step(cell, next) == heading);
        if !continues {
            waypoints.push(cell);
        }
        prev = cell;
    }
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::Obstacle;

    fn obstacle(kind: ObstacleKind, x: f64, y: f64, w: f64, h: f64) -> Obstacle {
        Obstacle::new(kind, Point::new(x, y), w, h).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let map = Map::new(10.0, 75.0, Vec::new()).unwrap();
        let grid = OccupancyGrid::from_map(&map, 1.0);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 75);
        assert!(grid.is_passable(9, 74));
    }

    #[test]
    fn test_grid_resolution_scales_dimensions() {
        let map = Map::new(800.0, 450.0, Vec::new()).unwrap();
        let grid = OccupancyGrid::from_map(&map, 10.0);
        assert_eq!(grid.width(), 80);
        assert_eq!(grid.height(), 45);
    }

    #[test]
    fn test_reference_rasterization() {
        let map = Map::new(
            10.0,
            50.0,
            vec![
                obstacle(ObstacleKind::Solid, 1.0, 1.0, 3.0, 5.0),
                obstacle(ObstacleKind::Impassable, 4.0, 6.0, 6.0, 20.0),
                obstacle(ObstacleKind::Normal, 0.0, 4.0, 10.0, 10.0),
                // Runs off the right edge of the map
                obstacle(ObstacleKind::Solid, 0.0, 40.0, 30.0, 1.0),
            ],
        )
        .unwrap();
        let grid = OccupancyGrid::from_map(&map, 1.0);

        let mut expected = String::new();
        expected.push_str(&"0000000000\n".repeat(9));
        expected.push_str("2222222222\n");
        expected.push_str(&"0000000000\n".repeat(14));
        expected.push_str(&"0000111111\n".repeat(20));
        expected.push_str(&"0222000000\n".repeat(5));
        expected.push_str("0000000000\n");

        assert_eq!(grid.render(), expected);
    }

    #[test]
    fn test_later_obstacles_overwrite_earlier() {
        let map = Map::new(
            5.0,
            5.0,
            vec![
                obstacle(ObstacleKind::Solid, 0.0, 0.0, 3.0, 3.0),
                obstacle(ObstacleKind::Impassable, 2.0, 2.0, 3.0, 3.0),
            ],
        )
        .unwrap();
        let grid = OccupancyGrid::from_map(&map, 1.0);
        assert_eq!(grid.get(1, 1), Some(Cell::Solid));
        assert_eq!(grid.get(2, 2), Some(Cell::Impassable));
    }

    #[test]
    fn test_unknown_obstacle_is_distinct_and_blocking() {
        let map = Map::new(
            3.0,
            1.0,
            vec![obstacle(ObstacleKind::Unknown("LAVA".into()), 1.0, 0.0, 1.0, 1.0)],
        )
        .unwrap();
        let grid = OccupancyGrid::from_map(&map, 1.0);
        assert_eq!(grid.get(1, 0), Some(Cell::Unknown));
        assert!(!grid.is_passable(1, 0));
        assert_eq!(grid.render(), "090\n");
    }

    #[test]
    fn test_negative_corner_is_clipped() {
        let map = Map::new(
            4.0,
            4.0,
            vec![obstacle(ObstacleKind::Solid, -2.0, -2.0, 3.0, 3.0)],
        )
        .unwrap();
        let grid = OccupancyGrid::from_map(&map, 1.0);
        assert_eq!(grid.get(0, 0), Some(Cell::Solid));
        assert_eq!(grid.get(1, 0), Some(Cell::Free));
        // Nothing wrapped around to the far side
        assert_eq!(grid.get(3, 3), Some(Cell::Free));
    }

    #[test]
    fn test_huge_map_coarsens_resolution() {
        let map = Map::new(1.0e6, 1.0e6, Vec::new()).unwrap();
        let grid = OccupancyGrid::from_map(&map, 0.01);
        assert!(grid.resolution() >= 500.0);
        assert!(grid.width() * grid.height() <= MAX_GRID_CELLS + 2 * 2001);

        // Small maps keep the requested resolution
        let map = Map::new(100.0, 50.0, Vec::new()).unwrap();
        assert_eq!(OccupancyGrid::from_map(&map, 0.5).resolution(), 0.5);
    }

    #[test]
    fn test_world_to_cell_conversion() {
        let grid = OccupancyGrid::new(10, 10, 2.0);
        assert_eq!(grid.world_to_cell(Point::new(1.0, 1.0)), Some((0, 0)));
        assert_eq!(grid.world_to_cell(Point::new(3.0, 3.0)), Some((1, 1)));
        assert_eq!(grid.world_to_cell(Point::new(19.0, 19.0)), Some((9, 9)));
        assert_eq!(grid.world_to_cell(Point::new(20.0, 20.0)), None);
        assert_eq!(grid.world_to_cell(Point::new(-1.0, 0.0)), None);
        assert_eq!(grid.clamp_to_cell(Point::new(25.0, -4.0)), Some((9, 0)));
        assert_eq!(grid.cell_to_world(1, 2), Point::new(2.0, 4.0));
    }

    #[test]
    fn test_set_and_get_cell() {
        let mut grid = OccupancyGrid::new(5, 5, 1.0);
        assert!(grid.is_passable(2, 2));
        assert!(grid.set(2, 2, Cell::Solid));
        assert!(!grid.is_passable(2, 2));
        assert!(!grid.set(5, 0, Cell::Solid));
        assert_eq!(grid.get(5, 0), None);
    }

    #[test]
    fn test_straight_run_collapses_to_endpoint() {
        let grid = OccupancyGrid::new(10, 1, 1.0);
        let path = grid.shortest_path(Point::new(0.0, 0.0), Point::new(9.0, 0.0));
        assert_eq!(path, vec![Point::new(9.0, 0.0)]);
    }

    #[test]
    fn test_open_diagonal_collapses_to_endpoint() {
        let grid = OccupancyGrid::new(10, 10, 1.0);
        let path = grid.shortest_path(Point::new(0.0, 0.0), Point::new(9.0, 9.0));
        assert_eq!(path, vec![Point::new(9.0, 9.0)]);
    }

    #[test]
    fn test_full_width_wall_is_unreachable() {
        let map = Map::new(
            10.0,
            10.0,
            vec![obstacle(ObstacleKind::Solid, 0.0, 4.0, 10.0, 1.0)],
        )
        .unwrap();
        let grid = OccupancyGrid::from_map(&map, 1.0);
        assert!(grid
            .shortest_path(Point::new(0.0, 0.0), Point::new(9.0, 9.0))
            .is_empty());
    }

    #[test]
    fn test_path_around_wall() {
        let mut grid = OccupancyGrid::new(10, 10, 1.0);
        for y in 2..8 {
            grid.set(5, y, Cell::Solid);
        }

        let path = grid.shortest_cell_path((2, 5), (8, 5));
        assert_eq!(path.last(), Some(&(8, 5)));

        // Expand the polyline back into unit steps and check every cell
        let mut prev = (2usize, 5usize);
        for &waypoint in &path {
            let (dx, dy) = step(prev, waypoint);
            let n = dx.abs().max(dy.abs());
            for i in 1..=n {
                let cell = (
                    (prev.0 as i64 + dx.signum() * i) as usize,
                    (prev.1 as i64 + dy.signum() * i) as usize,
                );
                assert!(grid.is_passable(cell.0, cell.1), "route crosses {cell:?}");
            }
            prev = waypoint;
        }
    }

    #[test]
    fn test_goal_blocked() {
        let mut grid = OccupancyGrid::new(10, 10, 1.0);
        grid.set(5, 5, Cell::Impassable);
        assert!(grid.shortest_cell_path((0, 0), (5, 5)).is_empty());
    }

    #[test]
    fn test_same_cell_has_no_steps() {
        let grid = OccupancyGrid::new(10, 10, 1.0);
        assert!(grid
            .shortest_path(Point::new(3.2, 3.7), Point::new(3.9, 3.1))
            .is_empty());
    }

    #[test]
    fn test_off_grid_endpoints() {
        let grid = OccupancyGrid::new(10, 10, 1.0);
        assert!(grid
            .shortest_path(Point::new(-5.0, 0.0), Point::new(3.0, 3.0))
            .is_empty());
        assert!(grid
            .shortest_path(Point::new(0.0, 0.0), Point::new(30.0, 3.0))
            .is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut grid = OccupancyGrid::new(20, 20, 1.0);
        for i in 5..15 {
            grid.set(10, i, Cell::Solid);
        }
        let start = Point::new(5.0, 10.0);
        let goal = Point::new(15.0, 10.0);

        let path1 = grid.shortest_path(start, goal);
        let path2 = grid.shortest_path(start, goal);
        assert!(!path1.is_empty());
        assert_eq!(path1, path2);
    }

    #[test]
    fn test_collapse_waypoints() {
        let cells = [(1, 0), (2, 0), (3, 1), (4, 2), (4, 3)];
        assert_eq!(
            collapse_waypoints((0, 0), &cells),
            vec![(2, 0), (4, 2), (4, 3)]
        );
    }

    #[test]
    fn test_heuristic_is_squared_distance() {
        assert_eq!(heuristic((0, 0), (3, 4)), 25);
        assert_eq!(heuristic((5, 5), (5, 5)), 0);
    }
}
