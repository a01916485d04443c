//! Routing strategy seam.
//!
//! Both spatial indexes answer the same two questions: which index node is
//! closest to a position, and what is the route between two positions.
//! The router only talks to [`SpatialIndex`], so either index can back it.

use crate::config::{EngineConfig, RoutingStrategy};
use crate::geometry::Point;
use crate::grid::OccupancyGrid;
use crate::map::Map;
use crate::visibility::VisibilityGraph;

/// A spatial index the router can plan on.
pub trait SpatialIndex {
    /// Derive the index from a map. Called once per obstacle layout.
    fn build(map: &Map, config: &EngineConfig) -> Self
    where
        Self: Sized;

    /// Index node closest to `p`, as a map position.
    fn nearest_node(&self, p: Point) -> Option<Point>;

    /// Waypoints leading from `from` towards `to`. Empty when unreachable.
    fn shortest_path(&self, from: Point, to: Point) -> Vec<Point>;
}

impl SpatialIndex for VisibilityGraph {
    fn build(map: &Map, config: &EngineConfig) -> Self {
        VisibilityGraph::build(map, config.clearance_padding)
    }

    fn nearest_node(&self, p: Point) -> Option<Point> {
        VisibilityGraph::nearest_node(self, p).and_then(|id| self.node(id))
    }

    fn shortest_path(&self, from: Point, to: Point) -> Vec<Point> {
        VisibilityGraph::shortest_path(self, from, to)
    }
}

impl SpatialIndex for OccupancyGrid {
    fn build(map: &Map, config: &EngineConfig) -> Self {
        OccupancyGrid::from_map(map, config.grid_resolution)
    }

    fn nearest_node(&self, p: Point) -> Option<Point> {
        self.clamp_to_cell(p).map(|(x, y)| self.cell_to_world(x, y))
    }

    fn shortest_path(&self, from: Point, to: Point) -> Vec<Point> {
        OccupancyGrid::shortest_path(self, from, to)
    }
}

/// Spatial index selected at runtime from [`RoutingStrategy`].
#[derive(Debug, Clone)]
pub enum NavIndex {
    /// Visibility graph backed routing.
    Graph(VisibilityGraph),
    /// Occupancy grid backed routing.
    Grid(OccupancyGrid),
}

impl NavIndex {
    /// Strategy this index implements.
    #[must_use]
    pub const fn strategy(&self) -> RoutingStrategy {
        match self {
            Self::Graph(_) => RoutingStrategy::VisibilityGraph,
            Self::Grid(_) => RoutingStrategy::Grid,
        }
    }
}

impl SpatialIndex for NavIndex {
    fn build(map: &Map, config: &EngineConfig) -> Self {
        match config.strategy {
            RoutingStrategy::VisibilityGraph => {
                Self::Graph(<VisibilityGraph as SpatialIndex>::build(map, config))
            }
            RoutingStrategy::Grid => Self::Grid(<OccupancyGrid as SpatialIndex>::build(map, config)),
        }
    }

    fn nearest_node(&self, p: Point) -> Option<Point> {
        match self {
            Self::Graph(graph) => SpatialIndex::nearest_node(graph, p),
            Self::Grid(grid) => SpatialIndex::nearest_node(grid, p),
        }
    }

    fn shortest_path(&self, from: Point, to: Point) -> Vec<Point> {
        match self {
            Self::Graph(graph) => SpatialIndex::shortest_path(graph, from, to),
            Self::Grid(grid) => SpatialIndex::shortest_path(grid, from, to),
        }
    }
}
