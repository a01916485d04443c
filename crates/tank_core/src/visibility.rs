//! Visibility graph over padded obstacle corners, with Dijkstra search.
//!
//! Nodes sit at the corners of every blocking obstacle grown by the
//! clearance padding, keeping only corners on the map. Two nodes are joined
//! when the segment between them crosses no raw obstacle edge. Building is
//! O(N² · M) for N nodes and M edges, so the graph is built once per
//! obstacle layout and shared read-only afterwards.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::{Point, Segment, EPSILON};
use crate::map::Map;

/// Undirected, Euclidean-weighted visibility graph.
#[derive(Debug, Clone, Default)]
pub struct VisibilityGraph {
    nodes: Vec<Point>,
    /// Dense symmetric weight matrix, row-major. `0.0` means no edge.
    weights: Vec<f64>,
}

impl VisibilityGraph {
    /// Build the graph for a map's blocking obstacles.
    #[must_use]
    pub fn build(map: &Map, padding: f64) -> Self {
        let mut nodes: Vec<Point> = Vec::new();
        for obstacle in map.blocking_obstacles() {
            for corner in obstacle.corners(padding) {
                if map.contains(corner) && !nodes.iter().any(|n| n.approx_eq(corner)) {
                    nodes.push(corner);
                }
            }
        }

        let walls = map.blocking_edges();
        let mut graph = Self::with_nodes(nodes);
        let n = graph.nodes.len();
        for a in 0..n {
            for b in (a + 1)..n {
                let sight = Segment::new(graph.nodes[a], graph.nodes[b]);
                if !walls.iter().any(|wall| sight.intersects(wall)) {
                    graph.connect(a, b, sight.length());
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            walls = walls.len(),
            "Built visibility graph"
        );
        graph
    }

    /// Build a graph from explicit nodes and weighted edges.
    ///
    /// Edges referencing unknown node ids are ignored.
    #[must_use]
    pub fn from_edges(
        nodes: Vec<Point>,
        edges: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Self {
        let mut graph = Self::with_nodes(nodes);
        for (a, b, weight) in edges {
            if a < graph.nodes.len() && b < graph.nodes.len() {
                graph.connect(a, b, weight);
            }
        }
        graph
    }

    fn with_nodes(nodes: Vec<Point>) -> Self {
        let n = nodes.len();
        Self {
            nodes,
            weights: vec![0.0; n * n],
        }
    }

    fn connect(&mut self, a: usize, b: usize, weight: f64) {
        let n = self.nodes.len();
        self.weights[a * n + b] = weight;
        self.weights[b * n + a] = weight;
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of traversable undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let n = self.nodes.len();
        (0..n)
            .flat_map(|a| ((a + 1)..n).map(move |b| (a, b)))
            .filter(|&(a, b)| self.is_connected(a, b))
            .count()
    }

    /// All node positions, indexed by node id.
    #[must_use]
    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    /// Position of a node.
    #[must_use]
    pub fn node(&self, id: usize) -> Option<Point> {
        self.nodes.get(id).copied()
    }

    /// Stored weight between two nodes, `0.0` when unconnected.
    #[must_use]
    pub fn weight(&self, a: usize, b: usize) -> f64 {
        let n = self.nodes.len();
        if a < n && b < n {
            self.weights[a * n + b]
        } else {
            0.0
        }
    }

    /// True when the pair carries a real edge (weight above epsilon).
    #[must_use]
    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        self.weight(a, b) > EPSILON
    }

    /// Id of the node closest to `p`. Ties go to the lower id.
    #[must_use]
    pub fn nearest_node(&self, p: Point) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| p.distance_squared(**a).total_cmp(&p.distance_squared(**b)))
            .map(|(id, _)| id)
    }

    /// Shortest node-id path from `source` to `dest`, both included.
    ///
    /// Empty when either id is unknown or `dest` cannot be reached.
    #[must_use]
    pub fn dijkstra(&self, source: usize, dest: usize) -> Vec<usize> {
        let n = self.nodes.len();
        if source >= n || dest >= n {
            return Vec::new();
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut queue = BinaryHeap::new();

        dist[source] = 0.0;
        queue.push(QueueEntry {
            cost: 0.0,
            node: source,
        });

        while let Some(QueueEntry { cost, node }) = queue.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;
            if node == dest {
                break;
            }

            for next in 0..n {
                if settled[next] || !self.is_connected(node, next) {
                    continue;
                }
                let candidate = cost + self.weights[node * n + next];
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(node);
                    queue.push(QueueEntry {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        if !settled[dest] {
            return Vec::new();
        }

        let mut path = vec![dest];
        let mut current = dest;
        while let Some(p) = prev[current] {
            path.push(p);
            current = p;
        }
        path.reverse();
        path
    }

    /// Route between the nodes nearest `from` and `to`, as node positions.
    #[must_use]
    pub fn shortest_path(&self, from: Point, to: Point) -> Vec<Point> {
        let (Some(source), Some(dest)) = (self.nearest_node(from), self.nearest_node(to)) else {
            return Vec::new();
        };
        self.dijkstra(source, dest)
            .into_iter()
            .map(|id| self.nodes[id])
            .collect()
    }
}

/// Dijkstra priority queue entry, ordered as a min-heap on cost.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.cost.total_cmp(&self.cost) {
            Ordering::Equal => other.node.cmp(&self.node),
            ord => ord,
        }
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
