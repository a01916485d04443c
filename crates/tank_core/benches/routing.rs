//! Routing benchmarks for tank_core.
//!
//! Run with: `cargo bench -p tank_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tank_core::prelude::*;
use tank_test_utils::fixtures;

/// Index construction for the scattered-block arena.
pub fn build_benchmark(c: &mut Criterion) {
    let map = fixtures::arena_map();
    c.bench_function("visibility_graph_build", |b| {
        b.iter(|| VisibilityGraph::build(black_box(&map), 5.0));
    });
    c.bench_function("occupancy_grid_build", |b| {
        b.iter(|| OccupancyGrid::from_map(black_box(&map), 1.0));
    });
}

/// Corner-to-corner searches on prebuilt indexes.
pub fn search_benchmark(c: &mut Criterion) {
    let map = fixtures::arena_map();
    let graph = VisibilityGraph::build(&map, 5.0);
    let grid = OccupancyGrid::from_map(&map, 1.0);
    let from = Point::new(1.0, 1.0);
    let to = Point::new(198.0, 198.0);

    c.bench_function("visibility_graph_dijkstra", |b| {
        b.iter(|| graph.shortest_path(black_box(from), black_box(to)));
    });
    c.bench_function("occupancy_grid_astar", |b| {
        b.iter(|| grid.shortest_path(black_box(from), black_box(to)));
    });
}

criterion_group!(benches, build_benchmark, search_benchmark);
criterion_main!(benches);
