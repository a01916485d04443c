//! Route reproducibility testing.
//!
//! Routing must be a pure function of map, positions and configuration:
//! the commander routes tanks on a thread pool and expects the same orders
//! whichever thread ran them. Points hash by their bit patterns, so any
//! difference at all between runs is reported.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use tank_core::geometry::Point;

/// Result of repeated route computations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRunResult {
    /// Route hash from each run.
    pub hashes: Vec<u64>,
}

impl RouteRunResult {
    /// Check if every run produced the identical route.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert every run matched.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different routes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Routing is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash a route by the exact bits of its waypoints.
#[must_use]
pub fn hash_route(route: &[Point]) -> u64 {
    let mut hasher = DefaultHasher::new();
    route.len().hash(&mut hasher);
    for p in route {
        p.x.to_bits().hash(&mut hasher);
        p.y.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Compute a route `runs` times sequentially.
pub fn verify_route_determinism<F>(runs: usize, plan: F) -> RouteRunResult
where
    F: Fn() -> Vec<Point>,
{
    let hashes = (0..runs).map(|_| hash_route(&plan())).collect();
    RouteRunResult { hashes }
}

/// Compute a route on `runs` threads at once.
///
/// # Panics
///
/// Panics if a planning thread panics.
pub fn verify_parallel_route_determinism<F>(runs: usize, plan: F) -> RouteRunResult
where
    F: Fn() -> Vec<Point> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| s.spawn(|| hash_route(&plan())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("planning thread panicked"))
            .collect()
    });
    RouteRunResult { hashes }
}
