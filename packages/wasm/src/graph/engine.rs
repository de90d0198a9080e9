//! EuclideanGraph - point set with spatial queries and path planning.
//!
//! The EuclideanGraph owns the point store and the two indexes built over
//! it: a KD-tree for proximity queries and a proximity graph for A*. Every
//! mutation goes through this type, which updates all three in the same call
//! so the indexes can never disagree about which points exist.

use std::collections::HashSet;

use log::{info, trace};
use serde::{Deserialize, Serialize};

use super::astar::{PathFailure, PathPlanner, PathResult};
use super::node::PointIndex;
use super::proximity::ProximityGraph;
use crate::error::{GraphError, Result};
use crate::geometry::Vec2;
use crate::spatial::{KdTree, Removal};
use crate::store::{PointSource, PointStore};

/// Configuration for the Euclidean graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Rebuild the KD-tree once tombstones exceed this fraction of its
    /// nodes (default: 0.25). Zero or less disables automatic rebuilds.
    pub rebuild_tombstone_ratio: f64,
    /// Maximum vertices A* may expand per query (default: unbounded).
    pub max_expansions: Option<usize>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            rebuild_tombstone_ratio: 0.25,
            max_expansions: None,
        }
    }
}

/// A point returned by a proximity query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point.
    pub index: PointIndex,
    /// Coordinates of the point.
    pub point: Vec2,
    /// Euclidean distance to the query.
    pub distance: f64,
}

/// The point set and its two indexes.
///
/// This struct manages:
/// - The authoritative point store
/// - A KD-tree for nearest, k-nearest and radius queries
/// - A proximity graph for shortest-path queries
pub struct EuclideanGraph {
    /// Point coordinates by index
    store: PointStore,

    /// Spatial index over live indices
    tree: KdTree,

    /// Distance-weighted graph over live indices
    graph: ProximityGraph,

    config: GraphConfig,
}

impl EuclideanGraph {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            store: PointStore::new(),
            tree: KdTree::new(),
            graph: ProximityGraph::new(),
            config,
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(point_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            store: PointStore::with_capacity(point_capacity),
            tree: KdTree::with_capacity(point_capacity),
            graph: ProximityGraph::with_capacity(point_capacity, edge_capacity),
            config: GraphConfig::default(),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert a point and connect it to every point within `radius`.
    ///
    /// A radius of zero adds the point as an isolated vertex.
    pub fn insert(&mut self, point: Vec2, radius: f64) -> Result<PointIndex> {
        check_point(point)?;
        check_radius(radius)?;

        let index = self.store.push(point);
        self.tree.insert(&self.store, index)?;
        let edges = self.graph.insert(&self.store, &self.tree, index, radius)?;
        trace!("[EuclideanGraph] inserted {index} at ({}, {}) with {edges} edges", point.x, point.y);
        Ok(index)
    }

    /// Insert many points at once with a shared connection radius.
    ///
    /// The KD-tree is rebuilt balanced over the whole point set before the
    /// new vertices are connected. Nothing is inserted if any point or the
    /// radius is invalid.
    pub fn insert_many(&mut self, points: &[Vec2], radius: f64) -> Result<Vec<PointIndex>> {
        check_radius(radius)?;
        for &point in points {
            check_point(point)?;
        }

        let indices: Vec<PointIndex> = points.iter().map(|&p| self.store.push(p)).collect();
        self.rebuild();
        for &index in &indices {
            self.graph.insert(&self.store, &self.tree, index, radius)?;
        }
        Ok(indices)
    }

    /// Remove the point at `index` from the store, the KD-tree and the graph.
    pub fn remove_index(&mut self, index: PointIndex) -> Result<Vec2> {
        let point = self
            .store
            .retire(index)
            .ok_or(GraphError::PointNotFound(index))?;
        if self.tree.remove(index) == Some(Removal::Detached) {
            self.store.release(index);
        }
        self.graph.remove(index);
        trace!("[EuclideanGraph] removed {index}");

        if self.needs_rebuild() {
            self.rebuild();
        }
        Ok(point)
    }

    /// Remove the stored point nearest to `point`, provided it lies within
    /// `epsilon`.
    pub fn remove_point(&mut self, point: Vec2, epsilon: f64) -> Result<PointIndex> {
        check_point(point)?;
        if epsilon.is_nan() || epsilon < 0.0 {
            return Err(GraphError::InvalidEpsilon(epsilon));
        }
        let nearest = self.nearest_neighbor(point)?;
        if nearest.distance > epsilon {
            return Err(GraphError::NoPointNear {
                x: point.x,
                y: point.y,
                epsilon,
            });
        }
        self.remove_index(nearest.index)?;
        Ok(nearest.index)
    }

    /// Translate every point by `offset`.
    ///
    /// Edge weights are recomputed; the KD-tree ordering is unaffected by a
    /// uniform shift. A non-finite offset is rejected before any point moves.
    pub fn adjust_points(&mut self, offset: Vec2) -> Result<()> {
        check_point(offset)?;
        self.store.translate(offset);
        self.graph.recompute_weights(&self.store);
        Ok(())
    }

    /// Rebuild the KD-tree balanced over the live points.
    ///
    /// Drops all tombstones, after which their indices become reusable. The
    /// proximity graph is left untouched.
    pub fn rebuild(&mut self) {
        let tombstones = self.tree.tombstones();
        self.tree.build(&self.store, &self.store.live_indices());
        self.store.recycle_retired();
        info!(
            "[EuclideanGraph] rebuilt spatial index: {} points, {} tombstones dropped, depth {}",
            self.tree.len(),
            tombstones,
            self.tree.depth()
        );
    }

    fn needs_rebuild(&self) -> bool {
        let ratio = self.config.rebuild_tombstone_ratio;
        ratio > 0.0 && self.tree.tombstones() as f64 > ratio * self.tree.node_count() as f64
    }

    /// Remove all points, resetting index assignment.
    pub fn clear(&mut self) {
        self.store.clear();
        self.tree.clear();
        self.graph.clear();
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// The stored point closest to `query`.
    pub fn nearest_neighbor(&self, query: Vec2) -> Result<Neighbor> {
        check_point(query)?;
        let (index, distance_sq) = self
            .tree
            .nearest_neighbor(&self.store, query)
            .ok_or(GraphError::Empty)?;
        self.neighbor(index, distance_sq.sqrt())
    }

    /// The `k` stored points closest to `query`, closest first.
    ///
    /// `k` larger than `size()` returns every point.
    pub fn k_nearest(&self, query: Vec2, k: usize) -> Result<Vec<Neighbor>> {
        check_point(query)?;
        if k == 0 {
            return Err(GraphError::ZeroNeighbors);
        }
        self.tree
            .k_nearest(&self.store, query, k)
            .into_iter()
            .map(|(index, distance_sq)| self.neighbor(index, distance_sq.sqrt()))
            .collect()
    }

    /// Every stored point within `radius` of `query`, in no particular order.
    pub fn radius_search(&self, query: Vec2, radius: f64) -> Result<Vec<Neighbor>> {
        check_point(query)?;
        check_radius(radius)?;
        self.tree
            .radius_search(&self.store, query, radius)
            .into_iter()
            .map(|(index, distance)| self.neighbor(index, distance))
            .collect()
    }

    fn neighbor(&self, index: PointIndex, distance: f64) -> Result<Neighbor> {
        let point = self
            .store
            .point(index)
            .ok_or(GraphError::PointNotFound(index))?;
        Ok(Neighbor {
            index,
            point,
            distance,
        })
    }

    // =========================================================================
    // Path Queries
    // =========================================================================

    /// Shortest path between the vertices nearest to `start` and `goal`.
    ///
    /// Both coordinates are snapped to their nearest stored point before
    /// planning. An empty graph or an unreachable goal yields an empty path.
    pub fn a_star(&self, start: Vec2, goal: Vec2) -> PathResult {
        self.a_star_exclusive(start, goal, &HashSet::new())
    }

    /// Like [`a_star`](Self::a_star), but the path never passes through a
    /// vertex in `excluded`.
    ///
    /// A non-finite coordinate snaps to nothing and yields `NoVertex`.
    pub fn a_star_exclusive(
        &self,
        start: Vec2,
        goal: Vec2,
        excluded: &HashSet<PointIndex>,
    ) -> PathResult {
        if !start.is_finite() || !goal.is_finite() {
            return PathResult::failed(PathFailure::NoVertex, 0);
        }
        let snapped = (
            self.tree.nearest_neighbor(&self.store, start),
            self.tree.nearest_neighbor(&self.store, goal),
        );
        let (Some((start_index, _)), Some((goal_index, _))) = snapped else {
            return PathResult::failed(PathFailure::NoVertex, 0);
        };

        PathPlanner::new(&self.graph, &self.store)
            .with_max_expansions(self.config.max_expansions)
            .find_path_excluding(start_index, goal_index, excluded)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of live points.
    pub fn size(&self) -> usize {
        self.store.len()
    }

    /// Whether no points are stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Coordinates of the point at `index`.
    pub fn get_point(&self, index: PointIndex) -> Option<Vec2> {
        self.store.point(index)
    }

    /// Live points with their indices, in index order.
    pub fn points(&self) -> impl Iterator<Item = (PointIndex, Vec2)> + '_ {
        self.store.iter()
    }

    /// Number of proximity edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Graph neighbors of `index` with edge weights.
    pub fn neighbors(&self, index: PointIndex) -> Vec<(PointIndex, f64)> {
        self.graph.neighbors(index)
    }

    /// The KD-tree.
    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    /// The proximity graph.
    pub fn graph(&self) -> &ProximityGraph {
        &self.graph
    }

    /// The point store.
    pub fn store(&self) -> &PointStore {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }
}

impl Default for EuclideanGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn check_point(point: Vec2) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(GraphError::NonFinitePoint {
            x: point.x,
            y: point.y,
        })
    }
}

fn check_radius(radius: f64) -> Result<()> {
    if radius.is_nan() || radius < 0.0 {
        Err(GraphError::InvalidRadius(radius))
    } else {
        Ok(())
    }
}
