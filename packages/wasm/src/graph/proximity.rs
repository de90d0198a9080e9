//! ProximityGraph - undirected distance-weighted graph over point indices.
//!
//! Topology lives in petgraph's StableGraph so vertex and edge indices stay
//! valid across removals. Vertices carry their `PointIndex`; edges carry the
//! Euclidean distance between their endpoints.

use std::collections::HashMap;

use log::trace;
use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::node::PointIndex;
use crate::error::{GraphError, Result};
use crate::spatial::KdTree;
use crate::store::PointSource;

/// Distance-weighted proximity graph.
#[derive(Debug, Default)]
pub struct ProximityGraph {
    /// Vertices store their PointIndex, edges store the distance.
    graph: StableGraph<PointIndex, f64, Undirected>,

    /// Map from PointIndex to petgraph NodeIndex
    vertices: HashMap<PointIndex, NodeIndex>,
}

impl ProximityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(vertex_capacity, edge_capacity),
            vertices: HashMap::with_capacity(vertex_capacity),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Add an isolated vertex. Returns false if it already existed.
    pub fn insert_vertex(&mut self, index: PointIndex) -> bool {
        if self.vertices.contains_key(&index) {
            return false;
        }
        let node = self.graph.add_node(index);
        self.vertices.insert(index, node);
        true
    }

    /// Connect `a` and `b` with an edge weighted by their current distance.
    ///
    /// Returns None when the pair is already connected or `a == b`. Both
    /// endpoints must be vertices and live points.
    pub fn insert_edge<S: PointSource>(
        &mut self,
        points: &S,
        a: PointIndex,
        b: PointIndex,
    ) -> Result<Option<EdgeIndex>> {
        let na = *self.vertices.get(&a).ok_or(GraphError::PointNotFound(a))?;
        let nb = *self.vertices.get(&b).ok_or(GraphError::PointNotFound(b))?;
        if a == b || self.graph.find_edge(na, nb).is_some() {
            return Ok(None);
        }
        let pa = points.point(a).ok_or(GraphError::PointNotFound(a))?;
        let pb = points.point(b).ok_or(GraphError::PointNotFound(b))?;
        Ok(Some(self.graph.add_edge(na, nb, pa.distance(pb))))
    }

    /// Add `index` as a vertex and connect it to every other point the tree
    /// reports within `radius`.
    ///
    /// Only edges touching `index` are created. A radius of zero or less adds
    /// the vertex without edges. Returns the number of edges created.
    pub fn insert<S: PointSource>(
        &mut self,
        points: &S,
        tree: &KdTree,
        index: PointIndex,
        radius: f64,
    ) -> Result<usize> {
        let point = points.point(index).ok_or(GraphError::PointNotFound(index))?;
        self.insert_vertex(index);
        if radius <= 0.0 {
            return Ok(0);
        }

        let mut created = 0;
        for (neighbor, _) in tree.radius_search(points, point, radius) {
            if neighbor == index || !self.vertices.contains_key(&neighbor) {
                continue;
            }
            if self.insert_edge(points, index, neighbor)?.is_some() {
                created += 1;
            }
        }
        trace!("[ProximityGraph] {index} connected to {created} neighbors within {radius}");
        Ok(created)
    }

    /// Remove a vertex and all its incident edges.
    pub fn remove(&mut self, index: PointIndex) -> bool {
        match self.vertices.remove(&index) {
            Some(node) => {
                self.graph.remove_node(node);
                true
            }
            None => false,
        }
    }

    /// Recompute every edge weight from current point positions.
    pub fn recompute_weights<S: PointSource>(&mut self, points: &S) {
        let updates: Vec<(EdgeIndex, f64)> = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let a = points.point(self.graph[edge.source()])?;
                let b = points.point(self.graph[edge.target()])?;
                Some((edge.id(), a.distance(b)))
            })
            .collect();
        for (edge, weight) in updates {
            if let Some(w) = self.graph.edge_weight_mut(edge) {
                *w = weight;
            }
        }
    }

    /// Remove all vertices and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.vertices.clear();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `index` is a vertex.
    pub fn contains(&self, index: PointIndex) -> bool {
        self.vertices.contains_key(&index)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adjacent vertices of `index` with edge weights, ordered by index.
    pub fn neighbors(&self, index: PointIndex) -> Vec<(PointIndex, f64)> {
        let Some(&node) = self.vertices.get(&index) else {
            return Vec::new();
        };
        let mut adjacent: Vec<(PointIndex, f64)> = self
            .graph
            .edges(node)
            .map(|edge| {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                (self.graph[other], *edge.weight())
            })
            .collect();
        adjacent.sort_by_key(|&(neighbor, _)| neighbor);
        adjacent
    }

    /// Weight of the edge joining `a` and `b`, if any.
    pub fn edge_weight(&self, a: PointIndex, b: PointIndex) -> Option<f64> {
        let na = *self.vertices.get(&a)?;
        let nb = *self.vertices.get(&b)?;
        let edge = self.graph.find_edge(na, nb)?;
        self.graph.edge_weight(edge).copied()
    }
}
