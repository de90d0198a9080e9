//! Euclid Graph - WASM Module
//!
//! This module provides a 2D point set indexed two ways: a KD-tree for
//! proximity queries and a distance-weighted proximity graph for A* path
//! planning. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen; native Rust callers use [`graph::EuclideanGraph`]
//! directly.
//!
//! # Architecture
//!
//! - `geometry`: 2D vector math
//! - `store`: the authoritative point sequence and the `PointSource` trait
//! - `spatial`: arena KD-tree for nearest, k-nearest and radius queries
//! - `graph`: proximity graph (petgraph StableGraph), A* and the facade
//! - `error`: the crate error type

use std::collections::HashSet;

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod geometry;
pub mod graph;
pub mod spatial;
pub mod store;

use geometry::Vec2;
use graph::{EuclideanGraph, GraphConfig, PointIndex};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Pack points as `[x0, y0, x1, y1, ...]`.
fn interleave(points: impl IntoIterator<Item = Vec2>) -> Float64Array {
    let flat: Vec<f64> = points.into_iter().flat_map(|p| [p.x, p.y]).collect();
    Float64Array::from(&flat[..])
}

/// Unpack `[x0, y0, x1, y1, ...]` into points.
fn pair_up(positions: &[f64]) -> error::Result<Vec<Vec2>> {
    if positions.len() % 2 != 0 {
        return Err(error::GraphError::OddCoordinateCount(positions.len()));
    }
    Ok(positions
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect())
}

/// Main entry point for the Euclidean graph.
///
/// This struct wraps the internal EuclideanGraph and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct EuclideanGraphWasm {
    graph: EuclideanGraph,
}

#[wasm_bindgen]
impl EuclideanGraphWasm {
    /// Create a new empty graph.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: EuclideanGraph::new(),
        }
    }

    /// Create a graph from a config object.
    ///
    /// Accepts an object with optional `rebuild_tombstone_ratio` and
    /// `max_expansions` fields. Missing fields take their defaults.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<EuclideanGraphWasm, JsError> {
        let config: GraphConfig = if config.is_undefined() || config.is_null() {
            GraphConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
        };
        Ok(Self {
            graph: EuclideanGraph::with_config(config),
        })
    }

    /// Create a graph with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `point_capacity` - Expected number of points
    /// * `edge_capacity` - Expected number of proximity edges
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(point_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: EuclideanGraph::with_capacity(point_capacity, edge_capacity),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert a point, connecting it to every point within `radius`.
    /// Returns the new point's index.
    pub fn insert(&mut self, x: f64, y: f64, radius: f64) -> Result<u32, JsError> {
        Ok(self.graph.insert(Vec2::new(x, y), radius)?.raw())
    }

    /// Insert points from an interleaved `[x0, y0, x1, y1, ...]` array.
    #[wasm_bindgen(js_name = insertMany)]
    pub fn insert_many(&mut self, positions: &[f64], radius: f64) -> Result<Vec<u32>, JsError> {
        let points = pair_up(positions)?;
        let indices = self.graph.insert_many(&points, radius)?;
        Ok(indices.into_iter().map(PointIndex::raw).collect())
    }

    /// Remove a point by index. Returns its coordinates as `[x, y]`.
    #[wasm_bindgen(js_name = removeIndex)]
    pub fn remove_index(&mut self, index: u32) -> Result<Float64Array, JsError> {
        let point = self.graph.remove_index(PointIndex(index))?;
        Ok(interleave([point]))
    }

    /// Remove the point nearest to `(x, y)` if it lies within `epsilon`.
    /// Returns the removed index.
    #[wasm_bindgen(js_name = removePoint)]
    pub fn remove_point(&mut self, x: f64, y: f64, epsilon: f64) -> Result<u32, JsError> {
        Ok(self.graph.remove_point(Vec2::new(x, y), epsilon)?.raw())
    }

    /// Translate every point by `(dx, dy)`.
    #[wasm_bindgen(js_name = adjustPoints)]
    pub fn adjust_points(&mut self, dx: f64, dy: f64) -> Result<(), JsError> {
        self.graph.adjust_points(Vec2::new(dx, dy))?;
        Ok(())
    }

    /// Rebuild the spatial index balanced.
    pub fn rebuild(&mut self) {
        self.graph.rebuild();
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.graph.clear();
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Closest stored point to `(x, y)` as `[x, y]`.
    #[wasm_bindgen(js_name = nearestNeighbor)]
    pub fn nearest_neighbor(&self, x: f64, y: f64) -> Result<Float64Array, JsError> {
        let nearest = self.graph.nearest_neighbor(Vec2::new(x, y))?;
        Ok(interleave([nearest.point]))
    }

    /// Index of the closest stored point to `(x, y)`.
    #[wasm_bindgen(js_name = nearestIndex)]
    pub fn nearest_index(&self, x: f64, y: f64) -> Result<u32, JsError> {
        Ok(self.graph.nearest_neighbor(Vec2::new(x, y))?.index.raw())
    }

    /// The `k` closest points, closest first, interleaved.
    #[wasm_bindgen(js_name = kNearest)]
    pub fn k_nearest(&self, x: f64, y: f64, k: usize) -> Result<Float64Array, JsError> {
        let found = self.graph.k_nearest(Vec2::new(x, y), k)?;
        Ok(interleave(found.into_iter().map(|n| n.point)))
    }

    /// Every point within `radius` of `(x, y)`, interleaved.
    #[wasm_bindgen(js_name = radiusSearch)]
    pub fn radius_search(&self, x: f64, y: f64, radius: f64) -> Result<Float64Array, JsError> {
        let found = self.graph.radius_search(Vec2::new(x, y), radius)?;
        Ok(interleave(found.into_iter().map(|n| n.point)))
    }

    // =========================================================================
    // Path Queries
    // =========================================================================

    /// Shortest path between the points nearest to the two coordinates.
    /// Returns interleaved path points; empty when there is no path.
    #[wasm_bindgen(js_name = aStar)]
    pub fn a_star(&self, start_x: f64, start_y: f64, goal_x: f64, goal_y: f64) -> Float64Array {
        let result = self
            .graph
            .a_star(Vec2::new(start_x, start_y), Vec2::new(goal_x, goal_y));
        interleave(result.points)
    }

    /// Shortest path that avoids the points at `excluded` indices.
    #[wasm_bindgen(js_name = aStarExclusive)]
    pub fn a_star_exclusive(
        &self,
        start_x: f64,
        start_y: f64,
        goal_x: f64,
        goal_y: f64,
        excluded: &[u32],
    ) -> Float64Array {
        let excluded: HashSet<PointIndex> = excluded.iter().copied().map(PointIndex).collect();
        let result = self.graph.a_star_exclusive(
            Vec2::new(start_x, start_y),
            Vec2::new(goal_x, goal_y),
            &excluded,
        );
        interleave(result.points)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of stored points.
    pub fn size(&self) -> usize {
        self.graph.size()
    }

    /// Coordinates of a point as `[x, y]`, or undefined if absent.
    #[wasm_bindgen(js_name = getPoint)]
    pub fn get_point(&self, index: u32) -> Option<Float64Array> {
        self.graph
            .get_point(PointIndex(index))
            .map(|p| interleave([p]))
    }

    /// Number of proximity edges.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for EuclideanGraphWasm {
    fn default() -> Self {
        Self::new()
    }
}
