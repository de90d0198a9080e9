//! Graph data structures and operations.
//!
//! This module provides the proximity graph built on petgraph's StableGraph
//! for stable vertex/edge indices, the A* planner that searches it, and the
//! EuclideanGraph facade that keeps the point store, KD-tree and graph in
//! agreement.

mod astar;
mod engine;
mod node;
mod proximity;

pub use astar::{PathFailure, PathPlanner, PathResult};
pub use engine::{EuclideanGraph, GraphConfig, Neighbor};
pub use node::PointIndex;
pub use proximity::ProximityGraph;
