//! Spatial indexing for O(log n) proximity queries.
//!
//! This module provides a KD-tree over point indices supporting nearest,
//! k-nearest and radius queries, incremental insertion, balanced rebuild and
//! tombstone removal.

mod kdtree;

pub use kdtree::{KdTree, Removal};
