//! Arena-allocated 2D KD-tree over point indices.
//!
//! Nodes hold a `PointIndex`, never a coordinate; positions are read from a
//! [`PointSource`] at query time. Each node at depth `d` splits on axis
//! `d mod 2`, and that rule is shared by incremental insertion and bulk
//! construction:
//! - `less` subtree: `point[axis] < separator[axis]`
//! - `greater` subtree: `point[axis] >= separator[axis]`
//!
//! Removal of a leaf detaches it. Removal of an internal node leaves a
//! tombstone that still routes traversal but is never reported; `build`
//! discards all tombstones.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::trace;

use crate::error::{GraphError, Result};
use crate::geometry::{Axis, Vec2};
use crate::graph::PointIndex;
use crate::store::PointSource;

/// Arena slot of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn slot(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct KdNode {
    /// The separator point.
    point: PointIndex,
    depth: u32,
    parent: Option<NodeId>,
    less: Option<NodeId>,
    greater: Option<NodeId>,
    /// Tombstone flag: still routes traversal, never a result.
    removed: bool,
}

impl KdNode {
    fn new(point: PointIndex, depth: u32, parent: Option<NodeId>) -> Self {
        Self {
            point,
            depth,
            parent,
            less: None,
            greater: None,
            removed: false,
        }
    }

    #[inline]
    fn axis(&self) -> Axis {
        Axis::for_depth(self.depth)
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.less.is_none() && self.greater.is_none()
    }
}

/// How `KdTree::remove` disposed of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The node was a leaf and has been unlinked; its index is free.
    Detached,
    /// The node had children and is now a tombstone until the next build.
    Tombstoned,
}

/// Max-heap entry for k-nearest search, ordered by (distance, index).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance_sq: f64,
    index: PointIndex,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 2D KD-tree keyed by point index.
#[derive(Debug, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Detached arena slots available for reuse.
    free: Vec<NodeId>,
    root: Option<NodeId>,
    /// Node of every live (non-tombstoned) index.
    lookup: HashMap<PointIndex, NodeId>,
    tombstones: usize,
}

impl KdTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree with pre-allocated node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            lookup: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert `index` by descending from the root. Ties on the splitting axis
    /// go to `greater`. Inserting an index that is already present does nothing.
    pub fn insert<S: PointSource>(&mut self, points: &S, index: PointIndex) -> Result<()> {
        let point = points
            .position(index)
            .ok_or(GraphError::PointNotFound(index))?;
        if self.lookup.contains_key(&index) {
            return Ok(());
        }

        let Some(mut current) = self.root else {
            let id = self.alloc(KdNode::new(index, 0, None));
            self.root = Some(id);
            self.lookup.insert(index, id);
            return Ok(());
        };

        loop {
            let node = self.nodes[current.slot()];
            let separator = points
                .position(node.point)
                .ok_or(GraphError::PointNotFound(node.point))?;
            let axis = node.axis();
            let goes_less = point.along(axis) < separator.along(axis);
            let next = if goes_less { node.less } else { node.greater };

            match next {
                Some(child) => current = child,
                None => {
                    let id = self.alloc(KdNode::new(index, node.depth + 1, Some(current)));
                    let parent = &mut self.nodes[current.slot()];
                    if goes_less {
                        parent.less = Some(id);
                    } else {
                        parent.greater = Some(id);
                    }
                    self.lookup.insert(index, id);
                    return Ok(());
                }
            }
        }
    }

    /// Replace the whole tree with a balanced one over `indices`.
    ///
    /// Each level sorts its range on the level's axis and takes the median as
    /// separator. The median is moved down to the first entry sharing its
    /// coordinate so the `less` side stays strictly less. Indices without a
    /// position in `points` are skipped.
    pub fn build<S: PointSource>(&mut self, points: &S, indices: &[PointIndex]) {
        self.clear();
        let mut entries: Vec<(PointIndex, Vec2)> = indices
            .iter()
            .filter_map(|&index| points.position(index).map(|p| (index, p)))
            .collect();
        self.nodes.reserve(entries.len());
        self.root = self.build_range(&mut entries, 0, None);
        trace!(
            "[KdTree] built {} nodes, depth {}",
            self.nodes.len(),
            self.depth()
        );
    }

    fn build_range(
        &mut self,
        entries: &mut [(PointIndex, Vec2)],
        depth: u32,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        if entries.is_empty() {
            return None;
        }

        let axis = Axis::for_depth(depth);
        entries.sort_by(|a, b| a.1.along(axis).total_cmp(&b.1.along(axis)));

        let mut median = entries.len() / 2;
        let split = entries[median].1.along(axis);
        while median > 0 && entries[median - 1].1.along(axis) == split {
            median -= 1;
        }

        let index = entries[median].0;
        let id = self.alloc(KdNode::new(index, depth, parent));
        self.lookup.insert(index, id);

        let (lower, upper) = entries.split_at_mut(median);
        let less = self.build_range(lower, depth + 1, Some(id));
        let greater = self.build_range(&mut upper[1..], depth + 1, Some(id));

        let node = &mut self.nodes[id.slot()];
        node.less = less;
        node.greater = greater;
        Some(id)
    }

    /// Remove `index` from the tree.
    ///
    /// Returns None if the index is not in the tree.
    pub fn remove(&mut self, index: PointIndex) -> Option<Removal> {
        let id = self.lookup.remove(&index)?;
        if self.nodes[id.slot()].is_leaf() {
            self.detach(id);
            Some(Removal::Detached)
        } else {
            self.nodes[id.slot()].removed = true;
            self.tombstones += 1;
            Some(Removal::Tombstoned)
        }
    }

    fn detach(&mut self, id: NodeId) {
        match self.nodes[id.slot()].parent {
            None => self.root = None,
            Some(parent) => {
                let parent = &mut self.nodes[parent.slot()];
                if parent.less == Some(id) {
                    parent.less = None;
                } else if parent.greater == Some(id) {
                    parent.greater = None;
                }
            }
        }
        self.free.push(id);
    }

    fn alloc(&mut self, node: KdNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.slot()] = node;
            id
        } else {
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(node);
            id
        }
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.lookup.clear();
        self.tombstones = 0;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Closest live index to `query` with its squared distance.
    ///
    /// Equal distances resolve to the lower index. None when the tree holds
    /// no live points.
    pub fn nearest_neighbor<S: PointSource>(
        &self,
        points: &S,
        query: Vec2,
    ) -> Option<(PointIndex, f64)> {
        let mut best: Option<Candidate> = None;
        let mut stack: Vec<(NodeId, f64)> = self.root.map(|r| (r, 0.0)).into_iter().collect();

        while let Some((id, gap_sq)) = stack.pop() {
            if best.is_some_and(|b| gap_sq > b.distance_sq) {
                continue;
            }
            let node = self.nodes[id.slot()];
            let Some(separator) = points.position(node.point) else {
                continue;
            };

            if !node.removed {
                let candidate = Candidate {
                    distance_sq: separator.distance_squared(query),
                    index: node.point,
                };
                if best.is_none_or(|b| candidate < b) {
                    best = Some(candidate);
                }
            }

            let axis = node.axis();
            let diff = query.along(axis) - separator.along(axis);
            let (near, far) = if diff < 0.0 {
                (node.less, node.greater)
            } else {
                (node.greater, node.less)
            };
            // Far side pushed first so the near side is explored first
            if let Some(far) = far {
                stack.push((far, diff * diff));
            }
            if let Some(near) = near {
                stack.push((near, gap_sq));
            }
        }

        best.map(|b| (b.index, b.distance_sq))
    }

    /// Every live index within `radius` of `query`, with its distance.
    ///
    /// Order is unspecified; each index appears once.
    pub fn radius_search<S: PointSource>(
        &self,
        points: &S,
        query: Vec2,
        radius: f64,
    ) -> Vec<(PointIndex, f64)> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let node = self.nodes[id.slot()];
            let Some(separator) = points.position(node.point) else {
                continue;
            };

            if !node.removed {
                let distance = separator.distance(query);
                if distance <= radius {
                    found.push((node.point, distance));
                }
            }

            let axis = node.axis();
            let q = query.along(axis);
            let split = separator.along(axis);
            if let Some(less) = node.less {
                if q - radius < split {
                    stack.push(less);
                }
            }
            if let Some(greater) = node.greater {
                if q + radius >= split {
                    stack.push(greater);
                }
            }
        }

        found
    }

    /// The `k` closest live indices with squared distances, closest first.
    ///
    /// `k` is clamped to the live population; `k == 0` yields nothing.
    /// Equal distances are ordered by index.
    pub fn k_nearest<S: PointSource>(
        &self,
        points: &S,
        query: Vec2,
        k: usize,
    ) -> Vec<(PointIndex, f64)> {
        let k = k.min(self.len());
        if k == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        let mut stack: Vec<(NodeId, f64)> = self.root.map(|r| (r, 0.0)).into_iter().collect();

        while let Some((id, gap_sq)) = stack.pop() {
            if heap.len() == k && heap.peek().is_some_and(|worst| gap_sq > worst.distance_sq) {
                continue;
            }
            let node = self.nodes[id.slot()];
            let Some(separator) = points.position(node.point) else {
                continue;
            };

            if !node.removed {
                let candidate = Candidate {
                    distance_sq: separator.distance_squared(query),
                    index: node.point,
                };
                if heap.len() < k {
                    heap.push(candidate);
                } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                    heap.pop();
                    heap.push(candidate);
                }
            }

            let axis = node.axis();
            let diff = query.along(axis) - separator.along(axis);
            let (near, far) = if diff < 0.0 {
                (node.less, node.greater)
            } else {
                (node.greater, node.less)
            };
            if let Some(far) = far {
                stack.push((far, diff * diff));
            }
            if let Some(near) = near {
                stack.push((near, gap_sq));
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.index, c.distance_sq))
            .collect()
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of live (non-tombstoned) indices.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether the tree holds no live indices.
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Number of nodes linked into the tree, tombstones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of tombstoned nodes.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Whether `index` is a live entry of the tree.
    pub fn contains(&self, index: PointIndex) -> bool {
        self.lookup.contains_key(&index)
    }

    /// Height of the tree (0 when empty).
    pub fn depth(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, level)) = stack.pop() {
            height = height.max(level);
            let node = &self.nodes[id.slot()];
            stack.extend(node.less.map(|c| (c, level + 1)));
            stack.extend(node.greater.map(|c| (c, level + 1)));
        }
        height
    }

    /// Check the partition invariant over every node.
    ///
    /// Walks the tree carrying the half-open box `[min, max)` each subtree
    /// must lie in, and also checks that each node's depth is its parent's
    /// depth plus one.
    pub fn satisfies_partition<S: PointSource>(&self, points: &S) -> bool {
        let Some(root) = self.root else {
            return true;
        };
        if self.nodes[root.slot()].depth != 0 {
            return false;
        }

        let unbounded = ([f64::NEG_INFINITY; 2], [f64::INFINITY; 2]);
        let mut stack = vec![(root, unbounded)];
        while let Some((id, (min, max))) = stack.pop() {
            let node = self.nodes[id.slot()];
            let Some(p) = points.position(node.point) else {
                return false;
            };
            for axis in [Axis::X, Axis::Y] {
                let v = p.along(axis);
                if v < min[axis.index()] || v >= max[axis.index()] {
                    return false;
                }
            }

            let a = node.axis().index();
            let split = p.along(node.axis());
            for (child, is_less) in [(node.less, true), (node.greater, false)] {
                let Some(child) = child else {
                    continue;
                };
                if self.nodes[child.slot()].depth != node.depth + 1 {
                    return false;
                }
                let (mut lo, mut hi) = (min, max);
                if is_less {
                    hi[a] = hi[a].min(split);
                } else {
                    lo[a] = lo[a].max(split);
                }
                stack.push((child, (lo, hi)));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PointStore;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstar::RTree;

    fn store_with(points: &[(f64, f64)]) -> PointStore {
        let mut store = PointStore::new();
        for &(x, y) in points {
            store.push(Vec2::new(x, y));
        }
        store
    }

    fn random_store(rng: &mut StdRng, n: usize) -> PointStore {
        let mut store = PointStore::new();
        for _ in 0..n {
            store.push(Vec2::new(
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
            ));
        }
        store
    }

    fn incremental(store: &PointStore) -> KdTree {
        let mut tree = KdTree::new();
        for index in store.live_indices() {
            tree.insert(store, index).unwrap();
        }
        tree
    }

    fn brute_nearest(store: &PointStore, q: Vec2) -> f64 {
        store
            .iter()
            .map(|(_, p)| p.distance_squared(q))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_insert_and_nearest() {
        let store = store_with(&[(0.0, 0.0), (10.0, 10.0), (5.0, 5.0)]);
        let tree = incremental(&store);

        assert_eq!(tree.nearest_neighbor(&store, Vec2::new(0.0, 0.0)).map(|n| n.0), Some(PointIndex(0)));
        assert_eq!(tree.nearest_neighbor(&store, Vec2::new(6.0, 6.0)).map(|n| n.0), Some(PointIndex(2)));
        assert_eq!(tree.nearest_neighbor(&store, Vec2::new(11.0, 11.0)).map(|n| n.0), Some(PointIndex(1)));
    }

    #[test]
    fn test_empty_tree_has_no_nearest() {
        let store = PointStore::new();
        let tree = KdTree::new();
        assert_eq!(tree.nearest_neighbor(&store, Vec2::ZERO), None);
        assert!(tree.radius_search(&store, Vec2::ZERO, 10.0).is_empty());
        assert!(tree.k_nearest(&store, Vec2::ZERO, 3).is_empty());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_insert_unknown_index_fails() {
        let store = PointStore::new();
        let mut tree = KdTree::new();
        assert_eq!(
            tree.insert(&store, PointIndex(3)),
            Err(GraphError::PointNotFound(PointIndex(3)))
        );
    }

    #[test]
    fn test_ties_go_greater() {
        let store = store_with(&[(1.0, 0.0), (1.0, 5.0), (1.0, -5.0)]);
        let tree = incremental(&store);
        let root = tree.nodes[tree.root.unwrap().slot()];
        assert!(root.less.is_none());
        assert!(root.greater.is_some());
        assert!(tree.satisfies_partition(&store));
    }

    #[test]
    fn test_exact_coordinate_has_zero_distance() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut store = random_store(&mut rng, 200);
        let mut tree = incremental(&store);

        let p = Vec2::new(12.5, -7.25);
        let index = store.push(p);
        tree.insert(&store, index).unwrap();

        let (found, distance_sq) = tree.nearest_neighbor(&store, p).unwrap();
        assert_eq!(found, index);
        assert_eq!(distance_sq, 0.0);
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [1, 2, 5, 31, 200, 1000] {
            let store = random_store(&mut rng, n);
            let tree = incremental(&store);
            for _ in 0..50 {
                let q = Vec2::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0));
                let (_, d) = tree.nearest_neighbor(&store, q).unwrap();
                assert_eq!(d, brute_nearest(&store, q), "n={n} q={q:?}");
            }
        }
    }

    #[test]
    fn test_nearest_matches_rtree() {
        let mut rng = StdRng::seed_from_u64(21);
        let store = random_store(&mut rng, 500);
        let mut tree = KdTree::new();
        tree.build(&store, &store.live_indices());
        let rtree = RTree::bulk_load(store.iter().map(|(_, p)| [p.x, p.y]).collect());

        for _ in 0..100 {
            let q = Vec2::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0));
            let (index, d) = tree.nearest_neighbor(&store, q).unwrap();
            let expected = rtree.nearest_neighbor(&[q.x, q.y]).unwrap();
            assert_eq!(store.point(index), Some(Vec2::new(expected[0], expected[1])));
            assert_eq!(d, Vec2::new(expected[0], expected[1]).distance_squared(q));
        }
    }

    #[test]
    fn test_radius_search_is_exact_set() {
        let mut rng = StdRng::seed_from_u64(3);
        let store = random_store(&mut rng, 400);
        let tree = incremental(&store);

        for _ in 0..50 {
            let q = Vec2::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
            let r = rng.random_range(0.0..20.0);
            let mut got: Vec<_> = tree.radius_search(&store, q, r).into_iter().map(|(i, _)| i).collect();
            got.sort();
            let expected: Vec<_> = store
                .iter()
                .filter(|(_, p)| p.distance(q) <= r)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_radius_search_includes_boundary() {
        let store = store_with(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0), (10.0, 0.0)]);
        let tree = incremental(&store);
        let mut found: Vec<_> = tree
            .radius_search(&store, Vec2::ZERO, 5.0)
            .into_iter()
            .map(|(i, _)| i.0)
            .collect();
        found.sort();
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_nearest_ascending_and_matches_rtree() {
        let mut rng = StdRng::seed_from_u64(5);
        let store = random_store(&mut rng, 300);
        let tree = incremental(&store);
        let rtree = RTree::bulk_load(store.iter().map(|(_, p)| [p.x, p.y]).collect());

        for k in [1, 4, 17] {
            let q = Vec2::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
            let got = tree.k_nearest(&store, q, k);
            assert_eq!(got.len(), k);
            assert!(got.windows(2).all(|w| w[0].1 <= w[1].1));

            let expected: Vec<f64> = rtree
                .nearest_neighbor_iter(&[q.x, q.y])
                .take(k)
                .map(|p| Vec2::new(p[0], p[1]).distance_squared(q))
                .collect();
            let distances: Vec<f64> = got.iter().map(|&(_, d)| d).collect();
            assert_eq!(distances, expected);
        }
    }

    #[test]
    fn test_k_nearest_clamps_and_zero() {
        let store = store_with(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let tree = incremental(&store);
        let all = tree.k_nearest(&store, Vec2::ZERO, 10);
        assert_eq!(
            all.iter().map(|(i, _)| i.0).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(tree.k_nearest(&store, Vec2::ZERO, 0).is_empty());
    }

    #[test]
    fn test_build_is_balanced() {
        let points: Vec<(f64, f64)> = (0..1023).map(|i| (i as f64, i as f64)).collect();
        let store = store_with(&points);

        // Sorted incremental inserts degenerate into a chain
        let chain = incremental(&store);
        assert_eq!(chain.depth(), 1023);

        let mut balanced = KdTree::new();
        balanced.build(&store, &store.live_indices());
        assert_eq!(balanced.depth(), 10);
        assert_eq!(balanced.len(), 1023);
        assert!(balanced.satisfies_partition(&store));
    }

    #[test]
    fn test_build_with_duplicate_coordinates_keeps_invariant() {
        let store = store_with(&[
            (1.0, 1.0),
            (1.0, 2.0),
            (1.0, 3.0),
            (0.0, 1.0),
            (2.0, 1.0),
            (1.0, 1.0),
        ]);
        let mut tree = KdTree::new();
        tree.build(&store, &store.live_indices());
        assert_eq!(tree.len(), 6);
        assert!(tree.satisfies_partition(&store));
    }

    #[test]
    fn test_invariant_after_mixed_insert_and_rebuild() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut store = random_store(&mut rng, 100);
        let mut tree = KdTree::new();
        tree.build(&store, &store.live_indices());

        for round in 0..5 {
            for _ in 0..50 {
                let index = store.push(Vec2::new(
                    rng.random_range(-50.0f64..50.0).round(),
                    rng.random_range(-50.0f64..50.0).round(),
                ));
                tree.insert(&store, index).unwrap();
            }
            assert!(tree.satisfies_partition(&store), "round {round} after inserts");
            tree.build(&store, &store.live_indices());
            assert!(tree.satisfies_partition(&store), "round {round} after build");
        }
        assert_eq!(tree.len(), 350);
    }

    #[test]
    fn test_remove_leaf_detaches() {
        let store = store_with(&[(0.0, 0.0), (5.0, 0.0)]);
        let mut tree = incremental(&store);
        assert_eq!(tree.remove(PointIndex(1)), Some(Removal::Detached));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.tombstones(), 0);
        assert_eq!(tree.remove(PointIndex(1)), None);
    }

    #[test]
    fn test_remove_internal_tombstones() {
        let mut store = store_with(&[(0.0, 0.0), (5.0, 0.0), (-5.0, 0.0)]);
        let mut tree = incremental(&store);

        assert_eq!(tree.remove(PointIndex(0)), Some(Removal::Tombstoned));
        store.retire(PointIndex(0));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.tombstones(), 1);

        // The tombstone is never reported, even at its own coordinate
        let (nearest, _) = tree.nearest_neighbor(&store, Vec2::ZERO).unwrap();
        assert_ne!(nearest, PointIndex(0));
        assert!(tree
            .radius_search(&store, Vec2::ZERO, 100.0)
            .iter()
            .all(|&(i, _)| i != PointIndex(0)));
        assert!(tree.satisfies_partition(&store));

        tree.build(&store, &store.live_indices());
        assert_eq!(tree.tombstones(), 0);
        assert_eq!(tree.node_count(), 2);
        assert!(tree.satisfies_partition(&store));
    }

    #[test]
    fn test_random_removals_never_resurface() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut store = random_store(&mut rng, 300);
        let mut tree = incremental(&store);

        let mut removed = Vec::new();
        for _ in 0..100 {
            let live = store.live_indices();
            let victim = live[rng.random_range(0..live.len())];
            assert!(tree.remove(victim).is_some());
            store.retire(victim);
            removed.push(victim);
        }
        assert_eq!(tree.len(), 200);

        for _ in 0..50 {
            let q = Vec2::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
            let (index, d) = tree.nearest_neighbor(&store, q).unwrap();
            assert!(!removed.contains(&index));
            assert_eq!(d, brute_nearest(&store, q));
            assert!(tree
                .radius_search(&store, q, 15.0)
                .iter()
                .all(|(i, _)| !removed.contains(i)));
        }

        tree.build(&store, &store.live_indices());
        assert!(tree.satisfies_partition(&store));
        assert_eq!(tree.len(), 200);
    }

    #[test]
    fn test_all_tombstones_has_no_nearest() {
        let store = store_with(&[(0.0, 0.0), (1.0, 0.0)]);
        let mut tree = incremental(&store);
        assert_eq!(tree.remove(PointIndex(0)), Some(Removal::Tombstoned));
        assert_eq!(tree.remove(PointIndex(1)), Some(Removal::Detached));
        assert!(tree.is_empty());
        assert_eq!(tree.nearest_neighbor(&store, Vec2::ZERO), None);
    }

    #[test]
    fn test_clear() {
        let store = store_with(&[(0.0, 0.0), (1.0, 1.0)]);
        let mut tree = incremental(&store);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.nearest_neighbor(&store, Vec2::ZERO), None);
    }
}
