//! A* shortest paths over the proximity graph.
//!
//! g is the accumulated edge weight and h the straight-line distance to the
//! goal. Edge weights are themselves Euclidean distances, so h never
//! overestimates and is consistent: a vertex is final once it is closed.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, trace};

use super::node::PointIndex;
use super::proximity::ProximityGraph;
use crate::geometry::Vec2;
use crate::store::PointSource;

/// Reason a path query came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFailure {
    /// Start or goal is not a vertex of the graph.
    NoVertex,
    /// Start or goal is in the exclusion set.
    Excluded,
    /// The open set ran dry before reaching the goal.
    NoPath,
    /// The expansion budget ran out.
    BudgetExhausted,
}

/// Result of a path query.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Vertices from start to goal (empty if no path found)
    pub indices: Vec<PointIndex>,
    /// Points from start to goal
    pub points: Vec<Vec2>,
    /// Sum of edge weights along the path
    pub cost: f64,
    /// Number of vertices expanded during search
    pub expanded: usize,
    /// Reason for failure (if any)
    pub failure: Option<PathFailure>,
}

impl PathResult {
    pub(crate) fn failed(reason: PathFailure, expanded: usize) -> Self {
        Self {
            indices: Vec::new(),
            points: Vec::new(),
            cost: f64::INFINITY,
            expanded,
            failure: Some(reason),
        }
    }

    /// Whether a path was found.
    pub fn found(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points on the path.
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Open-set entry. The heap pops the lowest f, then lowest h, then lowest
/// vertex index.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    h: f64,
    g: f64,
    vertex: PointIndex,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other
            .f
            .total_cmp(&self.f)
            .then(other.h.total_cmp(&self.h))
            .then(other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* planner over a [`ProximityGraph`].
pub struct PathPlanner<'a, S> {
    graph: &'a ProximityGraph,
    points: &'a S,
    max_expansions: Option<usize>,
}

impl<'a, S: PointSource> PathPlanner<'a, S> {
    /// Create a planner with no expansion budget.
    pub fn new(graph: &'a ProximityGraph, points: &'a S) -> Self {
        Self {
            graph,
            points,
            max_expansions: None,
        }
    }

    /// Stop searching after `budget` expansions.
    pub fn with_max_expansions(mut self, budget: Option<usize>) -> Self {
        self.max_expansions = budget;
        self
    }

    /// Shortest path from `start` to `goal`.
    pub fn find_path(&self, start: PointIndex, goal: PointIndex) -> PathResult {
        self.search(start, goal, &HashSet::new())
    }

    /// Shortest path that never enters a vertex of `excluded`.
    pub fn find_path_excluding(
        &self,
        start: PointIndex,
        goal: PointIndex,
        excluded: &HashSet<PointIndex>,
    ) -> PathResult {
        self.search(start, goal, excluded)
    }

    fn search(
        &self,
        start: PointIndex,
        goal: PointIndex,
        excluded: &HashSet<PointIndex>,
    ) -> PathResult {
        trace!("[AStar] search: start={start} goal={goal} excluded={}", excluded.len());

        let endpoints = (self.points.point(start), self.points.point(goal));
        let (Some(start_point), Some(goal_point)) = endpoints else {
            debug!("[AStar] FAILED: NoVertex - start or goal is not a live point");
            return PathResult::failed(PathFailure::NoVertex, 0);
        };
        if !self.graph.contains(start) || !self.graph.contains(goal) {
            debug!("[AStar] FAILED: NoVertex - start or goal missing from graph");
            return PathResult::failed(PathFailure::NoVertex, 0);
        }
        if excluded.contains(&start) || excluded.contains(&goal) {
            debug!("[AStar] FAILED: Excluded - start or goal is excluded");
            return PathResult::failed(PathFailure::Excluded, 0);
        }

        let mut open = BinaryHeap::new();
        let mut closed: HashSet<PointIndex> = HashSet::new();
        let mut came_from: HashMap<PointIndex, PointIndex> = HashMap::new();
        let mut g_scores: HashMap<PointIndex, f64> = HashMap::new();

        let h_start = start_point.distance(goal_point);
        open.push(OpenEntry {
            f: h_start,
            h: h_start,
            g: 0.0,
            vertex: start,
        });
        g_scores.insert(start, 0.0);

        let mut expanded = 0;

        while let Some(current) = open.pop() {
            // Stale entry for an already finalized vertex
            if closed.contains(&current.vertex) {
                continue;
            }

            if current.vertex == goal {
                return self.reconstruct_path(&came_from, start, goal, current.g, expanded);
            }

            if self.max_expansions.is_some_and(|budget| expanded >= budget) {
                debug!("[AStar] FAILED: BudgetExhausted ({expanded} vertices)");
                return PathResult::failed(PathFailure::BudgetExhausted, expanded);
            }

            expanded += 1;
            closed.insert(current.vertex);

            for (neighbor, weight) in self.graph.neighbors(current.vertex) {
                if closed.contains(&neighbor) || excluded.contains(&neighbor) {
                    continue;
                }
                let Some(neighbor_point) = self.points.point(neighbor) else {
                    continue;
                };

                let tentative_g = current.g + weight;
                let known_g = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < known_g {
                    came_from.insert(neighbor, current.vertex);
                    g_scores.insert(neighbor, tentative_g);

                    let h = neighbor_point.distance(goal_point);
                    open.push(OpenEntry {
                        f: tentative_g + h,
                        h,
                        g: tentative_g,
                        vertex: neighbor,
                    });
                }
            }
        }

        debug!("[AStar] FAILED: NoPath after expanding {expanded} vertices");
        PathResult::failed(PathFailure::NoPath, expanded)
    }

    fn reconstruct_path(
        &self,
        came_from: &HashMap<PointIndex, PointIndex>,
        start: PointIndex,
        goal: PointIndex,
        cost: f64,
        expanded: usize,
    ) -> PathResult {
        let mut indices = vec![goal];
        let mut current = goal;
        while current != start {
            match came_from.get(&current) {
                Some(&prev) => {
                    indices.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        indices.reverse();

        let points = indices
            .iter()
            .filter_map(|&index| self.points.point(index))
            .collect();

        trace!(
            "[AStar] found path of {} vertices, cost {cost:.3}, expanded {expanded}",
            indices.len()
        );
        PathResult {
            indices,
            points,
            cost,
            expanded,
            failure: None,
        }
    }
}
