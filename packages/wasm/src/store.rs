//! PointStore - the authoritative point sequence.
//!
//! Every other structure names points by `PointIndex` and reads coordinates
//! through the [`PointSource`] trait, so the store is the only place a
//! coordinate lives.
//!
//! Slots go through three states:
//! - **live**: a current point;
//! - **retired**: removed, but its coordinates are still the separator of a
//!   spatial-index tombstone, so the slot must not be reused yet;
//! - **vacant**: free, handed out again by the next push (lowest index first).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::geometry::Vec2;
use crate::graph::PointIndex;

/// Read access to point coordinates by index.
pub trait PointSource {
    /// Coordinates of a live point.
    fn point(&self, index: PointIndex) -> Option<Vec2>;

    /// Coordinates still held for `index`, including retired points.
    fn position(&self, index: PointIndex) -> Option<Vec2> {
        self.point(index)
    }

    /// All live indices in ascending order.
    fn live_indices(&self) -> Vec<PointIndex>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Live(Vec2),
    Retired(Vec2),
    Vacant,
}

/// Slot-indexed point storage with index reuse.
#[derive(Debug, Default)]
pub struct PointStore {
    slots: Vec<Slot>,
    /// Vacant slots, smallest index on top.
    vacant: BinaryHeap<Reverse<PointIndex>>,
    /// Retired slots waiting for the next tree rebuild.
    retired: Vec<PointIndex>,
    live: usize,
}

impl PointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Store a point and return its index.
    pub fn push(&mut self, point: Vec2) -> PointIndex {
        self.live += 1;
        if let Some(Reverse(index)) = self.vacant.pop() {
            self.slots[index.slot()] = Slot::Live(point);
            return index;
        }
        let index = PointIndex(self.slots.len() as u32);
        self.slots.push(Slot::Live(point));
        index
    }

    /// Remove a live point, keeping its coordinates as a retired slot.
    ///
    /// Returns the removed point, or None if `index` was not live.
    pub fn retire(&mut self, index: PointIndex) -> Option<Vec2> {
        let slot = self.slots.get_mut(index.slot())?;
        let Slot::Live(point) = *slot else {
            return None;
        };
        *slot = Slot::Retired(point);
        self.retired.push(index);
        self.live -= 1;
        Some(point)
    }

    /// Make a retired slot vacant at once.
    ///
    /// Used when no tombstone references the index.
    pub fn release(&mut self, index: PointIndex) {
        if let Some(pos) = self.retired.iter().rposition(|&r| r == index) {
            self.retired.swap_remove(pos);
            self.slots[index.slot()] = Slot::Vacant;
            self.vacant.push(Reverse(index));
        }
    }

    /// Make every retired slot vacant. Called after the spatial index has
    /// dropped its tombstones.
    pub fn recycle_retired(&mut self) {
        for index in self.retired.drain(..) {
            self.slots[index.slot()] = Slot::Vacant;
            self.vacant.push(Reverse(index));
        }
    }

    /// Translate every stored coordinate, retired ones included.
    pub fn translate(&mut self, offset: Vec2) {
        for slot in &mut self.slots {
            match slot {
                Slot::Live(p) | Slot::Retired(p) => *p = *p + offset,
                Slot::Vacant => {}
            }
        }
    }

    /// Whether `index` names a live point.
    pub fn contains(&self, index: PointIndex) -> bool {
        matches!(self.slots.get(index.slot()), Some(Slot::Live(_)))
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no live points remain.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Upper bound on indices handed out so far (max index + 1).
    pub fn bound(&self) -> usize {
        self.slots.len()
    }

    /// Number of retired slots not yet reusable.
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Iterate live points with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (PointIndex, Vec2)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match *slot {
            Slot::Live(p) => Some((PointIndex(i as u32), p)),
            _ => None,
        })
    }

    /// Drop every point and reset index assignment.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
        self.retired.clear();
        self.live = 0;
    }
}

impl PointSource for PointStore {
    fn point(&self, index: PointIndex) -> Option<Vec2> {
        match self.slots.get(index.slot()) {
            Some(Slot::Live(p)) => Some(*p),
            _ => None,
        }
    }

    fn position(&self, index: PointIndex) -> Option<Vec2> {
        match self.slots.get(index.slot()) {
            Some(Slot::Live(p)) | Some(Slot::Retired(p)) => Some(*p),
            _ => None,
        }
    }

    fn live_indices(&self) -> Vec<PointIndex> {
        self.iter().map(|(index, _)| index).collect()
    }
}
