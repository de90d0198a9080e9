//! Point identity shared by every index.
//!
//! A `PointIndex` names one slot of the point store. The spatial index, the
//! proximity graph and the path planner all refer to points through it, so
//! none of them ever hold a reference into another structure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable point identifier.
///
/// Assigned when a point is inserted and valid until that point is removed.
/// A removed index may later be handed out again (see `PointStore`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointIndex(pub u32);

impl PointIndex {
    /// Create a new PointIndex from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Position of this point in slot-indexed buffers.
    #[inline]
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Renders as `Point(n)`. Because indices are reused after removal, the same
/// text can name different points over a graph's lifetime.
impl fmt::Display for PointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", self.0)
    }
}

/// Wraps a raw index from the JS boundary. No liveness check is made; look the
/// index up in the store before trusting it.
impl From<u32> for PointIndex {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PointIndex> for u32 {
    #[inline]
    fn from(id: PointIndex) -> Self {
        id.0
    }
}
