//! Minimal 2D vector math used by the spatial index and path planner.

pub mod vec2;

pub use vec2::{Axis, Vec2};
