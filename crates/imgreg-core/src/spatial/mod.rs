//! Spatial primitives for 2-D physical coordinate handling.
//!
//! Points and vectors are nalgebra types; `Spacing` and `Direction` are
//! thin newtypes carrying the invariants the image metadata relies on.

mod direction;
mod spacing;

pub use direction::Direction;
pub use spacing::Spacing;

/// A position in 2-D physical space (x, y), in physical units (e.g. mm).
///
/// The same type is used for continuous pixel indices, where `x` is the
/// column coordinate and `y` the row coordinate.
pub type Point = nalgebra::Point2<f64>;

/// A displacement in 2-D physical space.
pub type Vector = nalgebra::Vector2<f64>;
