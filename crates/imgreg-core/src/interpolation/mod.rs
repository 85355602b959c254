//! Intensity interpolation at continuous pixel indices.

mod linear;
mod nearest;
mod trait_;

pub use linear::LinearInterpolator;
pub use nearest::NearestNeighborInterpolator;
pub use trait_::Interpolator;
