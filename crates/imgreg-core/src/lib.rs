pub mod filter;
pub mod image;
pub mod interpolation;
pub mod spatial;
pub mod transform;

pub use image::Image;
pub use spatial::{Direction, Point, Spacing, Vector};
