//! Interpolator trait.

use crate::image::Image;
use crate::spatial::{Point, Vector};

/// Interpolator for sampling an image at continuous indices.
///
/// The support of an image is the axis-aligned box `[0, cols-1] x
/// [0, rows-1]` in index space. Queries outside the support return
/// `None`; the caller decides whether that means "skip the sample"
/// (metrics) or "substitute a default value" (resampling).
///
/// Implementations are pure: no side effects, O(1) per call.
pub trait Interpolator {
    /// Sample the image at a continuous index, or `None` outside the
    /// support.
    fn interpolate(&self, image: &Image, index: &Point) -> Option<f64>;

    /// Sample the image and its spatial gradient at a continuous index.
    ///
    /// The gradient is with respect to *physical* coordinates (the
    /// index-space slope mapped through spacing and direction), which is
    /// what metric derivatives chain against.
    fn interpolate_with_gradient(&self, image: &Image, index: &Point) -> Option<(f64, Vector)>;

    /// Whether a continuous index lies inside the image support.
    fn is_inside(&self, image: &Image, index: &Point) -> bool {
        if image.is_empty() {
            return false;
        }
        let [rows, cols] = image.shape();
        index.x >= 0.0
            && index.x <= (cols - 1) as f64
            && index.y >= 0.0
            && index.y <= (rows - 1) as f64
    }
}
