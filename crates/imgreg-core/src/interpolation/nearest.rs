//! Nearest-neighbor interpolation.

use crate::image::Image;
use crate::spatial::{Point, Vector};

use super::trait_::Interpolator;

/// Nearest-neighbor interpolator.
///
/// Rounds the continuous index to the closest grid sample. Useful for
/// label-like data and for the 8-bit export path where bilinear blending
/// is undesirable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborInterpolator;

impl NearestNeighborInterpolator {
    /// Create a new nearest-neighbor interpolator.
    pub fn new() -> Self {
        Self
    }
}

impl Interpolator for NearestNeighborInterpolator {
    fn interpolate(&self, image: &Image, index: &Point) -> Option<f64> {
        if !self.is_inside(image, index) {
            return None;
        }
        let [rows, cols] = image.shape();
        let x = (index.x.round() as usize).min(cols - 1);
        let y = (index.y.round() as usize).min(rows - 1);
        Some(image.data()[[y, x]])
    }

    fn interpolate_with_gradient(&self, image: &Image, index: &Point) -> Option<(f64, Vector)> {
        // Piecewise constant, so the gradient is zero almost everywhere.
        self.interpolate(image, index).map(|v| (v, Vector::zeros()))
    }
}
