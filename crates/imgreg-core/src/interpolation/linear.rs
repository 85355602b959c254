//! Bilinear interpolation.

use crate::image::Image;
use crate::spatial::{Point, Vector};

use super::trait_::Interpolator;

/// Bilinear interpolator.
///
/// Weights the four nearest grid samples. At grid-aligned indices the
/// weights collapse to a single sample, so the result agrees exactly
/// with nearest-neighbor interpolation there.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Create a new bilinear interpolator.
    pub fn new() -> Self {
        Self
    }

    /// Corner samples and fractional weights for a continuous index.
    ///
    /// Returns `(v00, v10, v01, v11, wx, wy)` where `v10` is the sample
    /// one step along x. Indices on the far edge reuse the edge sample
    /// with zero fractional weight.
    fn corners(&self, image: &Image, index: &Point) -> (f64, f64, f64, f64, f64, f64) {
        let [rows, cols] = image.shape();
        let x0 = (index.x.floor() as usize).min(cols - 1);
        let y0 = (index.y.floor() as usize).min(rows - 1);
        let x1 = (x0 + 1).min(cols - 1);
        let y1 = (y0 + 1).min(rows - 1);
        let wx = index.x - x0 as f64;
        let wy = index.y - y0 as f64;

        let data = image.data();
        (
            data[[y0, x0]],
            data[[y0, x1]],
            data[[y1, x0]],
            data[[y1, x1]],
            wx,
            wy,
        )
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, image: &Image, index: &Point) -> Option<f64> {
        if !self.is_inside(image, index) {
            return None;
        }
        let (v00, v10, v01, v11, wx, wy) = self.corners(image, index);

        let c0 = v00 * (1.0 - wx) + v10 * wx;
        let c1 = v01 * (1.0 - wx) + v11 * wx;
        Some(c0 * (1.0 - wy) + c1 * wy)
    }

    fn interpolate_with_gradient(&self, image: &Image, index: &Point) -> Option<(f64, Vector)> {
        if !self.is_inside(image, index) {
            return None;
        }
        let (v00, v10, v01, v11, wx, wy) = self.corners(image, index);

        let c0 = v00 * (1.0 - wx) + v10 * wx;
        let c1 = v01 * (1.0 - wx) + v11 * wx;
        let value = c0 * (1.0 - wy) + c1 * wy;

        // Index-space slope of the bilinear patch.
        let dx = (v10 - v00) * (1.0 - wy) + (v11 - v01) * wy;
        let dy = (v01 - v00) * (1.0 - wx) + (v11 - v10) * wx;

        // Map to physical coordinates: grad_p = D^-T * (grad_i / spacing).
        let spacing = image.spacing();
        let scaled = Vector::new(dx / spacing[0], dy / spacing[1]);
        let gradient = image.direction().inverse().transpose() * scaled;

        Some((value, gradient))
    }
}
