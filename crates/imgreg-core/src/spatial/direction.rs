//! Image orientation matrix.

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// Orientation of the image axes as a 2x2 matrix.
///
/// Identity for all images in scope, but conversions go through the full
/// matrix so a rotated acquisition only requires a different direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction(Matrix2<f64>);

impl Direction {
    /// Create a direction from an orientation matrix.
    pub fn new(matrix: Matrix2<f64>) -> Self {
        Self(matrix)
    }

    /// The identity orientation.
    pub fn identity() -> Self {
        Self(Matrix2::identity())
    }

    /// Get the orientation matrix.
    pub fn matrix(&self) -> &Matrix2<f64> {
        &self.0
    }

    /// Inverse of the orientation matrix.
    ///
    /// # Panics
    /// Panics if the matrix is singular; a valid image orientation is
    /// always invertible.
    pub fn inverse(&self) -> Matrix2<f64> {
        self.0
            .try_inverse()
            .expect("direction matrix must be invertible")
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Index<(usize, usize)> for Direction {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}
