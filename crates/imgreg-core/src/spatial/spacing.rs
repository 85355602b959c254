//! Physical pixel spacing.

use serde::{Deserialize, Serialize};

/// Physical distance between adjacent pixels along each axis (x, y).
///
/// Invariant: both components are strictly positive. This is checked at
/// construction so downstream index/point conversions never divide by
/// zero or flip orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing([f64; 2]);

impl Spacing {
    /// Create a new spacing from per-axis values `[x, y]`.
    ///
    /// # Panics
    /// Panics if any component is not strictly positive.
    pub fn new(spacing: [f64; 2]) -> Self {
        assert!(
            spacing.iter().all(|s| *s > 0.0),
            "spacing components must be strictly positive, got {spacing:?}"
        );
        Self(spacing)
    }

    /// Unit spacing (1.0 along both axes).
    pub fn unit() -> Self {
        Self([1.0, 1.0])
    }
}

impl std::ops::Index<usize> for Spacing {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
