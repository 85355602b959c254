//! Mean squared intensity difference metric.

use imgreg_core::interpolation::{Interpolator, LinearInterpolator};
use imgreg_core::spatial::Point;
use imgreg_core::transform::Transform;
use imgreg_core::Image;
use nalgebra::DVector;

use crate::error::MetricError;

use super::trait_::{Metric, MetricValue};

/// Mean squared error metric (minimized).
///
/// `MSE = (1/N) * sum((Moving(T(x)) - Fixed(x))^2)` over the fixed
/// image grid. Fixed-grid points whose mapped location falls outside
/// the moving image's support are skipped entirely: they contribute
/// neither to the cost nor to the gradient, and they do not count
/// toward `N`. If every point is skipped the evaluation fails with
/// [`MetricError::EmptySampleSet`].
#[derive(Debug, Clone)]
pub struct MeanSquaresMetric {
    interpolator: LinearInterpolator,
    stride: usize,
}

impl MeanSquaresMetric {
    /// Create a new mean-squares metric evaluating the full fixed grid.
    pub fn new() -> Self {
        Self {
            interpolator: LinearInterpolator::new(),
            stride: 1,
        }
    }

    /// Evaluate only every `stride`-th pixel along each axis.
    ///
    /// # Panics
    /// Panics if `stride` is zero.
    pub fn with_stride(mut self, stride: usize) -> Self {
        assert!(stride > 0, "stride must be at least 1");
        self.stride = stride;
        self
    }
}

impl Default for MeanSquaresMetric {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for MeanSquaresMetric {
    fn evaluate(
        &mut self,
        fixed: &Image,
        moving: &Image,
        transform: &dyn Transform,
    ) -> Result<MetricValue, MetricError> {
        let [rows, cols] = fixed.shape();
        let mut sum = 0.0;
        let mut gradient = DVector::zeros(transform.num_parameters());
        let mut count = 0usize;

        for y in (0..rows).step_by(self.stride) {
            for x in (0..cols).step_by(self.stride) {
                let fixed_value = fixed.pixel(x, y);
                let fixed_point =
                    fixed.continuous_index_to_physical_point(&Point::new(x as f64, y as f64));
                let moving_point = transform.transform_point(&fixed_point);
                let moving_index = moving.physical_point_to_continuous_index(&moving_point);

                let Some((moving_value, moving_gradient)) = self
                    .interpolator
                    .interpolate_with_gradient(moving, &moving_index)
                else {
                    continue;
                };

                let diff = moving_value - fixed_value;
                sum += diff * diff;

                // d/dp (M(T(x)) - F(x))^2 = 2 * diff * J^T * grad M
                let jacobian = transform.jacobian(&fixed_point);
                gradient += (jacobian.transpose() * moving_gradient) * (2.0 * diff);
                count += 1;
            }
        }

        if count == 0 {
            return Err(MetricError::EmptySampleSet);
        }

        Ok(MetricValue {
            value: sum / count as f64,
            gradient: gradient / count as f64,
        })
    }

    fn name(&self) -> &'static str {
        "MeanSquares"
    }
}
