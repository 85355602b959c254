//! Mutual information metric with Parzen-window density estimation.

use imgreg_core::interpolation::{Interpolator, LinearInterpolator};
use imgreg_core::transform::Transform;
use imgreg_core::Image;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::MetricError;

use super::sampling;
use super::trait_::{Metric, MetricValue};

/// Default Parzen kernel standard deviation, tuned for images that
/// have been normalized to zero mean and unit variance.
const DEFAULT_STANDARD_DEVIATION: f64 = 0.4;
/// Default fraction of fixed-image pixels drawn as spatial samples.
const DEFAULT_SAMPLE_FRACTION: f64 = 0.01;
/// Default seed, fixed so regression runs are reproducible.
const DEFAULT_SEED: u64 = 121212;

/// Mutual information metric (maximized).
///
/// Estimates the joint and marginal intensity densities of the fixed
/// and moving images with Gaussian Parzen kernels over a pseudo-random
/// set of spatial samples, and returns
///
/// `MI = E[ log( p(f, m) / (p(f) * p(m)) ) ]`
///
/// together with its analytic gradient with respect to the transform
/// parameters (chain rule through the kernel derivative, the moving
/// image gradient, and the transform jacobian).
///
/// Larger values indicate better alignment, so the optimizer driving
/// this metric must be put in maximize mode explicitly; the metric
/// never negates its value to simulate a minimization convention.
///
/// The sample generator is owned by the metric and seeded at
/// construction; a fresh sample set is drawn for every evaluation.
/// Inputs are expected to be intensity-normalized (mean 0, unit
/// variance) for the default kernel widths to be appropriate.
#[derive(Debug, Clone)]
pub struct MutualInformationMetric {
    interpolator: LinearInterpolator,
    fixed_standard_deviation: f64,
    moving_standard_deviation: f64,
    sample_fraction: f64,
    rng: StdRng,
}

impl MutualInformationMetric {
    /// Create a metric with the default kernel widths (0.4/0.4), sample
    /// fraction (1%), and seed.
    pub fn new() -> Self {
        Self {
            interpolator: LinearInterpolator::new(),
            fixed_standard_deviation: DEFAULT_STANDARD_DEVIATION,
            moving_standard_deviation: DEFAULT_STANDARD_DEVIATION,
            sample_fraction: DEFAULT_SAMPLE_FRACTION,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    /// Set the Parzen kernel standard deviations for the fixed and
    /// moving marginals.
    ///
    /// # Panics
    /// Panics if either deviation is not strictly positive.
    pub fn with_standard_deviations(mut self, fixed: f64, moving: f64) -> Self {
        assert!(
            fixed > 0.0 && moving > 0.0,
            "kernel standard deviations must be strictly positive"
        );
        self.fixed_standard_deviation = fixed;
        self.moving_standard_deviation = moving;
        self
    }

    /// Set the fraction of fixed-image pixels used as spatial samples.
    pub fn with_sample_fraction(mut self, fraction: f64) -> Self {
        self.sample_fraction = fraction;
        self
    }

    /// Reseed the sample generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Number of spatial samples for a fixed image with `pixels`
    /// pixels. Deterministic in the pixel count and the configured
    /// fraction.
    fn sample_count(&self, pixels: usize) -> usize {
        (pixels as f64 * self.sample_fraction) as usize
    }
}

impl Default for MutualInformationMetric {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for MutualInformationMetric {
    fn evaluate(
        &mut self,
        fixed: &Image,
        moving: &Image,
        transform: &dyn Transform,
    ) -> Result<MetricValue, MetricError> {
        let requested = self.sample_count(fixed.len());
        if requested == 0 {
            return Err(MetricError::EmptySampleSet);
        }

        let indices = sampling::draw_sample_indices(fixed.shape(), requested, &mut self.rng);

        // Intensity pairs and moving-value parameter derivatives for the
        // samples that land inside both supports.
        let mut fixed_values = Vec::with_capacity(requested);
        let mut moving_values = Vec::with_capacity(requested);
        let mut moving_derivatives: Vec<DVector<f64>> = Vec::with_capacity(requested);

        for index in &indices {
            let Some(fixed_value) = self.interpolator.interpolate(fixed, index) else {
                continue;
            };
            let fixed_point = fixed.continuous_index_to_physical_point(index);
            let moving_point = transform.transform_point(&fixed_point);
            let moving_index = moving.physical_point_to_continuous_index(&moving_point);
            let Some((moving_value, moving_gradient)) = self
                .interpolator
                .interpolate_with_gradient(moving, &moving_index)
            else {
                continue;
            };

            let jacobian = transform.jacobian(&fixed_point);
            fixed_values.push(fixed_value);
            moving_values.push(moving_value);
            moving_derivatives.push(jacobian.transpose() * moving_gradient);
        }

        let count = fixed_values.len();
        if count == 0 {
            return Err(MetricError::EmptySampleSet);
        }

        let inv_two_fixed_var =
            0.5 / (self.fixed_standard_deviation * self.fixed_standard_deviation);
        let moving_var = self.moving_standard_deviation * self.moving_standard_deviation;
        let inv_two_moving_var = 0.5 / moving_var;

        // Parzen kernel tables over all sample pairs. The Gaussian
        // normalization constants cancel in the density ratio, leaving a
        // single factor of `count`.
        let mut kernel_fixed = vec![0.0; count * count];
        let mut kernel_moving = vec![0.0; count * count];
        for b in 0..count {
            for a in 0..count {
                let df = fixed_values[b] - fixed_values[a];
                let dm = moving_values[b] - moving_values[a];
                kernel_fixed[b * count + a] = (-df * df * inv_two_fixed_var).exp();
                kernel_moving[b * count + a] = (-dm * dm * inv_two_moving_var).exp();
            }
        }

        let mut value = 0.0;
        // Pair coefficients folded into per-sample sums so the gradient
        // accumulation stays O(count) vector operations.
        let mut row_sums = vec![0.0; count];
        let mut column_sums = vec![0.0; count];

        for b in 0..count {
            let mut sum_joint = 0.0;
            let mut sum_fixed = 0.0;
            let mut sum_moving = 0.0;
            for a in 0..count {
                let kf = kernel_fixed[b * count + a];
                let km = kernel_moving[b * count + a];
                sum_joint += kf * km;
                sum_fixed += kf;
                sum_moving += km;
            }
            value += (count as f64 * sum_joint / (sum_fixed * sum_moving)).ln();

            for a in 0..count {
                let kf = kernel_fixed[b * count + a];
                let km = kernel_moving[b * count + a];
                let weight_joint = kf * km / sum_joint;
                let weight_moving = km / sum_moving;
                let intensity_diff = moving_values[b] - moving_values[a];
                // d log p / d m_b contributions of this pair.
                let coefficient =
                    (weight_joint - weight_moving) * (-intensity_diff / moving_var) / count as f64;
                row_sums[b] += coefficient;
                column_sums[a] += coefficient;
            }
        }
        value /= count as f64;

        let mut gradient = DVector::zeros(transform.num_parameters());
        for s in 0..count {
            gradient += &moving_derivatives[s] * (row_sums[s] - column_sums[s]);
        }

        Ok(MetricValue { value, gradient })
    }

    fn name(&self) -> &'static str {
        "MutualInformation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgreg_core::filter::normalize;
    use imgreg_core::spatial::Vector;
    use imgreg_core::transform::TranslationTransform;
    use ndarray::Array2;

    fn blob_image(size: usize, center: (f64, f64), sigma: f64) -> Image {
        let data = Array2::from_shape_fn((size, size), |(y, x)| {
            let dx = x as f64 - center.0;
            let dy = y as f64 - center.1;
            (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
        });
        normalize(&Image::from_data(data))
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let image = blob_image(32, (16.0, 16.0), 6.0);
        let transform = TranslationTransform::identity();

        let mut metric_a = MutualInformationMetric::new().with_sample_fraction(0.1);
        let mut metric_b = MutualInformationMetric::new().with_sample_fraction(0.1);

        let a = metric_a.evaluate(&image, &image, &transform).unwrap();
        let b = metric_b.evaluate(&image, &image, &transform).unwrap();
        assert_eq!(a.value, b.value);
        assert_eq!(a.gradient, b.gradient);
    }

    #[test]
    fn test_aligned_exceeds_misaligned() {
        let fixed = blob_image(64, (32.0, 32.0), 8.0);
        let moving = blob_image(64, (32.0, 32.0), 8.0);

        let mut metric = MutualInformationMetric::new()
            .with_sample_fraction(0.05)
            .with_seed(42);
        let aligned = metric
            .evaluate(&fixed, &moving, &TranslationTransform::identity())
            .unwrap();

        let mut metric = MutualInformationMetric::new()
            .with_sample_fraction(0.05)
            .with_seed(42);
        let misaligned = metric
            .evaluate(
                &fixed,
                &moving,
                &TranslationTransform::new(Vector::new(10.0, 8.0)),
            )
            .unwrap();

        assert!(
            aligned.value > misaligned.value,
            "aligned {} should exceed misaligned {}",
            aligned.value,
            misaligned.value
        );
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let fixed = blob_image(32, (16.0, 16.0), 5.0);
        let moving = blob_image(32, (14.5, 16.5), 5.0);
        let offset = Vector::new(0.3, -0.2);

        let evaluate_at = |params: Vector| {
            // Fresh metric per evaluation: the same seed replays the
            // same sample stream, making the metric a deterministic
            // function of the parameters.
            let mut metric = MutualInformationMetric::new()
                .with_sample_fraction(0.1)
                .with_seed(9);
            metric
                .evaluate(&fixed, &moving, &TranslationTransform::new(params))
                .unwrap()
        };

        let at_offset = evaluate_at(offset);
        let eps = 1e-4;
        for axis in 0..2 {
            let mut step = Vector::zeros();
            step[axis] = eps;
            let plus = evaluate_at(offset + step);
            let minus = evaluate_at(offset - step);
            let numeric = (plus.value - minus.value) / (2.0 * eps);
            let analytic = at_offset.gradient[axis];
            assert!(
                (numeric - analytic).abs() < 1e-2,
                "axis {axis}: numeric {numeric} vs analytic {analytic}"
            );
        }
    }

    #[test]
    fn test_zero_sample_count_fails() {
        // 5x5 image at 1% yields zero samples.
        let image = blob_image(5, (2.0, 2.0), 1.0);
        let mut metric = MutualInformationMetric::new();
        let err = metric
            .evaluate(&image, &image, &TranslationTransform::identity())
            .unwrap_err();
        assert_eq!(err, MetricError::EmptySampleSet);
    }

    #[test]
    fn test_all_samples_outside_moving_support_fails() {
        let image = blob_image(32, (16.0, 16.0), 6.0);
        let mut metric = MutualInformationMetric::new().with_sample_fraction(0.1);
        let err = metric
            .evaluate(
                &image,
                &image,
                &TranslationTransform::new(Vector::new(1000.0, 0.0)),
            )
            .unwrap_err();
        assert_eq!(err, MetricError::EmptySampleSet);
    }
}
