//! Metric trait for image similarity measurement.

use imgreg_core::transform::Transform;
use imgreg_core::Image;
use nalgebra::DVector;

use crate::error::MetricError;

/// Cost and parameter gradient from one metric evaluation.
#[derive(Debug, Clone)]
pub struct MetricValue {
    /// Scalar similarity value.
    pub value: f64,
    /// Derivative of the value with respect to the transform
    /// parameters.
    pub gradient: DVector<f64>,
}

/// Similarity metric between a fixed and a moving image under a
/// candidate transform.
///
/// The images and the transform are read-only during evaluation; the
/// mutable receiver exists only for internal state such as the density
/// metric's sample generator.
///
/// Whether the value is to be minimized (intensity-difference metrics)
/// or maximized (mutual information) is part of each implementation's
/// documented contract; the optimizer is told the direction explicitly
/// and no metric negates its value to fake a convention.
pub trait Metric {
    /// Evaluate cost and gradient for the current transform parameters.
    ///
    /// Fails with [`MetricError::EmptySampleSet`] when no valid samples
    /// remain.
    fn evaluate(
        &mut self,
        fixed: &Image,
        moving: &Image,
        transform: &dyn Transform,
    ) -> Result<MetricValue, MetricError>;

    /// Identifier used in logs.
    fn name(&self) -> &'static str;
}
