//! Optimizer trait and stop conditions.

use std::fmt;

use imgreg_core::transform::Transform;
use imgreg_core::Image;

use crate::error::MetricError;
use crate::metric::Metric;

/// Why an optimizer stopped, or [`StopCondition::None`] while it is
/// still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopCondition {
    /// Still iterating.
    #[default]
    None,
    /// The gradient magnitude fell below the tolerance.
    GradientTooSmall,
    /// The step length shrank below the configured minimum.
    StepTooSmall,
    /// The iteration budget was exhausted.
    MaximumIterationsReached,
    /// A metric evaluation failed; the error itself is returned from
    /// [`Optimizer::step`].
    MetricError,
}

impl StopCondition {
    /// Whether the optimizer has terminated.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StopCondition::None)
    }
}

impl fmt::Display for StopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            StopCondition::None => "running",
            StopCondition::GradientTooSmall => "gradient magnitude below tolerance",
            StopCondition::StepTooSmall => "step length below minimum",
            StopCondition::MaximumIterationsReached => "maximum iterations reached",
            StopCondition::MetricError => "metric evaluation failed",
        };
        f.write_str(description)
    }
}

/// Iterative optimizer advancing a transform's parameters against a
/// metric, one evaluation per step.
///
/// Implementations hold their own iteration state so a driver can run
/// them level by level: [`Optimizer::reset`] clears the state while
/// keeping the configuration, and calling [`Optimizer::step`] after a
/// terminal stop condition is a no-op that returns that condition
/// again.
///
/// Each implementation is configured for a fixed metric direction; the
/// maximize switch is explicit and defaults to minimization.
pub trait Optimizer {
    /// Evaluate the metric once and advance the transform parameters.
    ///
    /// Returns the stop condition after the step, which is
    /// [`StopCondition::None`] while iteration should continue. Metric
    /// failures abort the step and leave the transform unchanged.
    fn step(
        &mut self,
        metric: &mut dyn Metric,
        fixed: &Image,
        moving: &Image,
        transform: &mut dyn Transform,
    ) -> Result<StopCondition, MetricError>;

    /// The stop condition after the most recent step.
    fn stop_condition(&self) -> StopCondition;

    /// Number of completed steps since construction or the last reset.
    fn iteration(&self) -> usize;

    /// Metric value observed in the most recent step.
    fn value(&self) -> f64;

    /// Clear iteration state, keeping the configuration.
    fn reset(&mut self);
}
