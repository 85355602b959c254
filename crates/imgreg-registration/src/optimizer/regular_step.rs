//! Regular-step gradient descent.

use imgreg_core::transform::Transform;
use imgreg_core::Image;
use nalgebra::DVector;
use tracing::trace;

use crate::error::MetricError;
use crate::metric::Metric;

use super::trait_::{Optimizer, StopCondition};

const DEFAULT_LEARNING_RATE: f64 = 4.0;
const DEFAULT_MINIMUM_STEP_LENGTH: f64 = 0.001;
const DEFAULT_RELAXATION_FACTOR: f64 = 0.5;
const DEFAULT_GRADIENT_TOLERANCE: f64 = 1e-4;
const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Gradient descent along the unit gradient with an adaptive step
/// length.
///
/// Each step moves the parameters by the current step length along the
/// normalized gradient direction. When consecutive gradients point in
/// opposing directions (negative dot product) the optimizer has
/// overshot a minimum, and the step length is multiplied by the
/// relaxation factor. Iteration stops when the step length falls below
/// the configured minimum, the gradient magnitude falls below its
/// tolerance, or the iteration budget runs out.
#[derive(Debug, Clone)]
pub struct RegularStepGradientDescentOptimizer {
    learning_rate: f64,
    minimum_step_length: f64,
    relaxation_factor: f64,
    gradient_tolerance: f64,
    max_iterations: usize,
    maximize: bool,
    iteration: usize,
    value: f64,
    current_step_length: f64,
    previous_gradient: Option<DVector<f64>>,
    stop_condition: StopCondition,
}

impl RegularStepGradientDescentOptimizer {
    /// Create an optimizer with the default configuration: initial step
    /// length 4.0, minimum step 0.001, relaxation 0.5, gradient
    /// tolerance 1e-4, 200 iterations, minimization.
    pub fn new() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            minimum_step_length: DEFAULT_MINIMUM_STEP_LENGTH,
            relaxation_factor: DEFAULT_RELAXATION_FACTOR,
            gradient_tolerance: DEFAULT_GRADIENT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            maximize: false,
            iteration: 0,
            value: 0.0,
            current_step_length: DEFAULT_LEARNING_RATE,
            previous_gradient: None,
            stop_condition: StopCondition::None,
        }
    }

    /// Set the initial step length.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self.current_step_length = learning_rate;
        self
    }

    /// Set the minimum step length below which iteration stops.
    pub fn with_minimum_step_length(mut self, minimum_step_length: f64) -> Self {
        self.minimum_step_length = minimum_step_length;
        self
    }

    /// Set the factor applied to the step length on gradient reversal.
    ///
    /// # Panics
    /// Panics unless the factor lies strictly between 0 and 1.
    pub fn with_relaxation_factor(mut self, relaxation_factor: f64) -> Self {
        assert!(
            relaxation_factor > 0.0 && relaxation_factor < 1.0,
            "relaxation factor must lie strictly between 0 and 1"
        );
        self.relaxation_factor = relaxation_factor;
        self
    }

    /// Set the gradient magnitude below which iteration stops.
    pub fn with_gradient_tolerance(mut self, gradient_tolerance: f64) -> Self {
        self.gradient_tolerance = gradient_tolerance;
        self
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Step along the gradient instead of against it, for metrics where
    /// larger values are better.
    pub fn with_maximize(mut self, maximize: bool) -> Self {
        self.maximize = maximize;
        self
    }
}

impl Default for RegularStepGradientDescentOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for RegularStepGradientDescentOptimizer {
    fn step(
        &mut self,
        metric: &mut dyn Metric,
        fixed: &Image,
        moving: &Image,
        transform: &mut dyn Transform,
    ) -> Result<StopCondition, MetricError> {
        if self.stop_condition.is_terminal() {
            return Ok(self.stop_condition);
        }
        if self.iteration >= self.max_iterations {
            self.stop_condition = StopCondition::MaximumIterationsReached;
            return Ok(self.stop_condition);
        }

        let evaluation = match metric.evaluate(fixed, moving, &*transform) {
            Ok(evaluation) => evaluation,
            Err(error) => {
                self.stop_condition = StopCondition::MetricError;
                return Err(error);
            }
        };
        self.value = evaluation.value;

        let magnitude = evaluation.gradient.norm();
        if magnitude < self.gradient_tolerance {
            self.stop_condition = StopCondition::GradientTooSmall;
            return Ok(self.stop_condition);
        }

        if let Some(previous) = &self.previous_gradient {
            if previous.dot(&evaluation.gradient) < 0.0 {
                self.current_step_length *= self.relaxation_factor;
            }
        }
        if self.current_step_length < self.minimum_step_length {
            self.stop_condition = StopCondition::StepTooSmall;
            return Ok(self.stop_condition);
        }

        let direction = if self.maximize { 1.0 } else { -1.0 };
        let scale = direction * self.current_step_length / magnitude;
        let parameters = transform.parameters() + &evaluation.gradient * scale;
        transform
            .set_parameters(parameters.as_slice())
            .expect("parameter count is taken from the same transform");

        self.previous_gradient = Some(evaluation.gradient);
        self.iteration += 1;
        trace!(
            iteration = self.iteration,
            value = self.value,
            step_length = self.current_step_length,
            "regular step"
        );
        if self.iteration >= self.max_iterations {
            self.stop_condition = StopCondition::MaximumIterationsReached;
        }
        Ok(self.stop_condition)
    }

    fn stop_condition(&self) -> StopCondition {
        self.stop_condition
    }

    fn iteration(&self) -> usize {
        self.iteration
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn reset(&mut self) {
        self.iteration = 0;
        self.value = 0.0;
        self.current_step_length = self.learning_rate;
        self.previous_gradient = None;
        self.stop_condition = StopCondition::None;
    }
}
