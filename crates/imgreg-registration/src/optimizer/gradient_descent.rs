//! Fixed-step gradient descent.

use imgreg_core::transform::Transform;
use imgreg_core::Image;
use tracing::trace;

use crate::error::MetricError;
use crate::metric::Metric;

use super::trait_::{Optimizer, StopCondition};

/// Gradient descent with a constant learning rate.
///
/// Every step moves the parameters by `learning_rate * gradient`,
/// against the gradient when minimizing and along it when maximizing.
/// The only stop condition is the iteration budget, which makes this
/// optimizer a good match for noisy metrics such as sampled mutual
/// information where the gradient never settles to zero.
#[derive(Debug, Clone)]
pub struct GradientDescentOptimizer {
    learning_rate: f64,
    max_iterations: usize,
    maximize: bool,
    iteration: usize,
    value: f64,
    stop_condition: StopCondition,
}

impl GradientDescentOptimizer {
    /// Create an optimizer with the given learning rate, a budget of
    /// 200 iterations, and minimization.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            max_iterations: 200,
            maximize: false,
            iteration: 0,
            value: 0.0,
            stop_condition: StopCondition::None,
        }
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

impl Optimizer for GradientDescentOptimizer {
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

        let direction = if self.maximize { 1.0 } else { -1.0 };
        let parameters =
            transform.parameters() + evaluation.gradient * (direction * self.learning_rate);
        transform
            .set_parameters(parameters.as_slice())
            .expect("parameter count is taken from the same transform");

        self.iteration += 1;
        trace!(
            iteration = self.iteration,
            value = self.value,
            "gradient descent step"
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
        self.stop_condition = StopCondition::None;
    }
}
