//! Multi-resolution registration driver.

use std::time::{Duration, Instant};

use imgreg_core::filter::{gaussian_smooth, normalize, shrink};
use imgreg_core::transform::{CompositeTransform, Transform};
use imgreg_core::Image;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RegistrationError, RegistrationFailure, Result};
use crate::metric::Metric;
use crate::optimizer::Optimizer;

/// One resolution level of the pyramid schedule.
///
/// The fixed and moving images are smoothed with `smoothing_sigma`
/// (physical units, zero disables smoothing) and then block-averaged by
/// `shrink_factor` before the optimizer runs on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub smoothing_sigma: f64,
    pub shrink_factor: usize,
}

impl Level {
    /// Create a level with the given smoothing and shrink settings.
    pub fn new(smoothing_sigma: f64, shrink_factor: usize) -> Self {
        Self {
            smoothing_sigma,
            shrink_factor,
        }
    }

    /// Full-resolution level without smoothing.
    pub fn full_resolution() -> Self {
        Self::new(0.0, 1)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::full_resolution()
    }
}

/// Outcome of a completed registration run.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResult {
    /// Final parameters of the optimized transform.
    pub parameters: Vec<f64>,
    /// Total optimizer iterations summed over all levels.
    pub iterations: usize,
    /// Metric value at the last evaluated iteration.
    pub metric_value: f64,
    /// Human-readable description of why the run stopped.
    pub stop_condition: String,
}

/// Registration driver binding a metric, an optimizer, and an
/// optimizable transform, and running them over a multi-resolution
/// pyramid.
///
/// The driver owns its components for the duration of the run. Initial
/// transforms are frozen: they participate in the mapping of every
/// sample but their parameters are never touched by the optimizer. The
/// optimized transform's parameters carry over from one level to the
/// next, so each level refines the previous level's estimate.
pub struct Registration<M: Metric, O: Optimizer> {
    metric: M,
    optimizer: O,
    transform: Box<dyn Transform>,
    fixed_initial_transform: Option<Box<dyn Transform>>,
    moving_initial_transform: Option<Box<dyn Transform>>,
    levels: Vec<Level>,
    normalize_inputs: bool,
    smoothing_variance: Option<f64>,
    time_budget: Option<Duration>,
}

impl<M: Metric, O: Optimizer> Registration<M, O> {
    /// Create a driver with a single full-resolution level and no input
    /// preprocessing.
    ///
    /// Preprocessing is opt-in: when driving
    /// [`MutualInformationMetric`](crate::metric::MutualInformationMetric),
    /// enable [`with_normalization`](Registration::with_normalization),
    /// since that metric's default kernel widths assume inputs with zero
    /// mean and unit variance.
    pub fn new(metric: M, optimizer: O, transform: Box<dyn Transform>) -> Self {
        Self {
            metric,
            optimizer,
            transform,
            fixed_initial_transform: None,
            moving_initial_transform: None,
            levels: vec![Level::full_resolution()],
            normalize_inputs: false,
            smoothing_variance: None,
            time_budget: None,
        }
    }

    /// Set a frozen transform applied to fixed-image points before the
    /// optimized transform.
    pub fn with_fixed_initial_transform(mut self, transform: Box<dyn Transform>) -> Self {
        self.fixed_initial_transform = Some(transform);
        self
    }

    /// Set a frozen transform composed ahead of the optimized transform
    /// on the moving side.
    pub fn with_moving_initial_transform(mut self, transform: Box<dyn Transform>) -> Self {
        self.moving_initial_transform = Some(transform);
        self
    }

    /// Set the multi-resolution schedule, coarsest level first.
    pub fn with_levels(mut self, levels: Vec<Level>) -> Self {
        self.levels = levels;
        self
    }

    /// Normalize both inputs to zero mean and unit variance before
    /// registration. Required by the mutual information metric's
    /// default kernel widths.
    pub fn with_normalization(mut self, normalize_inputs: bool) -> Self {
        self.normalize_inputs = normalize_inputs;
        self
    }

    /// Smooth both inputs with a Gaussian of this variance (physical
    /// units) before the level schedule is applied.
    pub fn with_smoothing_variance(mut self, variance: f64) -> Self {
        self.smoothing_variance = Some(variance);
        self
    }

    /// Bound the total wall-clock time of the run. The budget is
    /// checked once per iteration, so a slow metric evaluation can
    /// overshoot it by at most one evaluation.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// The optimized transform with its current parameters.
    pub fn transform(&self) -> &dyn Transform {
        self.transform.as_ref()
    }

    /// The full output mapping from fixed to moving physical space:
    /// the frozen initial transforms followed by the optimized
    /// transform.
    pub fn output_transform(&self) -> CompositeTransform {
        let mut composite = CompositeTransform::new();
        if let Some(t) = &self.fixed_initial_transform {
            composite.add_transform(t.box_clone());
        }
        if let Some(t) = &self.moving_initial_transform {
            composite.add_transform(t.box_clone());
        }
        composite.add_transform(self.transform.box_clone());
        composite
    }

    fn validate(&self, fixed: &Image, moving: &Image) -> std::result::Result<(), RegistrationError> {
        if self.levels.is_empty() {
            return Err(RegistrationError::InvalidConfiguration(
                "level schedule is empty".into(),
            ));
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.shrink_factor == 0 {
                return Err(RegistrationError::InvalidConfiguration(format!(
                    "level {index} has a zero shrink factor"
                )));
            }
            if level.smoothing_sigma < 0.0 {
                return Err(RegistrationError::InvalidConfiguration(format!(
                    "level {index} has a negative smoothing sigma"
                )));
            }
        }
        if self.transform.num_parameters() == 0 {
            return Err(RegistrationError::DimensionMismatch(
                "transform exposes no optimizable parameters".into(),
            ));
        }
        let expected = self.transform.num_parameters();
        for (side, initial) in [
            ("fixed", &self.fixed_initial_transform),
            ("moving", &self.moving_initial_transform),
        ] {
            if let Some(transform) = initial {
                if transform.num_parameters() != expected {
                    return Err(RegistrationError::DimensionMismatch(format!(
                        "{side} initial transform has {} parameters, expected {expected}",
                        transform.num_parameters()
                    )));
                }
            }
        }
        if fixed.is_empty() || moving.is_empty() {
            return Err(RegistrationError::DimensionMismatch(
                "fixed and moving images must be non-empty".into(),
            ));
        }
        Ok(())
    }

    fn prepare_input(&self, image: &Image) -> Image {
        let mut prepared = if self.normalize_inputs {
            normalize(image)
        } else {
            image.clone()
        };
        if let Some(variance) = self.smoothing_variance {
            if variance > 0.0 {
                prepared = gaussian_smooth(&prepared, variance.sqrt());
            }
        }
        prepared
    }

    fn prepare_level(image: &Image, level: &Level) -> Image {
        let mut prepared = if level.smoothing_sigma > 0.0 {
            gaussian_smooth(image, level.smoothing_sigma)
        } else {
            image.clone()
        };
        if level.shrink_factor > 1 {
            prepared = shrink(&prepared, level.shrink_factor);
        }
        prepared
    }

    /// Run the registration to completion.
    ///
    /// Returns the final parameters and stop condition, or a
    /// [`RegistrationFailure`] carrying the error kind and the
    /// iteration at which it occurred. Invalid configurations and
    /// dimension mismatches fail before the first iteration.
    pub fn run(&mut self, fixed: &Image, moving: &Image) -> Result<RegistrationResult> {
        self.validate(fixed, moving).map_err(|error| {
            RegistrationFailure {
                error,
                iteration: 0,
            }
        })?;

        let fixed_base = self.prepare_input(fixed);
        let moving_base = self.prepare_input(moving);

        let mut working = CompositeTransform::new();
        if let Some(t) = &self.fixed_initial_transform {
            working.add_transform(t.box_clone());
        }
        if let Some(t) = &self.moving_initial_transform {
            working.add_transform(t.box_clone());
        }
        working.add_transform(self.transform.box_clone());

        info!(
            metric = self.metric.name(),
            levels = self.levels.len(),
            "starting registration"
        );
        let start = Instant::now();
        let mut total_iterations = 0usize;
        let mut stop_description = String::new();
        let mut budget_exhausted = false;

        let levels = self.levels.clone();
        'levels: for (index, level) in levels.iter().enumerate() {
            let fixed_level = Self::prepare_level(&fixed_base, level);
            let moving_level = Self::prepare_level(&moving_base, level);
            debug!(
                level = index,
                shrink_factor = level.shrink_factor,
                smoothing_sigma = level.smoothing_sigma,
                rows = fixed_level.height(),
                cols = fixed_level.width(),
                "starting level"
            );

            self.optimizer.reset();
            loop {
                if let Some(budget) = self.time_budget {
                    if start.elapsed() >= budget {
                        stop_description = "wall-clock budget exhausted".into();
                        budget_exhausted = true;
                        total_iterations += self.optimizer.iteration();
                        break 'levels;
                    }
                }
                let stop = self
                    .optimizer
                    .step(&mut self.metric, &fixed_level, &moving_level, &mut working)
                    .map_err(|error| RegistrationFailure {
                        error: error.into(),
                        iteration: total_iterations + self.optimizer.iteration(),
                    })?;
                if stop.is_terminal() {
                    stop_description = stop.to_string();
                    break;
                }
            }
            total_iterations += self.optimizer.iteration();
            debug!(
                level = index,
                iterations = self.optimizer.iteration(),
                value = self.optimizer.value(),
                stop = %self.optimizer.stop_condition(),
                "level finished"
            );
        }

        let parameters: Vec<f64> = working.parameters().as_slice().to_vec();
        self.transform
            .set_parameters(&parameters)
            .map_err(|error| RegistrationFailure {
                error: error.into(),
                iteration: total_iterations,
            })?;

        info!(
            iterations = total_iterations,
            value = self.optimizer.value(),
            stop = %stop_description,
            budget_exhausted,
            "registration finished"
        );
        Ok(RegistrationResult {
            parameters,
            iterations: total_iterations,
            metric_value: self.optimizer.value(),
            stop_condition: stop_description,
        })
    }
}
