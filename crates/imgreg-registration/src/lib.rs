pub mod error;
pub mod metric;
pub mod optimizer;
pub mod registration;

pub use error::{MetricError, RegistrationError, RegistrationFailure, Result};
pub use metric::{MeanSquaresMetric, Metric, MetricValue, MutualInformationMetric};
pub use optimizer::{
    GradientDescentOptimizer, Optimizer, RegularStepGradientDescentOptimizer, StopCondition,
};
pub use registration::{Level, Registration, RegistrationResult};
