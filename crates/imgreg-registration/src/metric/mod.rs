//! Image similarity metrics.

mod mean_squares;
mod mutual_information;
pub mod sampling;
mod trait_;

pub use mean_squares::MeanSquaresMetric;
pub use mutual_information::MutualInformationMetric;
pub use trait_::{Metric, MetricValue};
