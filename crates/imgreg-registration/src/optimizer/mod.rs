//! Iterative parameter optimizers.

mod gradient_descent;
mod regular_step;
mod trait_;

pub use gradient_descent::GradientDescentOptimizer;
pub use regular_step::RegularStepGradientDescentOptimizer;
pub use trait_::{Optimizer, StopCondition};
