//! Transform trait for spatial coordinate transformations.

use nalgebra::{DVector, Matrix2xX};
use thiserror::Error;

use crate::spatial::Point;

/// Error raised by transform parameter updates.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    /// The supplied parameter vector does not match the transform's
    /// fixed parameter count. The transform is left unchanged.
    #[error("invalid parameter vector: expected {expected} parameters, got {actual}")]
    InvalidParameterVector { expected: usize, actual: usize },
}

/// A parameterized mapping from fixed-space points to moving-space
/// points.
///
/// The parameter vector length is fixed at construction. The mapping is
/// a pure function of the current parameters; only
/// [`set_parameters`](Transform::set_parameters) and
/// [`set_identity`](Transform::set_identity) mutate a transform, and the
/// registration loop invokes them strictly between metric evaluations.
pub trait Transform {
    /// Number of parameters (constant for the lifetime of the
    /// transform).
    fn num_parameters(&self) -> usize;

    /// Current parameter vector.
    fn parameters(&self) -> DVector<f64>;

    /// Replace the parameter vector.
    ///
    /// A length mismatch is rejected immediately with
    /// [`TransformError::InvalidParameterVector`].
    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), TransformError>;

    /// Map a fixed-space point to moving space.
    fn transform_point(&self, point: &Point) -> Point;

    /// Jacobian of the mapped point with respect to the parameters,
    /// evaluated at `point`. Shape `2 x num_parameters`.
    fn jacobian(&self, point: &Point) -> Matrix2xX<f64>;

    /// Reset to the identity mapping for this transform kind.
    fn set_identity(&mut self);

    /// Clone into a boxed trait object.
    fn box_clone(&self) -> Box<dyn Transform>;
}

impl Clone for Box<dyn Transform> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
