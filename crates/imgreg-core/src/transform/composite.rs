//! Composite transform.

use nalgebra::{DVector, Matrix2xX};

use crate::spatial::Point;

use super::trait_::{Transform, TransformError};

/// Ordered chain of transforms applied in insertion order.
///
/// `map(p) = T_n(...T_2(T_1(p)))` where `T_1` is the first transform
/// added. The order is significant and fixed at build time;
/// [`add_transform`](CompositeTransform::add_transform) appends and is
/// the only structural mutation.
///
/// Parameter access (`parameters`, `set_parameters`, `jacobian`)
/// delegates to the *last* child, the transform under optimization,
/// while the earlier children act as frozen initial transforms. The
/// parameter jacobian of the chain with respect to the last child's
/// parameters is exactly the last child's jacobian evaluated at the
/// point mapped through the preceding children.
#[derive(Clone, Default)]
pub struct CompositeTransform {
    transforms: Vec<Box<dyn Transform>>,
}

impl CompositeTransform {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform to the chain.
    pub fn add_transform(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Number of child transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Map a point through every child except the last.
    fn prefix_point(&self, point: &Point) -> Point {
        let n = self.transforms.len();
        self.transforms[..n.saturating_sub(1)]
            .iter()
            .fold(*point, |p, t| t.transform_point(&p))
    }
}

impl Transform for CompositeTransform {
    fn num_parameters(&self) -> usize {
        self.transforms.last().map_or(0, |t| t.num_parameters())
    }

    fn parameters(&self) -> DVector<f64> {
        self.transforms
            .last()
            .map_or_else(|| DVector::zeros(0), |t| t.parameters())
    }

    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), TransformError> {
        match self.transforms.last_mut() {
            Some(t) => t.set_parameters(parameters),
            None if parameters.is_empty() => Ok(()),
            None => Err(TransformError::InvalidParameterVector {
                expected: 0,
                actual: parameters.len(),
            }),
        }
    }

    fn transform_point(&self, point: &Point) -> Point {
        self.transforms
            .iter()
            .fold(*point, |p, t| t.transform_point(&p))
    }

    fn jacobian(&self, point: &Point) -> Matrix2xX<f64> {
        match self.transforms.last() {
            Some(t) => t.jacobian(&self.prefix_point(point)),
            None => Matrix2xX::zeros(0),
        }
    }

    fn set_identity(&mut self) {
        for t in &mut self.transforms {
            t.set_identity();
        }
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }
}
