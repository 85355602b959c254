//! Translation transform.

use nalgebra::{DVector, Matrix2xX};

use crate::spatial::{Point, Vector};

use super::trait_::{Transform, TransformError};

/// Translation transform: `map(p) = p + offset`.
///
/// Two parameters, the offset along x and y. Identity is the zero
/// offset.
#[derive(Debug, Clone, Default)]
pub struct TranslationTransform {
    offset: Vector,
}

impl TranslationTransform {
    /// Create a translation with the given offset.
    pub fn new(offset: Vector) -> Self {
        Self { offset }
    }

    /// Create the identity translation.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Get the offset vector.
    pub fn offset(&self) -> &Vector {
        &self.offset
    }
}

impl Transform for TranslationTransform {
    fn num_parameters(&self) -> usize {
        2
    }

    fn parameters(&self) -> DVector<f64> {
        DVector::from_column_slice(self.offset.as_slice())
    }

    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), TransformError> {
        if parameters.len() != 2 {
            return Err(TransformError::InvalidParameterVector {
                expected: 2,
                actual: parameters.len(),
            });
        }
        self.offset = Vector::new(parameters[0], parameters[1]);
        Ok(())
    }

    fn transform_point(&self, point: &Point) -> Point {
        *point + self.offset
    }

    fn jacobian(&self, _point: &Point) -> Matrix2xX<f64> {
        let mut jacobian = Matrix2xX::zeros(2);
        jacobian[(0, 0)] = 1.0;
        jacobian[(1, 1)] = 1.0;
        jacobian
    }

    fn set_identity(&mut self) {
        self.offset = Vector::zeros();
    }

    fn box_clone(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }
}
