//! Parameterized spatial transforms.

mod composite;
mod trait_;
mod translation;

pub use composite::CompositeTransform;
pub use trait_::{Transform, TransformError};
pub use translation::TranslationTransform;
