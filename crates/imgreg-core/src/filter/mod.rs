//! Preprocessing filters and the resampler.
//!
//! Each stage takes its inputs as arguments and returns a new image;
//! callers sequence the stages explicitly.

mod cast;
mod gaussian;
mod normalize;
mod resample;
mod shrink;

pub use cast::cast_to_u8;
pub use gaussian::gaussian_smooth;
pub use normalize::normalize;
pub use resample::resample;
pub use shrink::shrink;
