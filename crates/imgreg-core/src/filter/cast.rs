//! Cast to 8-bit for export consumers.

use ndarray::Array2;

use crate::image::Image;

/// Clamp-and-cast the sample buffer to `u8`.
///
/// Values are rounded and clamped to `[0, 255]`; the physical metadata
/// is dropped because export formats carry none.
pub fn cast_to_u8(image: &Image) -> Array2<u8> {
    image.data().mapv(|v| v.round().clamp(0.0, 255.0) as u8)
}
