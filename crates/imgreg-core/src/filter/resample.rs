//! Resampling of a moving image onto a reference grid.

use ndarray::Array2;

use crate::image::Image;
use crate::interpolation::Interpolator;
use crate::spatial::Point;
use crate::transform::Transform;

/// Resample `moving` onto the grid of `reference` under `transform`.
///
/// For every reference-grid pixel, its physical location is mapped
/// through the transform into moving space and interpolated there.
/// Pixels mapping outside the moving image's support are filled with
/// `default_value`.
///
/// The output carries the reference image's size, spacing, origin, and
/// direction.
pub fn resample(
    moving: &Image,
    transform: &dyn Transform,
    reference: &Image,
    interpolator: &dyn Interpolator,
    default_value: f64,
) -> Image {
    let [rows, cols] = reference.shape();
    let mut data = Array2::zeros((rows, cols));

    for y in 0..rows {
        for x in 0..cols {
            let fixed_point =
                reference.continuous_index_to_physical_point(&Point::new(x as f64, y as f64));
            let moving_point = transform.transform_point(&fixed_point);
            let moving_index = moving.physical_point_to_continuous_index(&moving_point);
            data[[y, x]] = interpolator
                .interpolate(moving, &moving_index)
                .unwrap_or(default_value);
        }
    }

    Image::new(
        data,
        *reference.origin(),
        *reference.spacing(),
        *reference.direction(),
    )
}
