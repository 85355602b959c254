//! Integer-factor downsampling for resolution levels.

use ndarray::Array2;

use crate::image::Image;
use crate::spatial::{Point, Spacing, Vector};

/// Downsample by an integer factor with block averaging.
///
/// Output spacing is the input spacing times the factor; the output
/// origin sits at the physical center of the first block so pixel
/// centers stay aligned between levels. A factor of 1 is a no-op clone.
///
/// # Panics
/// Panics if `factor` is zero.
pub fn shrink(image: &Image, factor: usize) -> Image {
    assert!(factor > 0, "shrink factor must be at least 1");
    if factor == 1 || image.is_empty() {
        return image.clone();
    }

    let [rows, cols] = image.shape();
    let out_rows = (rows / factor).max(1);
    let out_cols = (cols / factor).max(1);

    let mut data = Array2::zeros((out_rows, out_cols));
    for oy in 0..out_rows {
        for ox in 0..out_cols {
            let mut sum = 0.0;
            let mut count = 0usize;
            for dy in 0..factor {
                for dx in 0..factor {
                    let y = oy * factor + dy;
                    let x = ox * factor + dx;
                    if y < rows && x < cols {
                        sum += image.data()[[y, x]];
                        count += 1;
                    }
                }
            }
            data[[oy, ox]] = sum / count as f64;
        }
    }

    let spacing = image.spacing();
    let out_spacing = Spacing::new([spacing[0] * factor as f64, spacing[1] * factor as f64]);
    // Center of the first block in physical space.
    let half = (factor - 1) as f64 / 2.0;
    let shift = Vector::new(half * spacing[0], half * spacing[1]);
    let origin: Point = *image.origin() + image.direction().matrix() * shift;

    Image::new(data, origin, out_spacing, *image.direction())
}
