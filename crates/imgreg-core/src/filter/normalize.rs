//! Intensity normalization.

use crate::image::Image;

/// Shift and scale intensities to zero mean and unit variance.
///
/// The density-based mutual-information metric assumes its inputs have
/// been normalized this way; for intensity-difference metrics the
/// operation is harmless. A constant image maps to all zeros instead of
/// dividing by a zero standard deviation.
pub fn normalize(image: &Image) -> Image {
    let n = image.len();
    if n == 0 {
        return image.clone();
    }

    let mean = image.data().iter().sum::<f64>() / n as f64;
    let variance = image
        .data()
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / n as f64;
    let std = variance.sqrt();

    let data = if std > f64::EPSILON {
        image.data().mapv(|v| (v - mean) / std)
    } else {
        image.data().mapv(|v| v - mean)
    };

    Image::new(data, *image.origin(), *image.spacing(), *image.direction())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_zero_mean_unit_variance() {
        let data = Array2::from_shape_fn((10, 10), |(y, x)| (x + 10 * y) as f64);
        let image = Image::from_data(data);
        let normalized = normalize(&image);

        let n = normalized.len() as f64;
        let mean = normalized.data().iter().sum::<f64>() / n;
        let variance = normalized.data().iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        assert!(mean.abs() < 1e-12);
        assert!((variance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_image_maps_to_zero() {
        let image = Image::from_data(Array2::from_elem((5, 5), 42.0));
        let normalized = normalize(&image);
        for v in normalized.data().iter() {
            assert_eq!(*v, 0.0);
        }
    }
}
