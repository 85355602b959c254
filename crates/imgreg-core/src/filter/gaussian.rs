//! Separable Gaussian smoothing.

use ndarray::Array2;

use crate::image::Image;

/// Smooth an image with a Gaussian of the given standard deviation in
/// physical units.
///
/// Separable 1-D convolutions along each axis; the kernel radius is
/// `ceil(3 * sigma / spacing)` per axis with normalized weights, and the
/// borders replicate the edge sample. A non-positive sigma returns the
/// input unchanged.
pub fn gaussian_smooth(image: &Image, sigma: f64) -> Image {
    if sigma <= 0.0 || image.is_empty() {
        return image.clone();
    }

    let mut data = image.data().clone();
    for axis in 0..2 {
        let pixel_sigma = sigma / image.spacing()[axis];
        let radius = (3.0 * pixel_sigma).ceil() as usize;
        if radius == 0 {
            continue;
        }
        let kernel = gaussian_kernel(pixel_sigma, radius);
        data = convolve_axis(&data, &kernel, axis);
    }

    Image::new(data, *image.origin(), *image.spacing(), *image.direction())
}

fn gaussian_kernel(sigma: f64, radius: usize) -> Vec<f64> {
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    let mut sum = 0.0;
    for i in 0..=(2 * radius) {
        let x = i as f64 - radius as f64;
        let value = (-x * x / two_sigma2).exp();
        kernel.push(value);
        sum += value;
    }
    for value in &mut kernel {
        *value /= sum;
    }
    kernel
}

/// Convolve along one axis (0 = x/columns, 1 = y/rows) with replicated
/// edges.
fn convolve_axis(data: &Array2<f64>, kernel: &[f64], axis: usize) -> Array2<f64> {
    let (rows, cols) = data.dim();
    let radius = (kernel.len() - 1) / 2;
    let mut output = Array2::zeros((rows, cols));

    for y in 0..rows {
        for x in 0..cols {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let offset = k as isize - radius as isize;
                let (sx, sy) = if axis == 0 {
                    (clamp_index(x as isize + offset, cols), y)
                } else {
                    (x, clamp_index(y as isize + offset, rows))
                };
                acc += weight * data[[sy, sx]];
            }
            output[[y, x]] = acc;
        }
    }
    output
}

fn clamp_index(index: isize, len: usize) -> usize {
    index.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_zero_sigma_is_identity() {
        let image = Image::from_data(Array2::from_elem((4, 4), 3.0));
        let smoothed = gaussian_smooth(&image, 0.0);
        assert_eq!(smoothed.data(), image.data());
    }

    #[test]
    fn test_constant_image_unchanged() {
        let image = Image::from_data(Array2::from_elem((8, 8), 5.0));
        let smoothed = gaussian_smooth(&image, 1.5);
        for v in smoothed.data().iter() {
            assert!((v - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smoothing_reduces_peak() {
        let mut data = Array2::zeros((9, 9));
        data[[4, 4]] = 1.0;
        let image = Image::from_data(data);
        let smoothed = gaussian_smooth(&image, 1.0);
        let peak = smoothed.data()[[4, 4]];
        assert!(peak < 1.0 && peak > 0.0);
        // Mass is preserved by the normalized kernel away from borders.
        let total: f64 = smoothed.data().iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_metadata_preserved() {
        use crate::spatial::{Direction, Point, Spacing};
        let image = Image::new(
            Array2::zeros((4, 4)),
            Point::new(1.0, 2.0),
            Spacing::new([0.5, 0.5]),
            Direction::identity(),
        );
        let smoothed = gaussian_smooth(&image, 1.0);
        assert_eq!(smoothed.origin(), image.origin());
        assert_eq!(smoothed.spacing(), image.spacing());
    }
}
