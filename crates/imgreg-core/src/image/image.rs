//! Image type with physical metadata and coordinate transformations.
//!
//! An image combines a dense 2-D sample buffer with the physical space
//! metadata (origin, spacing, direction) that maps pixel indices to
//! physical coordinates.

use ndarray::Array2;

use crate::spatial::{Direction, Point, Spacing, Vector};

/// A 2-D scalar image with physical metadata.
///
/// Immutable once constructed: filters and the resampler return new
/// images instead of mutating their input, so data dependencies between
/// processing stages stay explicit.
///
/// # Coordinate systems
/// * **Index space**: continuous pixel indices `(x, y)` where `x` is the
///   column and `y` the row of the buffer.
/// * **Physical space**: continuous coordinates in physical units,
///   related to index space via origin, spacing, and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Sample buffer, indexed `[row, column]` = `[y, x]`.
    data: Array2<f64>,
    /// Physical coordinate of pixel (0, 0).
    origin: Point,
    /// Physical distance between pixels along each axis.
    spacing: Spacing,
    /// Orientation of the image axes.
    direction: Direction,
}

impl Image {
    /// Create a new image with the given buffer and metadata.
    pub fn new(data: Array2<f64>, origin: Point, spacing: Spacing, direction: Direction) -> Self {
        Self {
            data,
            origin,
            spacing,
            direction,
        }
    }

    /// Create an image on a unit grid (zero origin, unit spacing,
    /// identity direction).
    pub fn from_data(data: Array2<f64>) -> Self {
        Self::new(data, Point::origin(), Spacing::unit(), Direction::identity())
    }

    /// Get the sample buffer.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Image extent as `[rows, cols]`.
    pub fn shape(&self) -> [usize; 2] {
        let (rows, cols) = self.data.dim();
        [rows, cols]
    }

    /// Number of columns (extent along x).
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Number of rows (extent along y).
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the origin (physical coordinate of pixel (0, 0)).
    pub fn origin(&self) -> &Point {
        &self.origin
    }

    /// Get the spacing (physical distance between pixels).
    pub fn spacing(&self) -> &Spacing {
        &self.spacing
    }

    /// Get the direction (orientation matrix).
    pub fn direction(&self) -> &Direction {
        &self.direction
    }

    /// Sample value at an integer pixel index `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> f64 {
        self.data[[y, x]]
    }

    /// Convert a physical point to a continuous index.
    ///
    /// `index = Direction^-1 * (point - origin) / spacing`
    pub fn physical_point_to_continuous_index(&self, point: &Point) -> Point {
        let diff = point - self.origin;
        let rotated = self.direction.inverse() * diff;
        Point::new(rotated.x / self.spacing[0], rotated.y / self.spacing[1])
    }

    /// Convert a continuous index to a physical point.
    ///
    /// `point = origin + Direction * (index * spacing)`
    pub fn continuous_index_to_physical_point(&self, index: &Point) -> Point {
        let scaled = Vector::new(index.x * self.spacing[0], index.y * self.spacing[1]);
        self.origin + self.direction.matrix() * scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_image(rows: usize, cols: usize) -> Image {
        Image::from_data(Array2::zeros((rows, cols)))
    }

    #[test]
    fn test_image_creation() {
        let image = unit_image(10, 20);
        assert_eq!(image.shape(), [10, 20]);
        assert_eq!(image.width(), 20);
        assert_eq!(image.height(), 10);
        assert_eq!(image.len(), 200);
        assert_eq!(image.origin(), &Point::origin());
    }

    #[test]
    fn test_physical_to_index_transform() {
        let image = unit_image(10, 10);
        let index = image.physical_point_to_continuous_index(&Point::new(5.0, 3.0));
        assert!((index.x - 5.0).abs() < 1e-12);
        assert!((index.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_index_to_physical_transform() {
        let image = unit_image(10, 10);
        let point = image.continuous_index_to_physical_point(&Point::new(5.0, 3.0));
        assert!((point.x - 5.0).abs() < 1e-12);
        assert!((point.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_roundtrip() {
        let image = Image::new(
            Array2::zeros((10, 10)),
            Point::new(-4.0, 7.5),
            Spacing::new([0.5, 2.0]),
            Direction::identity(),
        );
        let original = Point::new(3.5, 4.5);
        let index = image.physical_point_to_continuous_index(&original);
        let back = image.continuous_index_to_physical_point(&index);
        assert!((original - back).norm() < 1e-12);
    }

    #[test]
    fn test_non_unit_spacing() {
        let image = Image::new(
            Array2::zeros((10, 10)),
            Point::origin(),
            Spacing::new([2.0, 2.0]),
            Direction::identity(),
        );
        let index = image.physical_point_to_continuous_index(&Point::new(10.0, 10.0));
        assert!((index.x - 5.0).abs() < 1e-12);
        assert!((index.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_zero_origin() {
        let image = Image::new(
            Array2::zeros((10, 10)),
            Point::new(10.0, 20.0),
            Spacing::unit(),
            Direction::identity(),
        );
        let index = image.physical_point_to_continuous_index(&Point::new(15.0, 25.0));
        assert!((index.x - 5.0).abs() < 1e-12);
        assert!((index.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_pixel_indexing_is_x_y() {
        let mut data = Array2::zeros((2, 3));
        data[[1, 2]] = 42.0; // row 1, column 2
        let image = Image::from_data(data);
        assert_eq!(image.pixel(2, 1), 42.0);
    }
}
