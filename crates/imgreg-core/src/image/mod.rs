//! Image type with physical metadata.

mod image;

pub use image::Image;
