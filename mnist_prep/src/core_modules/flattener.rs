//! Row-major conversion between a `BinaryImage` and the flat feature vector
//! written to disk.

use crate::core_modules::binarizer::{Bit, BinaryImage};
use crate::error::Result;

/// Row 0 left to right, then row 1, and so on.
pub fn flatten(image: &BinaryImage) -> Vec<Bit> {
    let mut values = Vec::with_capacity((image.width() * image.height()) as usize);
    for y in 0..image.height() {
        for x in 0..image.width() {
            values.push(image.get(x, y));
        }
    }
    values
}

/// Inverse of `flatten` for a known shape.
pub fn unflatten(values: &[Bit], width: u32, height: u32) -> Result<BinaryImage> {
    BinaryImage::new(width, height, values.to_vec())
}
