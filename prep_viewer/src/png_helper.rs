// Turns a prepared 8x8 record back into something a person can look at: every
// pixel becomes a `scale` x `scale` block, 1 white and 0 black.

use image::{GrayImage, ImageEncoder, Luma};
use mnist_prep::core_modules::binarizer::BinaryImage;
use std::path::Path;

pub const DEFAULT_SCALE: u32 = 16;

pub fn render(image: &BinaryImage, scale: u32) -> GrayImage {
    let scale = scale.max(1);
    GrayImage::from_fn(image.width() * scale, image.height() * scale, |x, y| {
        let bit = image.get(x / scale, y / scale);
        Luma([if bit == 1 { 255 } else { 0 }])
    })
}

pub fn save(path: &Path, image: &GrayImage) -> Result<(), image::error::ImageError> {
    let output = std::fs::File::create(path)?;
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )?;

    Ok(())
}
