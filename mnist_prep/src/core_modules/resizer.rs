// THEORY:
// The `resizer` shrinks a digit from its native 28x28 grid to the 8x8 grid the
// downstream trainer consumes. It is a thin wrapper over `image::imageops::resize`
// with a linear (`Triangle`) filter. The exact values it produces are an
// approximation of the source; only their binarized form is meaningful.

use image::GrayImage;
use image::imageops::{self, FilterType};

/// Side length of the downsampled digit.
pub const TARGET_SIDE: u32 = 8;

pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Resamples `image` to `width` x `height`.
pub fn resize(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, RESIZE_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn produces_target_dimensions() {
        let source = GrayImage::from_pixel(28, 28, Luma([128]));
        let resized = resize(&source, TARGET_SIDE, TARGET_SIDE);
        assert_eq!(resized.dimensions(), (8, 8));
    }

    #[test]
    fn uniform_images_stay_uniform() {
        for value in [0u8, 255] {
            let source = GrayImage::from_pixel(28, 28, Luma([value]));
            let resized = resize(&source, TARGET_SIDE, TARGET_SIDE);
            assert!(resized.pixels().all(|p| p.0[0] == value), "value {value} drifted");
        }
    }

    #[test]
    fn bright_region_stays_on_its_side() {
        // Left half white, right half black.
        let source = GrayImage::from_fn(28, 28, |x, _| {
            if x < 14 { Luma([255]) } else { Luma([0]) }
        });
        let resized = resize(&source, TARGET_SIDE, TARGET_SIDE);

        for y in 0..TARGET_SIDE {
            assert!(resized.get_pixel(0, y).0[0] > 200);
            assert!(resized.get_pixel(TARGET_SIDE - 1, y).0[0] < 55);
        }
    }

    #[test]
    fn same_size_is_a_copy() {
        let source = GrayImage::from_fn(8, 8, |x, y| Luma([(x * 8 + y) as u8]));
        assert_eq!(resize(&source, 8, 8), source);
    }
}
