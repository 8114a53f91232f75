// THEORY:
// The `binarizer` turns a greyscale digit into a black-and-white one in two steps:
// every intensity is first normalized to [0, 1] by dividing by 255, then compared
// against a fixed threshold. The comparison is `>=`, so a value sitting exactly on
// the threshold becomes 1.
//
// `BinaryImage` is the output container. Its constructor is the only way to build
// one from loose values, so holding a `BinaryImage` means every pixel is 0 or 1.

use crate::error::{PrepError, Result};
use image::GrayImage;

pub type Intensity = u8;
pub type NormalizedIntensity = f32;
pub type Bit = u8;

pub const MAX_INTENSITY: NormalizedIntensity = 255.0;
pub const BINARY_THRESHOLD: NormalizedIntensity = 0.5;

/// A row-major grid of pixels restricted to {0, 1}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: u32,
    height: u32,
    bits: Vec<Bit>,
}

impl BinaryImage {
    pub fn new(width: u32, height: u32, bits: Vec<Bit>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if bits.len() != expected {
            return Err(PrepError::Shape(format!(
                "{} values cannot fill a {}x{} image",
                bits.len(),
                width,
                height
            )));
        }
        if let Some(index) = bits.iter().position(|&b| b > 1) {
            return Err(PrepError::NonBinaryPixel {
                index,
                value: bits[index],
            });
        }
        Ok(Self { width, height, bits })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Bit {
        self.bits[(y * self.width + x) as usize]
    }

    /// The underlying row-major buffer.
    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    pub fn into_bits(self) -> Vec<Bit> {
        self.bits
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b == 1).count()
    }
}

/// Maps an 8-bit intensity into [0, 1].
pub fn normalize(intensity: Intensity) -> NormalizedIntensity {
    intensity as NormalizedIntensity / MAX_INTENSITY
}

/// Values below the threshold become 0, everything else (including the threshold itself) 1.
pub fn threshold(value: NormalizedIntensity) -> Bit {
    if value >= BINARY_THRESHOLD { 1 } else { 0 }
}

pub fn binarize(image: &GrayImage) -> BinaryImage {
    let (width, height) = image.dimensions();
    let bits = image
        .as_raw()
        .iter()
        .map(|&intensity| threshold(normalize(intensity)))
        .collect();
    BinaryImage { width, height, bits }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn normalize_spans_unit_interval() {
        assert_eq!(normalize(0), 0.0);
        assert_eq!(normalize(255), 1.0);
        assert!((normalize(51) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn threshold_boundary_maps_to_one() {
        assert_eq!(threshold(0.5), 1);
        assert_eq!(threshold(0.499_999), 0);
        assert_eq!(threshold(0.0), 0);
        assert_eq!(threshold(1.0), 1);
    }

    #[test]
    fn intensities_split_between_127_and_128() {
        assert_eq!(threshold(normalize(127)), 0);
        assert_eq!(threshold(normalize(128)), 1);
    }

    #[test]
    fn every_intensity_binarizes_to_zero_or_one() {
        let image = GrayImage::from_fn(16, 16, |x, y| Luma([(y * 16 + x) as u8]));
        let binary = binarize(&image);

        assert!(binary.bits().iter().all(|&b| b == 0 || b == 1));
        assert_eq!(binary.count_ones(), 128);
    }

    #[test]
    fn binarize_keeps_layout() {
        let image = GrayImage::from_fn(3, 2, |x, y| {
            if x == 2 && y == 1 { Luma([255]) } else { Luma([0]) }
        });
        let binary = binarize(&image);

        assert_eq!((binary.width(), binary.height()), (3, 2));
        assert_eq!(binary.bits(), &[0, 0, 0, 0, 0, 1]);
        assert_eq!(binary.get(2, 1), 1);
    }

    #[test]
    fn new_rejects_non_binary_values() {
        assert!(matches!(
            BinaryImage::new(2, 1, vec![0, 2]),
            Err(PrepError::NonBinaryPixel { index: 1, value: 2 })
        ));
        assert!(matches!(BinaryImage::new(2, 2, vec![0, 1]), Err(PrepError::Shape(_))));
        assert!(BinaryImage::new(2, 1, vec![1, 0]).is_ok());
    }
}
