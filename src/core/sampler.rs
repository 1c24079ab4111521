use std::collections::HashSet;

use super::raster::PixelBuffer;

/// Distance in bytes between consecutive sampled pixels (every 4th pixel).
pub const SAMPLE_STRIDE_BYTES: usize = 16;

/// Width of one color bucket per channel; 256 / 32 gives 8 levels.
pub const COLOR_BUCKET_WIDTH: u8 = 32;

/// Perceptual luma of an RGB triple.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Quantized color: the bucket index of each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey(pub u8, pub u8, pub u8);

impl ColorKey {
    pub fn quantize(r: u8, g: u8, b: u8) -> Self {
        Self(
            r / COLOR_BUCKET_WIDTH,
            g / COLOR_BUCKET_WIDTH,
            b / COLOR_BUCKET_WIDTH,
        )
    }
}

/// What the strided pass over a buffer collects.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub colors: HashSet<ColorKey>,
    pub luminance: Vec<f64>,
}

/// Walk the raw bytes with a fixed 16-byte stride, keeping each sampled
/// pixel's color bucket and luma.
pub fn sample(buffer: &PixelBuffer) -> Samples {
    let data = buffer.as_bytes();
    let mut samples = Samples {
        colors: HashSet::new(),
        luminance: Vec::with_capacity(data.len() / SAMPLE_STRIDE_BYTES + 1),
    };

    for px in data.chunks(SAMPLE_STRIDE_BYTES) {
        let (r, g, b) = (px[0], px[1], px[2]);
        samples.colors.insert(ColorKey::quantize(r, g, b));
        samples.luminance.push(luminance(r, g, b));
    }

    samples
}
