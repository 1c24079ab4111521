use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};

/// Width of the canvas every image is stretched onto before analysis.
pub const CANONICAL_WIDTH: u32 = 400;
/// Height of the canvas every image is stretched onto before analysis.
pub const CANONICAL_HEIGHT: u32 = 300;

/// Bytes per pixel in a [`PixelBuffer`] (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Resampling filter used when stretching onto the canonical canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Row-major RGBA bytes at a fixed resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes. Returns `None` when `data` does not hold
    /// exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of the pixel at (x, y).
    pub fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * BYTES_PER_PIXEL
    }

    /// RGB channels of the pixel at (x, y).
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

/// Zero the color of fully transparent pixels, the way a 2D canvas reads
/// them back.
fn clear_transparent(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        if px[3] == 0 {
            px.0 = [0, 0, 0, 0];
        }
    }
}

/// Stretch `image` onto the canonical 400x300 canvas, ignoring aspect ratio.
///
/// Sources that are already canonical are copied without resampling so
/// synthetic fixtures keep their exact pixel values. Pixels with zero alpha
/// come out as `(0, 0, 0, 0)` whatever color they carried.
pub fn rasterize(image: &DynamicImage, filter: ResampleFilter) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let mut rgba = image.to_rgba8();

    if (width, height) == (CANONICAL_WIDTH, CANONICAL_HEIGHT) {
        clear_transparent(&mut rgba);
        return PixelBuffer::from(rgba);
    }

    log::debug!(
        "Stretching {}x{} source onto {}x{} canvas ({:?})",
        width,
        height,
        CANONICAL_WIDTH,
        CANONICAL_HEIGHT,
        filter
    );

    let mut resized = imageops::resize(&rgba, CANONICAL_WIDTH, CANONICAL_HEIGHT, filter.into());
    clear_transparent(&mut resized);
    PixelBuffer::from(resized)
}
