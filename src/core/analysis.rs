use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::raster::{self, PixelBuffer, ResampleFilter};
use super::score::{self, NormalizedStatistics};
use super::stats::RawStatistics;

/// Raw counts and percentage views of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub color_count: usize,
    /// Luminance variance rounded to the nearest integer.
    pub variance: u64,
    pub edge_count: usize,
    pub color_diversity: u8,
    pub contrast: u8,
    pub edge_complexity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub chaos_level: u8,
    pub metrics: Metrics,
}

/// `round(value * 100)` with halves rounding up.
pub fn percent(value: f64) -> u8 {
    (value * 100.0).round().clamp(0.0, 100.0) as u8
}

impl ScoreResult {
    pub fn assemble(raw: &RawStatistics, normalized: &NormalizedStatistics, chaos_level: u8) -> Self {
        Self {
            chaos_level,
            metrics: Metrics {
                color_count: raw.distinct_color_count,
                variance: raw.luminance_variance.round() as u64,
                edge_count: raw.edge_count,
                color_diversity: percent(normalized.color_diversity),
                contrast: percent(normalized.contrast_level),
                edge_complexity: percent(normalized.edge_density),
            },
        }
    }
}

/// Score an already canonical buffer.
pub fn analyze_buffer(buffer: &PixelBuffer) -> ScoreResult {
    let raw = RawStatistics::compute(buffer);
    let normalized = NormalizedStatistics::from_raw(&raw);
    let level = score::chaos_level(&raw, &normalized);
    ScoreResult::assemble(&raw, &normalized, level)
}

pub fn analyze_with_filter(image: &DynamicImage, filter: ResampleFilter) -> ScoreResult {
    analyze_buffer(&raster::rasterize(image, filter))
}

/// Stretch `image` onto the canonical canvas and score it.
pub fn analyze(image: &DynamicImage) -> ScoreResult {
    analyze_with_filter(image, ResampleFilter::default())
}
