use serde::{Deserialize, Serialize};

use super::raster::PixelBuffer;
use super::sampler::{self, luminance};

/// Luma difference a neighbour must exceed to count as an edge.
pub const EDGE_THRESHOLD: f64 = 30.0;

/// Horizontal step of the edge sweep. Every interior row is visited.
pub const EDGE_STEP_X: usize = 4;

/// Unnormalized measurements taken from one canonical buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawStatistics {
    pub distinct_color_count: usize,
    pub luminance_variance: f64,
    pub edge_count: usize,
}

impl RawStatistics {
    pub fn compute(buffer: &PixelBuffer) -> Self {
        let samples = sampler::sample(buffer);
        let stats = Self {
            distinct_color_count: samples.colors.len(),
            luminance_variance: population_variance(&samples.luminance),
            edge_count: count_edges(buffer),
        };

        log::debug!(
            "colors={} variance={:.2} edges={}",
            stats.distinct_color_count,
            stats.luminance_variance,
            stats.edge_count
        );

        stats
    }
}

/// Mean of squared deviations, dividing by n. Empty input yields 0.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Count interior positions whose right or lower neighbour differs in luma
/// by more than [`EDGE_THRESHOLD`].
///
/// Rows `1..=h-2` are all visited; columns start at 1 and advance by
/// [`EDGE_STEP_X`] up to `w-2`. This sweep is independent of the 16-byte
/// color sampling stride.
pub fn count_edges(buffer: &PixelBuffer) -> usize {
    let (width, height) = (buffer.width(), buffer.height());
    if width < 3 || height < 3 {
        return 0;
    }

    let luma_at = |x: u32, y: u32| {
        let [r, g, b] = buffer.rgb(x, y);
        luminance(r, g, b)
    };

    let mut edges = 0;
    for y in 1..height - 1 {
        for x in (1..width - 1).step_by(EDGE_STEP_X) {
            let current = luma_at(x, y);
            let right = luma_at(x + 1, y);
            let down = luma_at(x, y + 1);

            if (current - right).abs() > EDGE_THRESHOLD
                || (current - down).abs() > EDGE_THRESHOLD
            {
                edges += 1;
            }
        }
    }
    edges
}
