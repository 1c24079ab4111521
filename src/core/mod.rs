//! Image chaos scoring.
//!
//! An image is stretched onto a fixed 400x300 canvas, three statistics
//! (distinct color buckets, luma variance, edge count) are measured on it,
//! and those are folded into a level between 1 and 10.

pub mod analysis;
pub mod raster;
pub mod sampler;
pub mod score;
pub mod stats;

pub use analysis::{analyze, analyze_buffer, analyze_with_filter, Metrics, ScoreResult};
pub use raster::{PixelBuffer, ResampleFilter};
pub use score::NormalizedStatistics;
pub use stats::RawStatistics;
