use serde::{Deserialize, Serialize};

use super::stats::RawStatistics;

pub const MAX_COLOR_COUNT: f64 = 150.0;
pub const MAX_VARIANCE: f64 = 6000.0;
pub const MAX_EDGE_COUNT: f64 = 8000.0;

pub const COLOR_WEIGHT: f64 = 0.25;
pub const CONTRAST_WEIGHT: f64 = 0.4;
pub const EDGE_WEIGHT: f64 = 0.35;

pub const SCORE_MULTIPLIER: f64 = 6.0;
pub const BASE_SCORE: i32 = 2;

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 10;

/// Raw statistics scaled against their ceilings, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedStatistics {
    pub color_diversity: f64,
    pub contrast_level: f64,
    pub edge_density: f64,
}

impl NormalizedStatistics {
    pub fn from_raw(raw: &RawStatistics) -> Self {
        Self {
            color_diversity: (raw.distinct_color_count as f64 / MAX_COLOR_COUNT).min(1.0),
            contrast_level: (raw.luminance_variance / MAX_VARIANCE).min(1.0),
            edge_density: (raw.edge_count as f64 / MAX_EDGE_COUNT).min(1.0),
        }
    }

    pub fn weighted(&self) -> f64 {
        self.color_diversity * COLOR_WEIGHT
            + self.contrast_level * CONTRAST_WEIGHT
            + self.edge_density * EDGE_WEIGHT
    }

    /// `floor(weighted * 6) + 2`, in [2, 8].
    pub fn base_score(&self) -> i32 {
        (self.weighted() * SCORE_MULTIPLIER).floor() as i32 + BASE_SCORE
    }
}

/// One metric's high/mid/low nudges. Only the first matching branch fires.
struct Adjustment {
    name: &'static str,
    value: fn(&RawStatistics) -> f64,
    /// `(exclusive lower bound, delta)` pairs, checked in order.
    above: &'static [(f64, i32)],
    /// `(exclusive upper bound, delta)` checked after every `above` misses.
    below: (f64, i32),
}

impl Adjustment {
    fn delta(&self, raw: &RawStatistics) -> i32 {
        let value = (self.value)(raw);
        if let Some(&(_, delta)) = self.above.iter().find(|(bound, _)| value > *bound) {
            return delta;
        }
        let (bound, delta) = self.below;
        if value < bound { delta } else { 0 }
    }
}

const ADJUSTMENTS: [Adjustment; 3] = [
    Adjustment {
        name: "edges",
        value: |raw| raw.edge_count as f64,
        above: &[(6000.0, 2), (3000.0, 1)],
        below: (1000.0, -4),
    },
    Adjustment {
        name: "colors",
        value: |raw| raw.distinct_color_count as f64,
        above: &[(130.0, 1)],
        below: (70.0, -3),
    },
    Adjustment {
        name: "variance",
        value: |raw| raw.luminance_variance,
        above: &[(5000.0, 1)],
        below: (2000.0, -2),
    },
];

fn clamp_level(score: i32) -> i32 {
    score.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Apply the edge, color and variance nudges in that order to `base`,
/// clamping to [1, 10] after each one.
pub fn adjust(base: i32, raw: &RawStatistics) -> i32 {
    ADJUSTMENTS.iter().fold(base, |score, rule| {
        let delta = rule.delta(raw);
        let next = if delta == 0 { score } else { clamp_level(score + delta) };
        log::debug!("{} adjustment {:+}: {} -> {}", rule.name, delta, score, next);
        next
    })
}

/// Final chaos level in [1, 10].
pub fn chaos_level(raw: &RawStatistics, normalized: &NormalizedStatistics) -> u8 {
    clamp_level(adjust(normalized.base_score(), raw)) as u8
}
