//! Human-facing dressing around a [`ScoreResult`]: level titles, a flavor
//! comment and a handful of playful percentages. Nothing here feeds back
//! into the score.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

use crate::core::{Metrics, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChaosLevel {
    pub level: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

pub const CHAOS_LEVELS: [ChaosLevel; 10] = [
    ChaosLevel {
        level: 1,
        title: "Zen Void",
        description: "So tidy the desk has become pure emptiness",
        emoji: "🧘",
    },
    ChaosLevel {
        level: 2,
        title: "Minimalist",
        description: "A refined workspace where simplicity stands out",
        emoji: "✨",
    },
    ChaosLevel {
        level: 3,
        title: "Ordinary",
        description: "A perfectly everyday desk. Peace itself",
        emoji: "😊",
    },
    ChaosLevel {
        level: 4,
        title: "Creative Chaos",
        description: "An artist's workbench overflowing with inspiration",
        emoji: "🎨",
    },
    ChaosLevel {
        level: 5,
        title: "Researcher's Desk",
        description: "Traces of intellectual pursuit, a mess driven by curiosity",
        emoji: "🔬",
    },
    ChaosLevel {
        level: 6,
        title: "Proof of Genius",
        description: "Einstein-grade clutter. Genius desks are original too",
        emoji: "🧠",
    },
    ChaosLevel {
        level: 7,
        title: "Adventurer's Base",
        description: "Like an RPG item shop. Anything could turn up",
        emoji: "🗡️",
    },
    ChaosLevel {
        level: 8,
        title: "Archaeological Value",
        description: "Layers of civilisation stacked with historical significance",
        emoji: "🏺",
    },
    ChaosLevel {
        level: 9,
        title: "Interdimensional Portal",
        description: "Beyond the laws of physics, a gateway to another dimension",
        emoji: "🌀",
    },
    ChaosLevel {
        level: 10,
        title: "Cosmic Mystery",
        description: "Big Bang-scale chaos. A new universe may be forming",
        emoji: "🌌",
    },
];

pub const COMMENTS: [&str; 7] = [
    "There is a story in the way this desk is arranged",
    "A fine balance between creativity and practicality",
    "Great ideas are bound to come from this desk",
    "A desk reflects a rich inner life",
    "A reminder that some things matter more than tidiness",
    "This desk is full of its owner's personality",
    "A new aesthetic, beyond mere function",
];

impl ChaosLevel {
    /// Table entry for a level in [1, 10]; out-of-range values are clamped.
    pub fn for_level(level: u8) -> &'static ChaosLevel {
        &CHAOS_LEVELS[level.clamp(1, 10) as usize - 1]
    }
}

impl fmt::Display for ChaosLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2} {} {}: {}", self.level, self.emoji, self.title, self.description)
    }
}

/// Randomized percentages shown next to the real metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Details {
    pub creativity: u8,
    pub organization: u8,
    pub inspiration: u8,
    pub mystery: u8,
}

impl Details {
    /// Shown when the image could not be read.
    pub const PLACEHOLDER: Details = Details {
        creativity: 75,
        organization: 40,
        inspiration: 88,
        mystery: 60,
    };

    pub fn roll<R: Rng + ?Sized>(result: &ScoreResult, rng: &mut R) -> Self {
        let level = u32::from(result.chaos_level);
        let metrics = &result.metrics;

        let creativity = (u32::from(metrics.color_diversity) + rng.gen_range(0..20)).min(100);
        let organization = (110u32.saturating_sub(level * 10) + rng.gen_range(0..20)).max(10);
        let inspiration =
            (u32::from(metrics.edge_complexity) + rng.gen_range(0..30) + 50).min(100);
        let mystery = (level * 8 + rng.gen_range(0..30)).min(100);

        Self {
            creativity: creativity as u8,
            organization: organization as u8,
            inspiration: inspiration as u8,
            mystery: mystery as u8,
        }
    }
}

pub fn pick_comment<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    COMMENTS.choose(rng).copied().unwrap_or(COMMENTS[0])
}

/// Everything displayed for one image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(flatten)]
    pub level: ChaosLevel,
    pub comment: &'static str,
    pub details: Details,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    pub analysis_date: String,
    /// Set when the level is a random stand-in for an unreadable image.
    pub degraded: bool,
}

impl Report {
    pub fn new<R: Rng + ?Sized>(result: &ScoreResult, rng: &mut R, analysis_date: String) -> Self {
        Self {
            level: *ChaosLevel::for_level(result.chaos_level),
            comment: pick_comment(rng),
            details: Details::roll(result, rng),
            metrics: Some(result.metrics),
            analysis_date,
            degraded: false,
        }
    }

    /// Stand-in report for an image that failed to decode: a random level,
    /// placeholder details and no metrics.
    pub fn fallback<R: Rng + ?Sized>(rng: &mut R, analysis_date: String) -> Self {
        let level = rng.gen_range(1..=10u8);
        Self {
            level: *ChaosLevel::for_level(level),
            comment: pick_comment(rng),
            details: Details::PLACEHOLDER,
            metrics: None,
            analysis_date,
            degraded: true,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  Level {}/10: {}", self.level.emoji, self.level.level, self.level.title)?;
        writeln!(f, "   {}", self.level.description)?;
        writeln!(f, "   \"{}\"", self.comment)?;
        if let Some(m) = &self.metrics {
            writeln!(
                f,
                "   colors: {} ({}%)  variance: {} ({}%)  edges: {} ({}%)",
                m.color_count, m.color_diversity, m.variance, m.contrast, m.edge_count, m.edge_complexity
            )?;
        }
        let d = &self.details;
        writeln!(
            f,
            "   creativity {}%  organization {}%  inspiration {}%  mystery {}%",
            d.creativity, d.organization, d.inspiration, d.mystery
        )?;
        write!(f, "   analysed {}", self.analysis_date)?;
        if self.degraded {
            write!(f, " (image unreadable, level is a guess)")?;
        }
        Ok(())
    }
}
