pub mod config;
pub mod core;
pub mod intake;
pub mod presentation;

pub use crate::core::{analyze, Metrics, ScoreResult};
