//! Engine facade wiring the selector, recorder, and leaderboard together

pub mod arena;

// Re-export commonly used types
pub use arena::{EngineStats, MatchupService, RankEngine};
