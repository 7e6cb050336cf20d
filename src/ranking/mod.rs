//! Leaderboard derivation and offline rating maintenance

pub mod rebuild;
pub mod view;

// Re-export commonly used types
pub use rebuild::{RatingRebuild, RebuildSummary};
pub use view::RankingView;
