//! Reef Rank - Duel matchmaking and ELO ranking engine for dive sites
//!
//! This crate ranks a fixed catalog of dive sites by presenting pairwise
//! duels, recording each outcome into an ELO rating, and deriving a
//! leaderboard with movement indicators. Storage and transport are external:
//! the engine operates against the traits in [`storage`] and is exposed to
//! callers through [`service::MatchupService`].

pub mod config;
pub mod error;
pub mod matchup;
pub mod ranking;
pub mod rating;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankError, Result};
pub use types::*;

// Re-export key components
pub use service::{MatchupService, RankEngine};
pub use storage::{MemoryStore, RankStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
