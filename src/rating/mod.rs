//! ELO rating model
//!
//! Pure arithmetic for expected scores and rating deltas, built on the
//! skillratings crate's Elo curve.

pub mod elo;

// Re-export commonly used functions
pub use elo::{rating_delta, win_probability};
