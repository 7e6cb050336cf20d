//! Matchmaking: next-pair selection and comparison resolution
//!
//! `PairSelector` decides which two sites a caller should see next,
//! `MatchRecorder` resolves a submitted outcome atomically against the store.

pub mod recorder;
pub mod selector;

// Re-export commonly used types
pub use recorder::MatchRecorder;
pub use selector::PairSelector;
