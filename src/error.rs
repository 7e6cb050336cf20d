//! Error types for the duel ranking engine
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the crate. Expected matchmaking signals (exhaustion,
//! duplicate votes) live in the same enum so callers can downcast and surface
//! them as informational states rather than server faults.

use crate::types::{ActorId, PairKey, SiteId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// The catalog holds fewer than two sites; no matchup can be formed.
    #[error("catalog must contain at least two sites, found {found}")]
    InsufficientCatalog { found: usize },

    /// The actor has voted on every distinct pair in the catalog. Terminal
    /// signal, not a retryable failure.
    #[error("actor '{actor}' has completed all {total_pairs} matchups")]
    AllMatchupsCompleted { actor: ActorId, total_pairs: usize },

    /// The actor already resolved this unordered pair.
    #[error("actor '{actor}' already voted on pair {pair}")]
    DuplicateComparison { actor: ActorId, pair: PairKey },

    /// A referenced site does not exist in the catalog.
    #[error("unknown site: {site_id}")]
    UnknownSite { site_id: SiteId },

    /// Winner and loser must be two different sites.
    #[error("site {site_id} cannot be compared against itself")]
    SelfComparison { site_id: SiteId },

    #[error("storage error: {message}")]
    StorageError { message: String },
}

impl RankError {
    /// Whether this error is an expected matchmaking signal that the caller
    /// should surface to the end user rather than treat as a server fault.
    pub fn is_expected_signal(&self) -> bool {
        matches!(
            self,
            RankError::AllMatchupsCompleted { .. }
                | RankError::InsufficientCatalog { .. }
                | RankError::DuplicateComparison { .. }
        )
    }
}
