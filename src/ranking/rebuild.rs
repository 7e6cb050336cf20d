//! Offline rating rebuild
//!
//! Administrative batch job that recomputes every rating from the comparison
//! log: reset all sites to the initial rating, then replay the log strictly
//! in resolution-time order, recomputing each delta from the evolving state.
//! The whole replay runs inside a single store transaction, so it cannot
//! interleave with live vote recording. Historical rows keep their original
//! `points_changed`; the log is immutable.
//!
//! This is the recovery path after an actor's history has been bulk-deleted,
//! not part of live request handling.

use crate::config::EloSettings;
use crate::error::{RankError, Result};
use crate::rating::rating_delta;
use crate::storage::{DuelOutcome, RankStore};
use std::sync::Arc;
use tracing::info;

/// Outcome of a rebuild run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub sites_reset: usize,
    pub comparisons_replayed: usize,
}

/// Replays the comparison log into a fresh rating state
pub struct RatingRebuild {
    store: Arc<dyn RankStore>,
    settings: EloSettings,
}

impl RatingRebuild {
    pub fn new(store: Arc<dyn RankStore>, settings: EloSettings) -> Self {
        Self { store, settings }
    }

    /// Run the rebuild. All-or-nothing: a failed replay leaves the previous
    /// ratings in place.
    pub fn rebuild(&self) -> Result<RebuildSummary> {
        let sites_reset = self.store.site_count()?;

        let mut txn = self.store.begin()?;
        txn.reset_sites(self.settings.initial_rating)?;

        let log = txn.comparisons_chronological()?;
        for comparison in &log {
            let winner = txn
                .get_site(comparison.winner_id)?
                .ok_or(RankError::UnknownSite {
                    site_id: comparison.winner_id,
                })?;
            let loser = txn
                .get_site(comparison.loser_id)?
                .ok_or(RankError::UnknownSite {
                    site_id: comparison.loser_id,
                })?;

            let delta = rating_delta(winner.rating, loser.rating, self.settings.k_factor);
            txn.update_site_rating(
                comparison.winner_id,
                winner.rating + delta as f64,
                DuelOutcome::Won,
            )?;
            txn.update_site_rating(
                comparison.loser_id,
                loser.rating - delta as f64,
                DuelOutcome::Lost,
            )?;
        }
        txn.commit()?;

        let summary = RebuildSummary {
            sites_reset,
            comparisons_replayed: log.len(),
        };
        info!(
            "rating rebuild complete: {} sites reset, {} comparisons replayed",
            summary.sites_reset, summary.comparisons_replayed
        );
        Ok(summary)
    }
}
