//! Comparison resolution
//!
//! `MatchRecorder` turns a submitted winner/loser pair into exactly one
//! persisted `ResolvedComparison`. The duplicate check, the rating reads, and
//! all three writes happen inside one store transaction, so a vote either
//! lands completely or not at all, and two concurrent submissions of the same
//! pair by the same actor can never both succeed.

use crate::config::EloSettings;
use crate::error::{RankError, Result};
use crate::rating::rating_delta;
use crate::storage::{DuelOutcome, RankStore};
use crate::types::{ActorId, PairKey, ResolvedComparison, SiteId};
use std::sync::Arc;
use tracing::info;

/// Resolves submitted duels against the store
pub struct MatchRecorder {
    store: Arc<dyn RankStore>,
    settings: EloSettings,
}

impl MatchRecorder {
    pub fn new(store: Arc<dyn RankStore>, settings: EloSettings) -> Self {
        Self { store, settings }
    }

    /// Resolve one comparison: winner beats loser, voted by `actor`
    ///
    /// Anonymous submissions (`actor = None`) skip the duplicate check; there
    /// is no identity to attribute the pair to, and the anonymous selector
    /// explicitly allows rematches.
    pub fn record(
        &self,
        winner_id: SiteId,
        loser_id: SiteId,
        actor: Option<&ActorId>,
    ) -> Result<ResolvedComparison> {
        if winner_id == loser_id {
            return Err(RankError::SelfComparison { site_id: winner_id }.into());
        }

        let mut txn = self.store.begin()?;

        let winner = txn
            .get_site(winner_id)?
            .ok_or(RankError::UnknownSite { site_id: winner_id })?;
        let loser = txn
            .get_site(loser_id)?
            .ok_or(RankError::UnknownSite { site_id: loser_id })?;

        if let Some(actor) = actor {
            let pair = PairKey::new(winner_id, loser_id);
            if txn.has_voted_pair(actor, pair)? {
                return Err(RankError::DuplicateComparison {
                    actor: actor.clone(),
                    pair,
                }
                .into());
            }
        }

        // Ratings were read inside the transaction, so the delta is computed
        // against values no concurrent vote can have moved.
        let delta = rating_delta(winner.rating, loser.rating, self.settings.k_factor);

        txn.update_site_rating(winner_id, winner.rating + delta as f64, DuelOutcome::Won)?;
        txn.update_site_rating(loser_id, loser.rating - delta as f64, DuelOutcome::Lost)?;
        let resolved = txn.append_comparison(winner_id, loser_id, delta, actor.cloned())?;
        txn.commit()?;

        info!(
            "resolved comparison {}: {} beat {} for {} points (actor: {})",
            resolved.id,
            winner_id,
            loser_id,
            delta,
            actor.map_or("anonymous", |a| a.as_str()),
        );
        Ok(resolved)
    }
}
