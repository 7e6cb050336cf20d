//! Leaderboard view
//!
//! Orders the catalog by rating and reports how far each site moved since the
//! leaderboard was last materialized. The movement indicator is a snapshot
//! diff, not a history: after computing ranks, the new positions are written
//! back as each site's previous rank so the next call diffs against this one.

use crate::error::Result;
use crate::storage::RankStore;
use crate::types::{RankedSite, SiteId};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::warn;

/// Derives the ordered leaderboard
pub struct RankingView {
    store: Arc<dyn RankStore>,
}

impl RankingView {
    pub fn new(store: Arc<dyn RankStore>) -> Self {
        Self { store }
    }

    /// Current leaderboard, best rating first
    ///
    /// Ties break by ascending site id so ranks are deterministic. The rank
    /// snapshot write is best-effort: a storage failure there is logged and
    /// the computed leaderboard is still returned, since the movement
    /// indicator is a cosmetic hint.
    pub fn rankings(&self) -> Result<Vec<RankedSite>> {
        let mut sites = self.store.list_sites()?;
        sites.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let ranked: Vec<RankedSite> = sites
            .into_iter()
            .enumerate()
            .map(|(index, mut site)| {
                let rank = (index + 1) as u32;
                let rank_change = if site.previous_rank > 0 {
                    site.previous_rank as i64 - rank as i64
                } else {
                    0
                };
                site.current_rank = rank;
                RankedSite {
                    site,
                    rank,
                    rank_change,
                }
            })
            .collect();

        let snapshot: Vec<(SiteId, u32)> =
            ranked.iter().map(|entry| (entry.site.id, entry.rank)).collect();
        if let Err(e) = self.store.store_rank_snapshot(&snapshot) {
            warn!("failed to persist rank snapshot: {}", e);
        }

        Ok(ranked)
    }
}
