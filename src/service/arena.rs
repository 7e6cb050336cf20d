//! The duel arena: the engine facade callers integrate against
//!
//! `MatchupService` is the seam the transport layer (HTTP or otherwise,
//! outside this crate) depends on; `RankEngine` is the production
//! implementation, wiring the pair selector, match recorder, and leaderboard
//! view over one shared store.

use crate::config::AppConfig;
use crate::error::{RankError, Result};
use crate::matchup::{MatchRecorder, PairSelector};
use crate::ranking::{RankingView, RatingRebuild, RebuildSummary};
use crate::storage::RankStore;
use crate::types::{ActorId, ChampionHint, Matchup, RankedSite, ResolvedComparison, SiteId};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Statistics about engine operations
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Total matchups served to callers
    pub matchups_served: u64,
    /// Total comparisons accepted and persisted
    pub comparisons_recorded: u64,
    /// Submissions rejected as duplicates
    pub duplicates_rejected: u64,
    /// Leaderboard materializations
    pub leaderboards_built: u64,
}

/// The operations the engine exposes to its caller
#[async_trait]
pub trait MatchupService: Send + Sync {
    /// Next pair to present, honoring the champion hint when valid
    async fn select_pair(
        &self,
        actor: Option<ActorId>,
        champion: Option<ChampionHint>,
    ) -> Result<Matchup>;

    /// Resolve a submitted duel outcome
    async fn record_comparison(
        &self,
        winner_id: SiteId,
        loser_id: SiteId,
        actor: Option<ActorId>,
    ) -> Result<ResolvedComparison>;

    /// Ordered leaderboard with movement indicators
    async fn rankings(&self) -> Result<Vec<RankedSite>>;

    /// Delete one actor's comparison history; ratings keep their values
    async fn reset_actor_history(&self, actor: ActorId) -> Result<u64>;
}

/// Production engine over a shared rank store
pub struct RankEngine {
    store: Arc<dyn RankStore>,
    selector: PairSelector,
    recorder: MatchRecorder,
    view: RankingView,
    config: AppConfig,
    stats: Arc<RwLock<EngineStats>>,
}

impl RankEngine {
    /// Create an engine with default configuration
    pub fn new(store: Arc<dyn RankStore>) -> Self {
        Self::with_config(store, AppConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(store: Arc<dyn RankStore>, config: AppConfig) -> Self {
        Self {
            selector: PairSelector::new(store.clone(), config.matchup),
            recorder: MatchRecorder::new(store.clone(), config.rating),
            view: RankingView::new(store.clone()),
            store,
            config,
            stats: Arc::new(RwLock::new(EngineStats::default())),
        }
    }

    /// Snapshot of the engine's operation counters
    pub fn stats(&self) -> Result<EngineStats> {
        let stats = self.stats.read().map_err(|_| RankError::StorageError {
            message: "failed to acquire stats lock".to_string(),
        })?;
        Ok(stats.clone())
    }

    fn bump<F: FnOnce(&mut EngineStats)>(&self, update: F) {
        if let Ok(mut stats) = self.stats.write() {
            update(&mut stats);
        }
    }

    /// Offline administrative rebuild of every rating from the comparison
    /// log. Must not run while live votes are being accepted; the store
    /// transaction enforces the exclusion.
    pub fn rebuild_ratings(&self) -> Result<RebuildSummary> {
        info!("starting offline rating rebuild");
        RatingRebuild::new(self.store.clone(), self.config.rating).rebuild()
    }
}

#[async_trait]
impl MatchupService for RankEngine {
    async fn select_pair(
        &self,
        actor: Option<ActorId>,
        champion: Option<ChampionHint>,
    ) -> Result<Matchup> {
        debug!(
            "selecting pair for {} (champion hint: {:?})",
            actor.as_deref().unwrap_or("anonymous"),
            champion.map(|c| c.site_id),
        );
        let matchup = self.selector.select(actor.as_ref(), champion)?;
        self.bump(|s| s.matchups_served += 1);
        Ok(matchup)
    }

    async fn record_comparison(
        &self,
        winner_id: SiteId,
        loser_id: SiteId,
        actor: Option<ActorId>,
    ) -> Result<ResolvedComparison> {
        match self.recorder.record(winner_id, loser_id, actor.as_ref()) {
            Ok(resolved) => {
                self.bump(|s| s.comparisons_recorded += 1);
                Ok(resolved)
            }
            Err(e) => {
                if matches!(
                    e.downcast_ref::<RankError>(),
                    Some(RankError::DuplicateComparison { .. })
                ) {
                    self.bump(|s| s.duplicates_rejected += 1);
                }
                Err(e)
            }
        }
    }

    async fn rankings(&self) -> Result<Vec<RankedSite>> {
        let board = self.view.rankings()?;
        self.bump(|s| s.leaderboards_built += 1);
        Ok(board)
    }

    async fn reset_actor_history(&self, actor: ActorId) -> Result<u64> {
        let removed = self.store.clear_actor_history(&actor)?;
        info!("cleared {} comparisons for actor '{}'", removed, actor);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{HistoryReader, MemoryStore};
    use crate::types::DiveSite;

    fn engine_with(n: usize) -> RankEngine {
        let sites = (1..=n as i64)
            .map(|id| DiveSite::new(id, format!("Site {id}"), 1500.0))
            .collect();
        RankEngine::new(Arc::new(MemoryStore::with_sites(sites)))
    }

    #[tokio::test]
    async fn test_stats_track_operations() {
        let engine = engine_with(3);
        let actor = "diver".to_string();

        engine
            .select_pair(Some(actor.clone()), None)
            .await
            .unwrap();
        engine
            .record_comparison(1, 2, Some(actor.clone()))
            .await
            .unwrap();
        let duplicate = engine.record_comparison(2, 1, Some(actor.clone())).await;
        assert!(duplicate.is_err());
        engine.rankings().await.unwrap();

        let stats = engine.stats().unwrap();
        assert_eq!(stats.matchups_served, 1);
        assert_eq!(stats.comparisons_recorded, 1);
        assert_eq!(stats.duplicates_rejected, 1);
        assert_eq!(stats.leaderboards_built, 1);
    }

    #[tokio::test]
    async fn test_reset_actor_history_via_engine() {
        let engine = engine_with(3);
        let actor = "diver".to_string();

        engine
            .record_comparison(1, 2, Some(actor.clone()))
            .await
            .unwrap();
        engine
            .record_comparison(1, 3, Some(actor.clone()))
            .await
            .unwrap();

        let removed = engine.reset_actor_history(actor.clone()).await.unwrap();
        assert_eq!(removed, 2);

        // with history gone, the same pairs are votable again
        engine.record_comparison(1, 2, Some(actor)).await.unwrap();
    }

    #[tokio::test]
    async fn test_engine_is_usable_as_trait_object() {
        let engine: Arc<dyn MatchupService> = Arc::new(engine_with(2));
        let matchup = engine.select_pair(None, None).await.unwrap();
        assert_ne!(matchup.left.id, matchup.right.id);
    }

    #[tokio::test]
    async fn test_rebuild_through_engine() {
        let engine = engine_with(2);
        engine.record_comparison(1, 2, None).await.unwrap();

        let summary = engine.rebuild_ratings().unwrap();
        assert_eq!(summary.sites_reset, 2);
        assert_eq!(summary.comparisons_replayed, 1);
    }

    #[tokio::test]
    async fn test_custom_k_factor_flows_through() {
        let store = Arc::new(MemoryStore::with_sites(vec![
            DiveSite::new(1, "A", 1500.0),
            DiveSite::new(2, "B", 1500.0),
        ]));
        let mut config = AppConfig::default();
        config.rating.k_factor = 64.0;
        let engine = RankEngine::with_config(store.clone(), config);

        let resolved = engine.record_comparison(1, 2, None).await.unwrap();
        assert_eq!(resolved.points_changed, 32);
        assert_eq!(store.comparison_count().unwrap(), 1);
    }
}
