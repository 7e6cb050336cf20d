//! Test fixtures and mock implementations for integration testing

use reef_rank::error::{RankError, Result};
use reef_rank::storage::{CatalogReader, HistoryReader, MemoryStore, RankStore, StoreTxn};
use reef_rank::types::{ActorId, DiveSite, PairKey, ResolvedComparison, SiteId};
use std::collections::HashSet;
use std::sync::Arc;

/// Seed `n` evenly rated sites with ids 1..=n
pub fn seed_sites(n: usize) -> Vec<DiveSite> {
    (1..=n as SiteId)
        .map(|id| DiveSite::new(id, format!("Dive Site #{id}"), 1500.0))
        .collect()
}

/// A small named catalog for scenario tests
pub fn reef_catalog() -> Vec<DiveSite> {
    vec![
        DiveSite::new(1, "Blue Hole", 1500.0),
        DiveSite::new(2, "Shark Alley", 1500.0),
        DiveSite::new(3, "Coral Garden", 1500.0),
    ]
}

/// Store wrapper whose rank-snapshot writes always fail, for exercising the
/// best-effort persistence path
#[derive(Debug)]
pub struct FailingSnapshotStore {
    inner: Arc<MemoryStore>,
}

impl FailingSnapshotStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self { inner }
    }
}

impl CatalogReader for FailingSnapshotStore {
    fn list_sites(&self) -> Result<Vec<DiveSite>> {
        self.inner.list_sites()
    }

    fn get_site(&self, site_id: SiteId) -> Result<Option<DiveSite>> {
        self.inner.get_site(site_id)
    }

    fn site_count(&self) -> Result<usize> {
        self.inner.site_count()
    }
}

impl HistoryReader for FailingSnapshotStore {
    fn voted_pairs(&self, actor: Option<&ActorId>) -> Result<HashSet<PairKey>> {
        self.inner.voted_pairs(actor)
    }

    fn distinct_pair_count(&self, actor: Option<&ActorId>) -> Result<usize> {
        self.inner.distinct_pair_count(actor)
    }

    fn opponents_faced(
        &self,
        site_id: SiteId,
        actor: Option<&ActorId>,
    ) -> Result<HashSet<SiteId>> {
        self.inner.opponents_faced(site_id, actor)
    }

    fn comparisons_chronological(&self) -> Result<Vec<ResolvedComparison>> {
        self.inner.comparisons_chronological()
    }

    fn comparison_count(&self) -> Result<usize> {
        self.inner.comparison_count()
    }
}

impl RankStore for FailingSnapshotStore {
    fn begin(&self) -> Result<Box<dyn StoreTxn + '_>> {
        self.inner.begin()
    }

    fn store_rank_snapshot(&self, _ranks: &[(SiteId, u32)]) -> Result<()> {
        Err(RankError::StorageError {
            message: "snapshot writes disabled for this test".to_string(),
        }
        .into())
    }

    fn clear_actor_history(&self, actor: &ActorId) -> Result<u64> {
        self.inner.clear_actor_history(actor)
    }
}
