//! In-memory store implementation
//!
//! `MemoryStore` keeps the catalog and the comparison log behind a single
//! mutex. `begin` holds that mutex for the life of the transaction, so
//! transactions are fully serialized: the duplicate-check-then-append
//! sequence is linearizable and the paired rating updates commit together or
//! not at all. Writes are staged on a scratch copy of the state and only
//! written back on commit; a dropped transaction leaves the store unchanged.

use crate::error::{RankError, Result};
use crate::storage::{CatalogReader, DuelOutcome, HistoryReader, RankStore, StoreTxn};
use crate::types::{ActorId, DiveSite, PairKey, ResolvedComparison, SiteId};
use crate::utils::{current_timestamp, generate_comparison_id};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct StoreState {
    sites: BTreeMap<SiteId, DiveSite>,
    comparisons: Vec<ResolvedComparison>,
}

impl StoreState {
    fn voted_pairs(&self, actor: Option<&ActorId>) -> HashSet<PairKey> {
        self.comparisons
            .iter()
            .filter(|c| actor.is_none() || c.actor.as_ref() == actor)
            .map(|c| c.pair())
            .collect()
    }
}

/// In-memory rank store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given catalog
    pub fn with_sites(sites: Vec<DiveSite>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().expect("fresh mutex cannot be poisoned");
            for site in sites {
                state.sites.insert(site.id, site);
            }
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| {
            RankError::StorageError {
                message: "store mutex poisoned".to_string(),
            }
            .into()
        })
    }
}

impl CatalogReader for MemoryStore {
    fn list_sites(&self) -> Result<Vec<DiveSite>> {
        let state = self.lock()?;
        Ok(state.sites.values().cloned().collect())
    }

    fn get_site(&self, site_id: SiteId) -> Result<Option<DiveSite>> {
        let state = self.lock()?;
        Ok(state.sites.get(&site_id).cloned())
    }

    fn site_count(&self) -> Result<usize> {
        let state = self.lock()?;
        Ok(state.sites.len())
    }
}

impl HistoryReader for MemoryStore {
    fn voted_pairs(&self, actor: Option<&ActorId>) -> Result<HashSet<PairKey>> {
        let state = self.lock()?;
        Ok(state.voted_pairs(actor))
    }

    fn distinct_pair_count(&self, actor: Option<&ActorId>) -> Result<usize> {
        let state = self.lock()?;
        Ok(state.voted_pairs(actor).len())
    }

    fn opponents_faced(
        &self,
        site_id: SiteId,
        actor: Option<&ActorId>,
    ) -> Result<HashSet<SiteId>> {
        let state = self.lock()?;
        let mut opponents = HashSet::new();
        for comparison in state
            .comparisons
            .iter()
            .filter(|c| actor.is_none() || c.actor.as_ref() == actor)
        {
            if comparison.winner_id == site_id {
                opponents.insert(comparison.loser_id);
            } else if comparison.loser_id == site_id {
                opponents.insert(comparison.winner_id);
            }
        }
        Ok(opponents)
    }

    fn comparisons_chronological(&self) -> Result<Vec<ResolvedComparison>> {
        let state = self.lock()?;
        let mut log = state.comparisons.clone();
        log.sort_by_key(|c| c.decided_at);
        Ok(log)
    }

    fn comparison_count(&self) -> Result<usize> {
        let state = self.lock()?;
        Ok(state.comparisons.len())
    }
}

impl RankStore for MemoryStore {
    fn begin(&self) -> Result<Box<dyn StoreTxn + '_>> {
        let guard = self.lock()?;
        let scratch = guard.clone();
        Ok(Box::new(MemoryTxn { guard, scratch }))
    }

    fn store_rank_snapshot(&self, ranks: &[(SiteId, u32)]) -> Result<()> {
        let mut state = self.lock()?;
        for &(site_id, rank) in ranks {
            if let Some(site) = state.sites.get_mut(&site_id) {
                site.previous_rank = rank;
                site.current_rank = rank;
            }
        }
        Ok(())
    }

    fn clear_actor_history(&self, actor: &ActorId) -> Result<u64> {
        let mut state = self.lock()?;
        let before = state.comparisons.len();
        state
            .comparisons
            .retain(|c| c.actor.as_deref() != Some(actor.as_str()));
        Ok((before - state.comparisons.len()) as u64)
    }
}

/// A serialized transaction over the in-memory state
///
/// Holds the store mutex until committed or dropped; mutations land on the
/// scratch copy and replace the shared state only on commit.
struct MemoryTxn<'a> {
    guard: MutexGuard<'a, StoreState>,
    scratch: StoreState,
}

impl StoreTxn for MemoryTxn<'_> {
    fn get_site(&self, site_id: SiteId) -> Result<Option<DiveSite>> {
        Ok(self.scratch.sites.get(&site_id).cloned())
    }

    fn has_voted_pair(&self, actor: &ActorId, pair: PairKey) -> Result<bool> {
        Ok(self
            .scratch
            .comparisons
            .iter()
            .any(|c| c.actor.as_ref() == Some(actor) && c.pair() == pair))
    }

    fn update_site_rating(
        &mut self,
        site_id: SiteId,
        new_rating: f64,
        outcome: DuelOutcome,
    ) -> Result<()> {
        let site = self
            .scratch
            .sites
            .get_mut(&site_id)
            .ok_or(RankError::UnknownSite { site_id })?;
        site.rating = new_rating;
        match outcome {
            DuelOutcome::Won => site.wins += 1,
            DuelOutcome::Lost => site.losses += 1,
        }
        Ok(())
    }

    fn append_comparison(
        &mut self,
        winner_id: SiteId,
        loser_id: SiteId,
        points_changed: i64,
        actor: Option<ActorId>,
    ) -> Result<ResolvedComparison> {
        let comparison = ResolvedComparison {
            id: generate_comparison_id(),
            winner_id,
            loser_id,
            points_changed,
            actor,
            decided_at: current_timestamp(),
        };
        self.scratch.comparisons.push(comparison.clone());
        Ok(comparison)
    }

    fn reset_sites(&mut self, initial_rating: f64) -> Result<()> {
        for site in self.scratch.sites.values_mut() {
            site.rating = initial_rating;
            site.wins = 0;
            site.losses = 0;
        }
        Ok(())
    }

    fn comparisons_chronological(&self) -> Result<Vec<ResolvedComparison>> {
        let mut log = self.scratch.comparisons.clone();
        log.sort_by_key(|c| c.decided_at);
        Ok(log)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        *self.guard = std::mem::take(&mut self.scratch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> MemoryStore {
        MemoryStore::with_sites(vec![
            DiveSite::new(1, "Blue Hole", 1500.0),
            DiveSite::new(2, "Shark Alley", 1500.0),
            DiveSite::new(3, "Coral Garden", 1500.0),
        ])
    }

    #[test]
    fn test_seeding_and_reads() {
        let store = seeded_store();
        assert_eq!(store.site_count().unwrap(), 3);
        assert_eq!(store.comparison_count().unwrap(), 0);

        let site = store.get_site(2).unwrap().unwrap();
        assert_eq!(site.name, "Shark Alley");
        assert_eq!(site.rating, 1500.0);

        assert!(store.get_site(99).unwrap().is_none());
    }

    #[test]
    fn test_commit_makes_writes_visible() {
        let store = seeded_store();

        let mut txn = store.begin().unwrap();
        txn.update_site_rating(1, 1516.0, DuelOutcome::Won).unwrap();
        txn.update_site_rating(2, 1484.0, DuelOutcome::Lost)
            .unwrap();
        txn.append_comparison(1, 2, 16, Some("diver".to_string()))
            .unwrap();
        txn.commit().unwrap();

        let winner = store.get_site(1).unwrap().unwrap();
        assert_eq!(winner.rating, 1516.0);
        assert_eq!(winner.wins, 1);

        let loser = store.get_site(2).unwrap().unwrap();
        assert_eq!(loser.rating, 1484.0);
        assert_eq!(loser.losses, 1);

        assert_eq!(store.comparison_count().unwrap(), 1);
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let store = seeded_store();

        {
            let mut txn = store.begin().unwrap();
            txn.update_site_rating(1, 9999.0, DuelOutcome::Won).unwrap();
            txn.append_comparison(1, 2, 16, None).unwrap();
            // dropped without commit
        }

        assert_eq!(store.get_site(1).unwrap().unwrap().rating, 1500.0);
        assert_eq!(store.comparison_count().unwrap(), 0);
    }

    #[test]
    fn test_txn_reads_observe_staged_writes() {
        let store = seeded_store();

        let mut txn = store.begin().unwrap();
        let actor = "diver".to_string();
        let pair = PairKey::new(1, 2);
        assert!(!txn.has_voted_pair(&actor, pair).unwrap());

        txn.append_comparison(1, 2, 16, Some(actor.clone())).unwrap();
        assert!(txn.has_voted_pair(&actor, pair).unwrap());

        txn.update_site_rating(1, 1516.0, DuelOutcome::Won).unwrap();
        assert_eq!(txn.get_site(1).unwrap().unwrap().rating, 1516.0);
    }

    #[test]
    fn test_update_unknown_site_fails() {
        let store = seeded_store();
        let mut txn = store.begin().unwrap();
        let err = txn
            .update_site_rating(99, 1500.0, DuelOutcome::Won)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RankError>(),
            Some(RankError::UnknownSite { site_id: 99 })
        ));
    }

    #[test]
    fn test_history_scoping() {
        let store = seeded_store();

        let mut txn = store.begin().unwrap();
        txn.append_comparison(1, 2, 16, Some("ana".to_string()))
            .unwrap();
        txn.append_comparison(2, 3, 16, Some("ben".to_string()))
            .unwrap();
        txn.append_comparison(1, 3, 16, None).unwrap();
        txn.commit().unwrap();

        let ana = "ana".to_string();
        let ana_pairs = store.voted_pairs(Some(&ana)).unwrap();
        assert_eq!(ana_pairs.len(), 1);
        assert!(ana_pairs.contains(&PairKey::new(1, 2)));

        // global scope sees everything
        assert_eq!(store.distinct_pair_count(None).unwrap(), 3);

        let global_opponents = store.opponents_faced(1, None).unwrap();
        assert_eq!(global_opponents, HashSet::from([2, 3]));

        let ana_opponents = store.opponents_faced(1, Some(&ana)).unwrap();
        assert_eq!(ana_opponents, HashSet::from([2]));
    }

    #[test]
    fn test_distinct_pair_count_ignores_repeats() {
        let store = seeded_store();

        let mut txn = store.begin().unwrap();
        // anonymous traffic may resolve the same pair twice, in both orders
        txn.append_comparison(1, 2, 16, None).unwrap();
        txn.append_comparison(2, 1, 16, None).unwrap();
        txn.commit().unwrap();

        assert_eq!(store.comparison_count().unwrap(), 2);
        assert_eq!(store.distinct_pair_count(None).unwrap(), 1);
    }

    #[test]
    fn test_clear_actor_history() {
        let store = seeded_store();

        let mut txn = store.begin().unwrap();
        txn.append_comparison(1, 2, 16, Some("ana".to_string()))
            .unwrap();
        txn.append_comparison(1, 3, 16, Some("ana".to_string()))
            .unwrap();
        txn.append_comparison(2, 3, 16, Some("ben".to_string()))
            .unwrap();
        txn.commit().unwrap();

        let removed = store.clear_actor_history(&"ana".to_string()).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.comparison_count().unwrap(), 1);

        // ratings are untouched by a history reset
        assert_eq!(store.get_site(1).unwrap().unwrap().rating, 1500.0);
    }

    #[test]
    fn test_rank_snapshot() {
        let store = seeded_store();
        store
            .store_rank_snapshot(&[(1, 1), (2, 2), (3, 3)])
            .unwrap();

        let site = store.get_site(2).unwrap().unwrap();
        assert_eq!(site.previous_rank, 2);
        assert_eq!(site.current_rank, 2);
    }

    #[test]
    fn test_reset_sites() {
        let store = seeded_store();

        let mut txn = store.begin().unwrap();
        txn.update_site_rating(1, 1600.0, DuelOutcome::Won).unwrap();
        txn.update_site_rating(2, 1400.0, DuelOutcome::Lost)
            .unwrap();
        txn.reset_sites(1500.0).unwrap();
        txn.commit().unwrap();

        let site = store.get_site(1).unwrap().unwrap();
        assert_eq!(site.rating, 1500.0);
        assert_eq!(site.wins, 0);
        assert_eq!(site.losses, 0);
    }
}
