//! Storage interfaces for the catalog and the comparison log
//!
//! The engine is storage-agnostic: it reads sites and history through the
//! `CatalogReader` and `HistoryReader` traits and performs every mutation of
//! rating state inside a `StoreTxn`, an all-or-nothing unit of work handed
//! out by `RankStore::begin`. The in-memory reference implementation lives in
//! `memory`; a database-backed store would map `StoreTxn` onto a real
//! transaction with a unique constraint on (actor, normalized pair).

pub mod memory;

// Re-export commonly used types
pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{ActorId, DiveSite, PairKey, ResolvedComparison, SiteId};
use std::collections::HashSet;

/// Which side of a duel a site ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelOutcome {
    Won,
    Lost,
}

/// Read access to the site catalog
pub trait CatalogReader: Send + Sync {
    /// All sites in the catalog
    fn list_sites(&self) -> Result<Vec<DiveSite>>;

    /// Look up a single site
    fn get_site(&self, site_id: SiteId) -> Result<Option<DiveSite>>;

    /// Number of sites in the catalog
    fn site_count(&self) -> Result<usize>;
}

/// Read access to the append-only comparison log
pub trait HistoryReader: Send + Sync {
    /// Distinct normalized pairs voted on by one actor, or globally for `None`
    fn voted_pairs(&self, actor: Option<&ActorId>) -> Result<HashSet<PairKey>>;

    /// Count of distinct normalized pairs voted on by one actor, or globally
    fn distinct_pair_count(&self, actor: Option<&ActorId>) -> Result<usize>;

    /// Every opponent `site_id` has faced, as winner or loser, scoped to one
    /// actor's votes or to the full log for `None`
    fn opponents_faced(&self, site_id: SiteId, actor: Option<&ActorId>)
        -> Result<HashSet<SiteId>>;

    /// The full log in ascending resolution-time order
    fn comparisons_chronological(&self) -> Result<Vec<ResolvedComparison>>;

    /// Total number of resolved comparisons
    fn comparison_count(&self) -> Result<usize>;
}

/// An atomic unit of work against the store
///
/// Reads observe staged writes from the same transaction. Nothing becomes
/// visible to other callers until `commit`; dropping an uncommitted
/// transaction rolls everything back. Implementations must make the
/// duplicate-check-then-append sequence linearizable per (actor, pair).
pub trait StoreTxn {
    /// Current state of a site, including staged updates
    fn get_site(&self, site_id: SiteId) -> Result<Option<DiveSite>>;

    /// Whether the actor has already resolved this normalized pair
    fn has_voted_pair(&self, actor: &ActorId, pair: PairKey) -> Result<bool>;

    /// Stage a rating update and the matching win/loss counter bump
    fn update_site_rating(
        &mut self,
        site_id: SiteId,
        new_rating: f64,
        outcome: DuelOutcome,
    ) -> Result<()>;

    /// Stage a new comparison row; the returned value carries the assigned
    /// id and timestamp
    fn append_comparison(
        &mut self,
        winner_id: SiteId,
        loser_id: SiteId,
        points_changed: i64,
        actor: Option<ActorId>,
    ) -> Result<ResolvedComparison>;

    /// Reset every site to the given rating with zeroed counters. Used only
    /// by the offline rating rebuild.
    fn reset_sites(&mut self, initial_rating: f64) -> Result<()>;

    /// The full log in ascending resolution-time order, as seen by this
    /// transaction
    fn comparisons_chronological(&self) -> Result<Vec<ResolvedComparison>>;

    /// Make all staged writes visible atomically
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Combined storage seam the engine operates against
pub trait RankStore: CatalogReader + HistoryReader {
    /// Begin an atomic unit of work with exclusive write access
    fn begin(&self) -> Result<Box<dyn StoreTxn + '_>>;

    /// Persist the latest leaderboard ranks into each site's rank slots.
    /// Best-effort: callers log and ignore failures.
    fn store_rank_snapshot(&self, ranks: &[(SiteId, u32)]) -> Result<()>;

    /// Delete all of one actor's comparisons, leaving ratings untouched.
    /// Returns how many rows were removed.
    fn clear_actor_history(&self, actor: &ActorId) -> Result<u64>;
}
