//! Common types used throughout the ranking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a dive site in the catalog
pub type SiteId = i64;

/// Opaque identifier for an authenticated actor (voter)
pub type ActorId = String;

/// Unique identifier for a resolved comparison
pub type ComparisonId = Uuid;

/// A ratable dive site
///
/// Created at catalog-seed time and never deleted; the rating and win/loss
/// counters are mutated only inside a store transaction, the rank slots only
/// by the leaderboard snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiveSite {
    pub id: SiteId,
    pub name: String,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    /// Rank at the time the leaderboard was last materialized; 0 = unranked
    pub previous_rank: u32,
    /// Most recently computed rank; 0 = unranked
    pub current_rank: u32,
}

impl DiveSite {
    /// Create a fresh site with the given initial rating and no history
    pub fn new(id: SiteId, name: impl Into<String>, rating: f64) -> Self {
        Self {
            id,
            name: name.into(),
            rating,
            wins: 0,
            losses: 0,
            previous_rank: 0,
            current_rank: 0,
        }
    }

    /// Total number of duels this site has been part of
    pub fn duels_fought(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Canonical key over an unordered pair of sites
///
/// `(a, b)` and `(b, a)` normalize to the same key, so the key both detects
/// "already compared" and enumerates the universe of possible pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    low: SiteId,
    high: SiteId,
}

impl PairKey {
    /// Normalize two site ids into a canonical unordered pair.
    ///
    /// Callers must not pass the same id twice; the comparison pipeline
    /// rejects self-matchups before any pair key is built.
    pub fn new(a: SiteId, b: SiteId) -> Self {
        debug_assert_ne!(a, b, "a pair requires two distinct sites");
        if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> SiteId {
        self.low
    }

    pub fn high(&self) -> SiteId {
        self.high
    }

    /// Whether the given site is one of the two endpoints
    pub fn contains(&self, site_id: SiteId) -> bool {
        self.low == site_id || self.high == site_id
    }

    /// The other endpoint, if `site_id` is part of this pair
    pub fn opponent_of(&self, site_id: SiteId) -> Option<SiteId> {
        if site_id == self.low {
            Some(self.high)
        } else if site_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// One resolved comparison, append-only and immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedComparison {
    pub id: ComparisonId,
    pub winner_id: SiteId,
    pub loser_id: SiteId,
    /// Signed magnitude applied to the winner; the loser receives the negation
    pub points_changed: i64,
    /// None for anonymous votes
    pub actor: Option<ActorId>,
    pub decided_at: DateTime<Utc>,
}

impl ResolvedComparison {
    /// The normalized pair this comparison resolved
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.winner_id, self.loser_id)
    }
}

/// Which side of the screen the champion occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChampionSide {
    Left,
    Right,
}

impl ChampionSide {
    pub fn opposite(&self) -> Self {
        match self {
            ChampionSide::Left => ChampionSide::Right,
            ChampionSide::Right => ChampionSide::Left,
        }
    }
}

/// Client-supplied hint that one site is on a win streak
///
/// Treated as untrusted input: eligibility is recomputed from the
/// authoritative history on every call, never taken from the hint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChampionHint {
    pub site_id: SiteId,
    pub side: ChampionSide,
}

/// The pair of sites presented for the next duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub left: DiveSite,
    pub right: DiveSite,
}

impl Matchup {
    /// The normalized key of the presented pair
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.left.id, self.right.id)
    }

    pub fn side_of(&self, site_id: SiteId) -> Option<ChampionSide> {
        if self.left.id == site_id {
            Some(ChampionSide::Left)
        } else if self.right.id == site_id {
            Some(ChampionSide::Right)
        } else {
            None
        }
    }
}

/// One leaderboard row: the site, its rank, and the signed movement since the
/// leaderboard was last materialized (positive = moved up)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSite {
    pub site: DiveSite,
    pub rank: u32,
    pub rank_change: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_normalization() {
        let forward = PairKey::new(3, 7);
        let backward = PairKey::new(7, 3);
        assert_eq!(forward, backward);
        assert_eq!(forward.low(), 3);
        assert_eq!(forward.high(), 7);
        assert_eq!(forward.to_string(), "3-7");
    }

    #[test]
    fn test_pair_key_opponent() {
        let pair = PairKey::new(1, 2);
        assert_eq!(pair.opponent_of(1), Some(2));
        assert_eq!(pair.opponent_of(2), Some(1));
        assert_eq!(pair.opponent_of(3), None);
        assert!(pair.contains(1));
        assert!(!pair.contains(9));
    }

    #[test]
    fn test_champion_side_opposite() {
        assert_eq!(ChampionSide::Left.opposite(), ChampionSide::Right);
        assert_eq!(ChampionSide::Right.opposite(), ChampionSide::Left);
    }

    #[test]
    fn test_matchup_side_of() {
        let matchup = Matchup {
            left: DiveSite::new(1, "Blue Hole", 1500.0),
            right: DiveSite::new(2, "Shark Alley", 1500.0),
        };
        assert_eq!(matchup.side_of(1), Some(ChampionSide::Left));
        assert_eq!(matchup.side_of(2), Some(ChampionSide::Right));
        assert_eq!(matchup.side_of(3), None);
        assert_eq!(matchup.pair(), PairKey::new(2, 1));
    }
}
