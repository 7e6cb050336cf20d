//! Utility functions for the ranking engine

use crate::types::{ComparisonId, PairKey, SiteId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique comparison ID
pub fn generate_comparison_id() -> ComparisonId {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Number of distinct unordered pairs in a catalog of `n` sites
pub fn total_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Enumerate every distinct unordered pair over the given site ids
pub fn enumerate_pairs(site_ids: &[SiteId]) -> Vec<PairKey> {
    let mut pairs = Vec::with_capacity(total_pairs(site_ids.len()));
    for (i, &a) in site_ids.iter().enumerate() {
        for &b in &site_ids[i + 1..] {
            pairs.push(PairKey::new(a, b));
        }
    }
    pairs
}
