//! ELO rating configuration

use serde::{Deserialize, Serialize};

/// Tunables for the ELO rating model
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EloSettings {
    /// K-factor: the maximum number of points a single duel can move
    pub k_factor: f64,
    /// Rating assigned to freshly seeded sites
    pub initial_rating: f64,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            initial_rating: 1500.0,
        }
    }
}
