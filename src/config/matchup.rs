//! Matchup selection configuration

use serde::{Deserialize, Serialize};

/// Tunables for pair selection behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchupSettings {
    /// Honor client champion hints so a winning site keeps facing new
    /// challengers instead of being reshuffled every round
    pub champion_continuity: bool,
}

impl Default for MatchupSettings {
    fn default() -> Self {
        Self {
            champion_continuity: true,
        }
    }
}
