//! Pair selection for the next duel
//!
//! Selection never repeats an unordered pair for an authenticated actor and
//! recognizes when that actor has exhausted the catalog. Anonymous callers
//! get a weaker, global guarantee: pairs with no history anywhere are
//! preferred, and once none remain any random pair may repeat. All candidate
//! choices are uniform random so no rating band is over-sampled.

use crate::config::MatchupSettings;
use crate::error::{RankError, Result};
use crate::storage::RankStore;
use crate::types::{ActorId, ChampionHint, ChampionSide, DiveSite, Matchup, PairKey, SiteId};
use crate::utils::{enumerate_pairs, total_pairs};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Chooses the next pair of sites to present
pub struct PairSelector {
    store: Arc<dyn RankStore>,
    settings: MatchupSettings,
}

impl PairSelector {
    pub fn new(store: Arc<dyn RankStore>, settings: MatchupSettings) -> Self {
        Self { store, settings }
    }

    /// Produce the next matchup for the caller, or signal exhaustion
    ///
    /// The champion hint is client-supplied and untrusted: a hint naming a
    /// site that is not in the catalog is ignored, and pair eligibility is
    /// always recomputed from the stored history.
    pub fn select(
        &self,
        actor: Option<&ActorId>,
        champion: Option<ChampionHint>,
    ) -> Result<Matchup> {
        let sites = self.store.list_sites()?;
        if sites.len() < 2 {
            return Err(RankError::InsufficientCatalog { found: sites.len() }.into());
        }

        let by_id: HashMap<SiteId, &DiveSite> = sites.iter().map(|s| (s.id, s)).collect();
        let champion = champion
            .filter(|_| self.settings.champion_continuity)
            .filter(|hint| by_id.contains_key(&hint.site_id));

        match actor {
            Some(actor) => self.select_for_actor(&sites, &by_id, actor, champion),
            None => self.select_anonymous(&sites, &by_id, champion),
        }
    }

    /// Authenticated path: per-actor no-repeat guarantee and exhaustion
    fn select_for_actor(
        &self,
        sites: &[DiveSite],
        by_id: &HashMap<SiteId, &DiveSite>,
        actor: &ActorId,
        champion: Option<ChampionHint>,
    ) -> Result<Matchup> {
        let total = total_pairs(sites.len());
        let voted = self.store.voted_pairs(Some(actor))?;
        if voted.len() >= total {
            return Err(RankError::AllMatchupsCompleted {
                actor: actor.clone(),
                total_pairs: total,
            }
            .into());
        }

        if let Some(hint) = champion {
            let challengers: Vec<&DiveSite> = sites
                .iter()
                .filter(|s| s.id != hint.site_id)
                .filter(|s| !voted.contains(&PairKey::new(hint.site_id, s.id)))
                .collect();

            if let Some(&challenger) = challengers.choose(&mut rand::thread_rng()) {
                debug!(
                    "champion {} stays up against {} for actor '{}'",
                    hint.site_id, challenger.id, actor
                );
                return Ok(place_with_champion(by_id[&hint.site_id], challenger, hint.side));
            }
            // champion has faced everyone this actor can still vote on
        }

        let site_ids: Vec<SiteId> = sites.iter().map(|s| s.id).collect();
        let open: Vec<PairKey> = enumerate_pairs(&site_ids)
            .into_iter()
            .filter(|pair| !voted.contains(pair))
            .collect();

        match open.choose(&mut rand::thread_rng()) {
            Some(pair) => {
                debug!(
                    "serving open pair {} to actor '{}' ({} of {} pairs voted)",
                    pair,
                    actor,
                    voted.len(),
                    total
                );
                Ok(place_shuffled(by_id[&pair.low()], by_id[&pair.high()]))
            }
            None => Err(RankError::AllMatchupsCompleted {
                actor: actor.clone(),
                total_pairs: total,
            }
            .into()),
        }
    }

    /// Anonymous path: global-history guarantee only, never exhausts
    fn select_anonymous(
        &self,
        sites: &[DiveSite],
        by_id: &HashMap<SiteId, &DiveSite>,
        champion: Option<ChampionHint>,
    ) -> Result<Matchup> {
        if let Some(hint) = champion {
            let faced = self.store.opponents_faced(hint.site_id, None)?;
            let challengers: Vec<&DiveSite> = sites
                .iter()
                .filter(|s| s.id != hint.site_id && !faced.contains(&s.id))
                .collect();

            if let Some(&challenger) = challengers.choose(&mut rand::thread_rng()) {
                return Ok(place_with_champion(by_id[&hint.site_id], challenger, hint.side));
            }
        }

        let voted = self.store.voted_pairs(None)?;
        let site_ids: Vec<SiteId> = sites.iter().map(|s| s.id).collect();
        let fresh: Vec<PairKey> = enumerate_pairs(&site_ids)
            .into_iter()
            .filter(|pair| !voted.contains(pair))
            .collect();

        if let Some(pair) = fresh.choose(&mut rand::thread_rng()) {
            return Ok(place_shuffled(by_id[&pair.low()], by_id[&pair.high()]));
        }

        // Every pair has global history; anonymous traffic has no identity to
        // track completion against, so fall back to any random distinct pair.
        let picks: Vec<&DiveSite> = sites.choose_multiple(&mut rand::thread_rng(), 2).collect();
        debug!("anonymous fallback: all pairs have history, serving random rematch");
        Ok(place_shuffled(picks[0], picks[1]))
    }
}

/// Keep the champion on its recorded side; the challenger takes the other
fn place_with_champion(champion: &DiveSite, challenger: &DiveSite, side: ChampionSide) -> Matchup {
    match side {
        ChampionSide::Left => Matchup {
            left: champion.clone(),
            right: challenger.clone(),
        },
        ChampionSide::Right => Matchup {
            left: challenger.clone(),
            right: champion.clone(),
        },
    }
}

/// No champion in play: coin-flip which site lands on which side
fn place_shuffled(a: &DiveSite, b: &DiveSite) -> Matchup {
    if rand::thread_rng().gen_bool(0.5) {
        Matchup {
            left: a.clone(),
            right: b.clone(),
        }
    } else {
        Matchup {
            left: b.clone(),
            right: a.clone(),
        }
    }
}
