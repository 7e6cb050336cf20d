//! ELO expected score and point delta
//!
//! The expected-score curve comes from the skillratings crate; the delta on
//! top of it is the classic `k * (1 - expected)` rounded to a whole point and
//! applied symmetrically, so every duel is zero-sum. Ratings carry no floor
//! or ceiling; a pathological catalog can drive a rating negative and that is
//! accepted behavior.

use skillratings::elo::{expected_score, EloConfig, EloRating};

/// Probability that a site with `rating` beats one with `opponent_rating`
///
/// `1 / (1 + 10^((b - a) / 400))`; equal ratings give exactly 0.5. The
/// k-factor in the config has no effect on the expected-score curve, so a
/// default config is used here and `rating_delta` applies its own k.
pub fn win_probability(rating: f64, opponent_rating: f64) -> f64 {
    let (expected, _) = expected_score(
        &EloRating { rating },
        &EloRating {
            rating: opponent_rating,
        },
        &EloConfig::new(),
    );
    expected
}

/// Whole points the winner gains (and the loser loses) for this outcome
///
/// Always non-negative: the winner can never be charged points for winning.
pub fn rating_delta(winner_rating: f64, loser_rating: f64, k_factor: f64) -> i64 {
    let expected = win_probability(winner_rating, loser_rating);
    (k_factor * (1.0 - expected)).round() as i64
}
