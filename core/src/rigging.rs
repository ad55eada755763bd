//! Outcome rigging: per-bet reshaping of the score distribution toward the
//! configured return-to-player.
//!
//! For each bet, in slip order:
//!   1. target = (1 / fair odds of the market) * rtp
//!   2. draw one float; should_win = draw < target
//!   3. split the CURRENT distribution into favourable / unfavourable
//!      outcomes with the settlement predicate
//!   4. boost the chosen side x2, damp the other x0.5, renormalise
//!   5. if the chosen side is empty, leave the distribution alone
//!
//! The draw in step 2 is taken for every bet, even when step 5 applies, so
//! the stream position after rigging depends only on the slip length.
//!
//! COMPOUNDING CONTRACT: bet N is rigged against the distribution produced
//! by bets 0..N, never against the caller's original. Reordering a slip can
//! change the final distribution. Rigging steers the later draw; it never
//! checks that the drawn score agrees with any should_win decision.

use crate::{
    distribution::ScoreDistribution,
    market::{BetSelection, MarketKind},
    rng::MatchRng,
    settlement::outcome_occurred,
};
use serde::{Deserialize, Serialize};

pub const BOOST_FACTOR: f64 = 2.0;
pub const DAMP_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RigEffect {
    BoostedFavorable,
    BoostedUnfavorable,
    Unchanged,
}

/// Audit record of one rigging step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RigDecision {
    pub market: MarketKind,
    pub outcome: String,
    pub fair_odds: f64,
    pub target_win_probability: f64,
    pub draw: f64,
    pub should_win: bool,
    pub effect: RigEffect,
    pub favorable_share_before: f64,
    pub favorable_share_after: f64,
}

/// Rig the distribution for one bet. Consumes exactly one draw.
pub fn rig_for_bet(
    distribution: &ScoreDistribution,
    bet: &BetSelection,
    rtp: f64,
    rng: &mut MatchRng,
) -> (ScoreDistribution, RigDecision) {
    let fair_odds = bet.market.fair_odds();
    let target_win_probability = (1.0 / fair_odds) * rtp;

    let draw = rng.next_f64();
    let should_win = draw < target_win_probability;

    let favorable: Vec<bool> = distribution
        .outcomes()
        .iter()
        .map(|o| outcome_occurred(bet, o.score()))
        .collect();
    let has_favorable = favorable.iter().any(|f| *f);
    let has_unfavorable = favorable.iter().any(|f| !*f);

    let effect = match (should_win, has_favorable, has_unfavorable) {
        (true, true, _) => RigEffect::BoostedFavorable,
        (false, _, true) => RigEffect::BoostedUnfavorable,
        _ => RigEffect::Unchanged,
    };

    let reshaped = match effect {
        RigEffect::Unchanged => distribution.clone(),
        RigEffect::BoostedFavorable | RigEffect::BoostedUnfavorable => {
            let boost_favorable = effect == RigEffect::BoostedFavorable;
            let mut flags = favorable.iter();
            distribution
                .map_weights(|_| {
                    let is_favorable = flags.next().copied().unwrap_or(false);
                    if is_favorable == boost_favorable {
                        BOOST_FACTOR
                    } else {
                        DAMP_FACTOR
                    }
                })
                .normalized()
        }
    };

    let decision = RigDecision {
        market: bet.market,
        outcome: bet.outcome.clone(),
        fair_odds,
        target_win_probability,
        draw,
        should_win,
        effect,
        favorable_share_before: distribution.mass_share(|o| outcome_occurred(bet, o.score())),
        favorable_share_after: reshaped.mass_share(|o| outcome_occurred(bet, o.score())),
    };

    log::debug!(
        "rig {} '{}': target={:.4} draw={:.4} should_win={} effect={:?} favourable {:.4} -> {:.4}",
        decision.market,
        decision.outcome,
        decision.target_win_probability,
        decision.draw,
        decision.should_win,
        decision.effect,
        decision.favorable_share_before,
        decision.favorable_share_after
    );

    (reshaped, decision)
}

/// Fold `rig_for_bet` over the slip in order, threading the distribution
/// and the random stream through every step.
pub fn rig_slip(
    distribution: &ScoreDistribution,
    slip: &[BetSelection],
    rtp: f64,
    rng: &mut MatchRng,
) -> (ScoreDistribution, Vec<RigDecision>) {
    slip.iter().fold(
        (distribution.clone(), Vec::with_capacity(slip.len())),
        |(current, mut decisions), bet| {
            let (next, decision) = rig_for_bet(&current, bet, rtp, rng);
            decisions.push(decision);
            (next, decisions)
        },
    )
}
