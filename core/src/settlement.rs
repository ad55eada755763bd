//! Bet settlement: does a selection's condition hold for a final score,
//! and what does it pay.
//!
//! Predicates are three-way. A label the market cannot interpret is
//! `Unparseable`, and the `SettlementPolicy` decides whether that scores as
//! a loss or is surfaced as an error.

use crate::{
    error::{SimError, SimResult},
    market::{BetSelection, MarketKind},
    types::Score,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCheck {
    Occurred,
    NotOccurred,
    Unparseable,
}

impl OutcomeCheck {
    fn from_bool(b: bool) -> Self {
        if b {
            Self::Occurred
        } else {
            Self::NotOccurred
        }
    }

    pub fn occurred(&self) -> bool {
        matches!(self, Self::Occurred)
    }
}

/// What to do with a selection whose label cannot be interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Settle as "did not occur".
    #[default]
    TreatAsLoss,
    /// Fail with `SimError::UnparseableOutcome`.
    Reject,
}

/// Evaluate a selection's condition against a score.
pub fn check_outcome(selection: &BetSelection, score: Score) -> OutcomeCheck {
    let label = selection.outcome.trim().to_ascii_lowercase();
    let (home, away) = (score.home, score.away);

    match selection.market {
        MarketKind::MatchResult => match label.as_str() {
            "1" | "home" => OutcomeCheck::from_bool(home > away),
            "x" | "draw" => OutcomeCheck::from_bool(home == away),
            "2" | "away" => OutcomeCheck::from_bool(home < away),
            _ => OutcomeCheck::Unparseable,
        },
        MarketKind::OverUnder => {
            let total = f64::from(score.total());
            if let Some(threshold) = label.strip_prefix("over_").and_then(parse_threshold) {
                OutcomeCheck::from_bool(total > threshold)
            } else if let Some(threshold) = label.strip_prefix("under_").and_then(parse_threshold) {
                OutcomeCheck::from_bool(total < threshold)
            } else {
                OutcomeCheck::Unparseable
            }
        }
        MarketKind::BothTeamsToScore => match label.as_str() {
            "yes" => OutcomeCheck::from_bool(home > 0 && away > 0),
            "no" => OutcomeCheck::from_bool(home == 0 || away == 0),
            _ => OutcomeCheck::Unparseable,
        },
        MarketKind::CorrectScore => match parse_correct_score(&label) {
            Some(expected) => OutcomeCheck::from_bool(expected == score),
            None => OutcomeCheck::Unparseable,
        },
    }
}

/// Boolean view of `check_outcome`; unparseable labels did not occur.
pub fn outcome_occurred(selection: &BetSelection, score: Score) -> bool {
    check_outcome(selection, score).occurred()
}

fn parse_threshold(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|t| t.is_finite())
}

fn parse_correct_score(label: &str) -> Option<Score> {
    let (home, away) = label.split_once('-')?;
    Some(Score::new(home.trim().parse().ok()?, away.trim().parse().ok()?))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetResult {
    pub market: MarketKind,
    pub outcome: String,
    pub stake: Option<f64>,
    pub odds: Option<f64>,
    pub check: OutcomeCheck,
    pub outcome_occurred: bool,
    pub won: bool,
    pub payout: Option<f64>,
    pub profit: Option<f64>,
    pub explanation: String,
}

/// Settle one selection, scoring unparseable labels as losses.
pub fn settle_bet(selection: &BetSelection, score: Score) -> BetResult {
    settle(selection, score, None)
}

/// Settle one selection under an explicit policy.
pub fn settle_bet_with_policy(
    selection: &BetSelection,
    score: Score,
    policy: SettlementPolicy,
) -> SimResult<BetResult> {
    let result = settle(selection, score, None);
    enforce(policy, selection, result)
}

fn enforce(policy: SettlementPolicy, selection: &BetSelection, result: BetResult) -> SimResult<BetResult> {
    if result.check != OutcomeCheck::Unparseable {
        return Ok(result);
    }
    match policy {
        SettlementPolicy::TreatAsLoss => {
            log::warn!(
                "outcome '{}' is not valid for market {}; settled as a loss",
                selection.outcome,
                selection.market
            );
            Ok(result)
        }
        SettlementPolicy::Reject => Err(SimError::UnparseableOutcome {
            market: selection.market.to_string(),
            outcome: selection.outcome.clone(),
        }),
    }
}

fn settle(selection: &BetSelection, score: Score, teams: Option<(&str, &str)>) -> BetResult {
    let check = check_outcome(selection, score);
    let occurred = check.occurred();
    let won = occurred;

    let (payout, profit) = match selection.wager() {
        Some((stake, odds)) => {
            let payout = if won { stake * odds } else { 0.0 };
            (Some(payout), Some(payout - stake))
        }
        None => (None, None),
    };

    BetResult {
        market: selection.market,
        outcome: selection.outcome.clone(),
        stake: selection.stake,
        odds: selection.odds,
        check,
        outcome_occurred: occurred,
        won,
        payout,
        profit,
        explanation: explain(selection, score, teams, won),
    }
}

fn explain(selection: &BetSelection, score: Score, teams: Option<(&str, &str)>, won: bool) -> String {
    let score_str = match teams {
        Some((home, away)) => format!("{home} {} - {} {away}", score.home, score.away),
        None => score.to_string(),
    };
    let market_name = selection.market.descriptor().name;
    let head = format!(
        "{}. {market_name}: {}. Score: {score_str}.",
        if won { "WON!" } else { "LOST" },
        selection.outcome
    );

    match selection.wager() {
        Some((stake, odds)) if won => {
            let payout = stake * odds;
            format!(
                "{head} Stake: ${stake:.2} @ {odds:.2}x -> Payout: ${payout:.2} (Profit: ${:.2})",
                payout - stake
            )
        }
        Some((stake, _)) => format!("{head} Stake: ${stake:.2} lost."),
        None => head,
    }
}

/// Every bet on a slip settled against one score, plus money totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlipSettlement {
    pub results: Vec<BetResult>,
    pub slip_won: bool,
    pub total_stake: Option<f64>,
    pub total_payout: Option<f64>,
    pub total_profit: Option<f64>,
}

/// Settle a whole slip. Totals are present only if at least one bet is staked.
pub fn settle_slip(
    slip: &[BetSelection],
    home_team: &str,
    away_team: &str,
    score: Score,
    policy: SettlementPolicy,
) -> SimResult<SlipSettlement> {
    let results = slip
        .iter()
        .map(|sel| enforce(policy, sel, settle(sel, score, Some((home_team, away_team)))))
        .collect::<SimResult<Vec<_>>>()?;

    let slip_won = results.iter().all(|r| r.won);
    let (total_stake, total_payout, total_profit) = if slip.iter().any(|s| s.stake.is_some()) {
        let stake: f64 = slip.iter().filter_map(|s| s.stake).sum();
        let payout: f64 = results.iter().filter_map(|r| r.payout).sum();
        (Some(stake), Some(payout), Some(payout - stake))
    } else {
        (None, None, None)
    };

    Ok(SlipSettlement {
        results,
        slip_won,
        total_stake,
        total_payout,
        total_profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(market: MarketKind, outcome: &str) -> BetSelection {
        BetSelection::new(market, outcome)
    }

    #[test]
    fn match_result_labels() {
        let home_win = Score::new(2, 1);
        assert_eq!(check_outcome(&sel(MarketKind::MatchResult, "1"), home_win), OutcomeCheck::Occurred);
        assert_eq!(check_outcome(&sel(MarketKind::MatchResult, "HOME"), home_win), OutcomeCheck::Occurred);
        assert_eq!(check_outcome(&sel(MarketKind::MatchResult, "X"), home_win), OutcomeCheck::NotOccurred);
        assert_eq!(check_outcome(&sel(MarketKind::MatchResult, "away"), Score::new(0, 1)), OutcomeCheck::Occurred);
        assert_eq!(check_outcome(&sel(MarketKind::MatchResult, "draw"), Score::new(1, 1)), OutcomeCheck::Occurred);
        assert_eq!(check_outcome(&sel(MarketKind::MatchResult, "3"), home_win), OutcomeCheck::Unparseable);
    }

    #[test]
    fn over_under_labels() {
        let s = Score::new(2, 1);
        assert!(outcome_occurred(&sel(MarketKind::OverUnder, "over_2.5"), s));
        assert!(!outcome_occurred(&sel(MarketKind::OverUnder, "under_2.5"), s));
        assert!(!outcome_occurred(&sel(MarketKind::OverUnder, "over_3"), s));
        assert!(!outcome_occurred(&sel(MarketKind::OverUnder, "under_3"), s));
        assert_eq!(check_outcome(&sel(MarketKind::OverUnder, "over_lots"), s), OutcomeCheck::Unparseable);
        assert_eq!(check_outcome(&sel(MarketKind::OverUnder, "2.5"), s), OutcomeCheck::Unparseable);
        assert_eq!(check_outcome(&sel(MarketKind::OverUnder, "over_nan"), s), OutcomeCheck::Unparseable);
    }

    #[test]
    fn both_teams_to_score_labels() {
        assert!(outcome_occurred(&sel(MarketKind::BothTeamsToScore, "yes"), Score::new(1, 1)));
        assert!(!outcome_occurred(&sel(MarketKind::BothTeamsToScore, "yes"), Score::new(1, 0)));
        assert!(outcome_occurred(&sel(MarketKind::BothTeamsToScore, "no"), Score::new(0, 0)));
        assert_eq!(
            check_outcome(&sel(MarketKind::BothTeamsToScore, "maybe"), Score::new(0, 0)),
            OutcomeCheck::Unparseable
        );
    }

    #[test]
    fn correct_score_labels() {
        assert!(outcome_occurred(&sel(MarketKind::CorrectScore, "2-1"), Score::new(2, 1)));
        assert!(!outcome_occurred(&sel(MarketKind::CorrectScore, "1-2"), Score::new(2, 1)));
        for bad in ["2:1", "two-one", "2-", "2-1-0"] {
            assert_eq!(
                check_outcome(&sel(MarketKind::CorrectScore, bad), Score::new(2, 1)),
                OutcomeCheck::Unparseable,
                "{bad}"
            );
        }
    }

    #[test]
    fn winning_stake_pays_stake_times_odds() {
        let bet = BetSelection::staked(MarketKind::MatchResult, "1", 10.0, 2.5);
        let r = settle_bet(&bet, Score::new(1, 0));
        assert!(r.won);
        assert_eq!(r.payout, Some(25.0));
        assert_eq!(r.profit, Some(15.0));
        assert!(r.explanation.starts_with("WON!"), "{}", r.explanation);
        assert!(r.explanation.contains("Payout: $25.00"), "{}", r.explanation);
    }

    #[test]
    fn losing_stake_pays_nothing() {
        let bet = BetSelection::staked(MarketKind::MatchResult, "1", 10.0, 2.5);
        let r = settle_bet(&bet, Score::new(0, 0));
        assert!(!r.won);
        assert_eq!(r.payout, Some(0.0));
        assert_eq!(r.profit, Some(-10.0));
        assert!(r.explanation.contains("Stake: $10.00 lost."), "{}", r.explanation);
    }

    #[test]
    fn informational_bet_has_no_money() {
        let r = settle_bet(&sel(MarketKind::BothTeamsToScore, "yes"), Score::new(1, 1));
        assert!(r.won);
        assert_eq!(r.payout, None);
        assert_eq!(r.profit, None);
    }

    #[test]
    fn reject_policy_surfaces_bad_labels() {
        let bad = sel(MarketKind::CorrectScore, "nonsense");
        let lenient = settle_bet_with_policy(&bad, Score::new(0, 0), SettlementPolicy::TreatAsLoss).unwrap();
        assert!(!lenient.won);
        assert_eq!(lenient.check, OutcomeCheck::Unparseable);

        let strict = settle_bet_with_policy(&bad, Score::new(0, 0), SettlementPolicy::Reject);
        assert!(matches!(strict, Err(SimError::UnparseableOutcome { .. })));
    }

    #[test]
    fn slip_totals_only_count_staked_bets() {
        let slip = vec![
            BetSelection::staked(MarketKind::MatchResult, "1", 20.0, 2.1),
            BetSelection::staked(MarketKind::OverUnder, "over_2.5", 15.0, 1.9),
            sel(MarketKind::BothTeamsToScore, "yes"),
        ];
        let s = settle_slip(&slip, "Barcelona", "Real Madrid", Score::new(2, 0), SettlementPolicy::TreatAsLoss)
            .unwrap();
        assert!(!s.slip_won);
        assert_eq!(s.total_stake, Some(35.0));
        assert!((s.total_payout.unwrap() - 42.0).abs() < 1e-9);
        assert!((s.total_profit.unwrap() - 7.0).abs() < 1e-9);
        assert!(s.results[0].explanation.contains("Barcelona 2 - 0 Real Madrid"));
    }

    #[test]
    fn unstaked_slip_has_no_totals() {
        let slip = vec![sel(MarketKind::MatchResult, "x")];
        let s = settle_slip(&slip, "A", "B", Score::new(1, 1), SettlementPolicy::TreatAsLoss).unwrap();
        assert!(s.slip_won);
        assert_eq!((s.total_stake, s.total_payout, s.total_profit), (None, None, None));
    }
}
