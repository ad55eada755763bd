//! Betting markets: the closed set of market kinds, their fair-odds
//! baselines, display metadata and the bet selection shape.
//!
//! Adding a market means touching three tables together:
//! `MarketKind::fair_odds`, `settlement::check_outcome` and `list_markets`.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Fair-odds baseline for a market name this build does not recognise.
pub const DEFAULT_FAIR_ODDS: f64 = 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MarketKind {
    #[serde(rename = "1X2")]
    MatchResult,
    #[serde(rename = "over_under")]
    OverUnder,
    #[serde(rename = "both_teams_to_score")]
    BothTeamsToScore,
    #[serde(rename = "correct_score")]
    CorrectScore,
}

impl MarketKind {
    pub const ALL: [MarketKind; 4] = [
        Self::MatchResult,
        Self::OverUnder,
        Self::BothTeamsToScore,
        Self::CorrectScore,
    ];

    /// Wire name, as used in requests and persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchResult => "1X2",
            Self::OverUnder => "over_under",
            Self::BothTeamsToScore => "both_teams_to_score",
            Self::CorrectScore => "correct_score",
        }
    }

    /// Fixed fair-odds baseline the rigging step targets.
    pub fn fair_odds(&self) -> f64 {
        match self {
            Self::MatchResult => 2.5,
            Self::OverUnder => 1.9,
            Self::BothTeamsToScore => 1.8,
            Self::CorrectScore => 10.0,
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| SimError::UnknownMarket { name: name.to_string() })
    }
}

/// Fair odds for a raw market name; unknown names get `DEFAULT_FAIR_ODDS`.
pub fn fair_odds_for_label(name: &str) -> f64 {
    name.parse::<MarketKind>()
        .map(|m| m.fair_odds())
        .unwrap_or(DEFAULT_FAIR_ODDS)
}

/// One entry on a bet slip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetSelection {
    pub market: MarketKind,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odds: Option<f64>,
}

impl BetSelection {
    /// An informational selection with no money attached.
    pub fn new(market: MarketKind, outcome: impl Into<String>) -> Self {
        Self {
            market,
            outcome: outcome.into(),
            stake: None,
            odds: None,
        }
    }

    pub fn staked(market: MarketKind, outcome: impl Into<String>, stake: f64, odds: f64) -> Self {
        Self {
            stake: Some(stake),
            odds: Some(odds),
            ..Self::new(market, outcome)
        }
    }

    /// Stake and odds, when both are present.
    pub fn wager(&self) -> Option<(f64, f64)> {
        self.stake.zip(self.odds)
    }

    /// Stake > 0 and odds > 1.0 when present; both or neither.
    pub fn validate(&self) -> SimResult<()> {
        match (self.stake, self.odds) {
            (None, None) => Ok(()),
            (Some(stake), Some(odds)) => {
                if !(stake.is_finite() && stake > 0.0) {
                    return Err(SimError::InvalidStake { stake });
                }
                if !(odds.is_finite() && odds > 1.0) {
                    return Err(SimError::InvalidOdds { odds });
                }
                Ok(())
            }
            _ => Err(SimError::StakeOddsMismatch {
                market: self.market.to_string(),
                outcome: self.outcome.clone(),
            }),
        }
    }
}

/// Static metadata describing one market.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarketDescriptor {
    pub market_type: MarketKind,
    pub name: &'static str,
    pub description: &'static str,
    pub possible_outcomes: &'static [&'static str],
    pub example: &'static str,
}

impl MarketKind {
    pub fn descriptor(&self) -> MarketDescriptor {
        match self {
            Self::MatchResult => MarketDescriptor {
                market_type: *self,
                name: "Match Result (1X2)",
                description: "Predict the final result: Home win (1), Draw (X), or Away win (2)",
                possible_outcomes: &["1", "X", "2", "home", "draw", "away"],
                example: "1",
            },
            Self::OverUnder => MarketDescriptor {
                market_type: *self,
                name: "Over/Under Goals",
                description: "Predict if total goals will be over or under a threshold",
                possible_outcomes: &[
                    "over_0.5", "under_0.5", "over_1.5", "under_1.5",
                    "over_2.5", "under_2.5", "over_3.5", "under_3.5",
                ],
                example: "over_2.5",
            },
            Self::BothTeamsToScore => MarketDescriptor {
                market_type: *self,
                name: "Both Teams To Score",
                description: "Predict if both teams will score at least one goal",
                possible_outcomes: &["yes", "no"],
                example: "yes",
            },
            Self::CorrectScore => MarketDescriptor {
                market_type: *self,
                name: "Correct Score",
                description: "Predict the exact final score",
                possible_outcomes: &["0-0", "1-0", "2-0", "1-1", "2-1", "3-1", "0-1", "1-2", "2-2", "3-2"],
                example: "2-1",
            },
        }
    }
}

/// Every supported market, in display order.
pub fn list_markets() -> Vec<MarketDescriptor> {
    MarketKind::ALL.iter().map(MarketKind::descriptor).collect()
}
