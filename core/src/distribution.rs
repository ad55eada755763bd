//! Score distributions: normalisation, volatility skew and the final draw.

use crate::{
    error::{SimError, SimResult},
    rng::MatchRng,
    types::Score,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One candidate final score and its (unnormalised) weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreOutcome {
    #[serde(alias = "home_score")]
    pub home: u32,
    #[serde(alias = "away_score")]
    pub away: u32,
    #[serde(alias = "probability")]
    pub weight: f64,
}

impl ScoreOutcome {
    pub fn new(home: u32, away: u32, weight: f64) -> Self {
        Self { home, away, weight }
    }

    pub fn score(&self) -> Score {
        Score::new(self.home, self.away)
    }

    pub fn total_goals(&self) -> u32 {
        self.home + self.away
    }

    fn scaled(&self, factor: f64) -> Self {
        Self { weight: self.weight * factor, ..*self }
    }
}

/// Ordered collection of candidate scores.
/// Duplicate (home, away) pairs are tolerated; each entry is drawn on its own weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct ScoreDistribution {
    outcomes: Vec<ScoreOutcome>,
}

impl ScoreDistribution {
    pub fn new(outcomes: Vec<ScoreOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[ScoreOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.outcomes.iter().map(|o| o.weight).sum()
    }

    /// Share of the total weight carried by outcomes matching `pred`.
    /// Zero for a zero-weight distribution.
    pub fn mass_share<F>(&self, mut pred: F) -> f64
    where
        F: FnMut(&ScoreOutcome) -> bool,
    {
        let total = self.total_weight();
        if total == 0.0 {
            return 0.0;
        }
        let matched: f64 = self.outcomes.iter().filter(|o| pred(o)).map(|o| o.weight).sum();
        matched / total
    }

    /// Weights must be finite and non-negative, and sum to a positive finite value.
    pub fn validate(&self) -> SimResult<()> {
        if self.outcomes.is_empty() {
            return Err(SimError::EmptyDistribution);
        }
        if let Some(bad) = self
            .outcomes
            .iter()
            .find(|o| !o.weight.is_finite() || o.weight < 0.0)
        {
            return Err(SimError::InvalidWeight {
                home: bad.home,
                away: bad.away,
                weight: bad.weight,
            });
        }
        let sum = self.total_weight();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(SimError::NonPositiveWeightSum { sum });
        }
        Ok(())
    }

    /// Rescale every weight by 1/sum. An all-zero distribution is returned
    /// unchanged.
    pub fn normalized(&self) -> Self {
        let total = self.total_weight();
        if total == 0.0 {
            return self.clone();
        }
        self.map_weights(|_| 1.0 / total)
    }

    /// Apply the volatility skew and renormalise. Medium is the identity.
    pub fn with_volatility(&self, volatility: Volatility) -> Self {
        match volatility {
            Volatility::Medium => self.clone(),
            Volatility::High => self
                .map_weights(|o| if o.total_goals() >= 4 { 1.5 } else { 0.7 })
                .normalized(),
            Volatility::Low => self
                .map_weights(|o| if o.total_goals() <= 2 { 1.3 } else { 0.8 })
                .normalized(),
        }
    }

    /// Multiply each weight by a per-outcome factor, keeping order.
    pub(crate) fn map_weights<F>(&self, mut factor: F) -> Self
    where
        F: FnMut(&ScoreOutcome) -> f64,
    {
        Self {
            outcomes: self.outcomes.iter().map(|o| o.scaled(factor(o))).collect(),
        }
    }

    fn as_choices(&self) -> Vec<(Score, f64)> {
        self.outcomes.iter().map(|o| (o.score(), o.weight)).collect()
    }
}

impl From<Vec<ScoreOutcome>> for ScoreDistribution {
    fn from(outcomes: Vec<ScoreOutcome>) -> Self {
        Self::new(outcomes)
    }
}

impl FromIterator<(u32, u32, f64)> for ScoreDistribution {
    fn from_iter<I: IntoIterator<Item = (u32, u32, f64)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(home, away, weight)| ScoreOutcome::new(home, away, weight))
                .collect(),
        )
    }
}

/// How far the draw is skewed toward low- or high-scoring games.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

impl Volatility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Volatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Volatility {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(SimError::UnknownVolatility { name: other.to_string() }),
        }
    }
}

/// Normalise, apply volatility, then draw one score. Consumes exactly one draw
/// for a non-empty distribution.
pub fn select_final_score(
    distribution: &ScoreDistribution,
    volatility: Volatility,
    rng: &mut MatchRng,
) -> SimResult<Score> {
    let skewed = distribution.normalized().with_volatility(volatility);
    let choices = skewed.as_choices();
    rng.weighted_choice(&choices)
        .copied()
        .ok_or(SimError::EmptyDistribution)
}
