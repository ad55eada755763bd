//! The completed-simulation record and the sink that persists it.

use crate::{
    distribution::Volatility,
    engine::SimulationOutcome,
    error::{SimError, SimResult},
    event::MatchEvent,
    settlement::{BetResult, SlipSettlement},
    stats::MatchStats,
    types::{Score, Seed, SimulationId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One simulation as persisted. Nested data is kept as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationRecord {
    /// Row id, None until stored.
    pub id: Option<i64>,
    pub simulation_id: SimulationId,
    pub user_id: UserId,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub bet_slip_won: bool,
    pub total_stake: Option<f64>,
    pub total_payout: Option<f64>,
    pub total_profit: Option<f64>,
    pub configured_rtp: f64,
    pub seed: Seed,
    pub volatility: Volatility,
    pub total_events: usize,
    pub number_of_bets: usize,
    pub bet_results: String, // JSON-serialized Vec<BetResult>
    pub events: String,      // JSON-serialized Vec<MatchEvent>
    pub match_stats: String, // JSON-serialized MatchStats
    pub created_at: DateTime<Utc>,
}

impl SimulationRecord {
    pub fn build(user_id: &str, outcome: &SimulationOutcome, settlement: &SlipSettlement) -> SimResult<Self> {
        Ok(Self {
            id: None,
            simulation_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            home_team: outcome.home_team.clone(),
            away_team: outcome.away_team.clone(),
            home_score: outcome.final_score.home,
            away_score: outcome.final_score.away,
            bet_slip_won: settlement.slip_won,
            total_stake: settlement.total_stake,
            total_payout: settlement.total_payout,
            total_profit: settlement.total_profit,
            configured_rtp: outcome.rtp,
            seed: outcome.seed,
            volatility: outcome.volatility,
            total_events: outcome.events().len(),
            number_of_bets: settlement.results.len(),
            bet_results: serde_json::to_string(&settlement.results)?,
            events: serde_json::to_string(outcome.events())?,
            match_stats: serde_json::to_string(outcome.stats())?,
            created_at: Utc::now(),
        })
    }

    pub fn final_score(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }

    pub fn parsed_bet_results(&self) -> SimResult<Vec<BetResult>> {
        Ok(serde_json::from_str(&self.bet_results)?)
    }

    pub fn parsed_events(&self) -> SimResult<Vec<MatchEvent>> {
        Ok(serde_json::from_str(&self.events)?)
    }

    pub fn parsed_stats(&self) -> SimResult<MatchStats> {
        Ok(serde_json::from_str(&self.match_stats)?)
    }
}

/// A stored simulation with its JSON columns decoded, as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDetail {
    pub id: Option<i64>,
    pub simulation_id: SimulationId,
    pub user_id: UserId,
    pub home_team: String,
    pub away_team: String,
    pub final_score: Score,
    pub bet_slip_won: bool,
    pub total_stake: Option<f64>,
    pub total_payout: Option<f64>,
    pub total_profit: Option<f64>,
    pub configured_rtp: f64,
    pub seed: Seed,
    pub volatility: Volatility,
    pub total_events: usize,
    pub number_of_bets: usize,
    pub bet_results: Vec<BetResult>,
    pub events: Vec<MatchEvent>,
    pub match_stats: MatchStats,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&SimulationRecord> for SimulationDetail {
    type Error = SimError;

    fn try_from(r: &SimulationRecord) -> SimResult<Self> {
        Ok(Self {
            id: r.id,
            simulation_id: r.simulation_id.clone(),
            user_id: r.user_id.clone(),
            home_team: r.home_team.clone(),
            away_team: r.away_team.clone(),
            final_score: r.final_score(),
            bet_slip_won: r.bet_slip_won,
            total_stake: r.total_stake,
            total_payout: r.total_payout,
            total_profit: r.total_profit,
            configured_rtp: r.configured_rtp,
            seed: r.seed,
            volatility: r.volatility,
            total_events: r.total_events,
            number_of_bets: r.number_of_bets,
            bet_results: r.parsed_bet_results()?,
            events: r.parsed_events()?,
            match_stats: r.parsed_stats()?,
            created_at: r.created_at,
        })
    }
}

/// Where completed simulations go. The engine never calls this itself.
pub trait SimulationSink {
    /// Append one record; returns its row id.
    fn append(&self, record: &SimulationRecord) -> SimResult<i64>;
}
