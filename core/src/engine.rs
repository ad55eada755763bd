//! The simulation engine: one call, one match.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Validate the request (no randomness consumed on failure)
//!   2. Resolve the seed and build the run's MatchRng
//!   3. Rig the distribution, one draw per bet, in slip order
//!   4. Normalise, apply volatility, draw the final score (one draw)
//!   5. Synthesize the timeline and stats for that score
//!   6. Settle each bet against the final score
//!
//! RULES:
//!   - One MatchRng per call, never shared between calls.
//!   - RTP is an input to every call; the engine holds no mutable state.
//!   - The engine never persists anything; it only builds the record.

use crate::{
    config::{validate_rtp, SimConfig},
    distribution::{select_final_score, ScoreDistribution, Volatility},
    error::{SimError, SimResult},
    event::MatchEvent,
    market::BetSelection,
    record::SimulationRecord,
    rigging::{rig_slip, RigDecision},
    rng::MatchRng,
    settlement::{settle_slip, SettlementPolicy, SlipSettlement},
    stats::MatchStats,
    timeline::{EventSynthesizer, Timeline, GOAL_CAPACITY},
    types::{Score, Seed},
};
use serde::{Deserialize, Serialize};

/// Everything one simulation call needs besides the RTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationRequest {
    pub home_team: String,
    pub away_team: String,
    #[serde(alias = "score_probabilities")]
    pub distribution: ScoreDistribution,
    pub bet_slip: Vec<BetSelection>,
    #[serde(default)]
    pub volatility: Volatility,
    #[serde(default)]
    pub seed: Option<Seed>,
}

impl SimulationRequest {
    pub fn validate(&self) -> SimResult<()> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(SimError::EmptyTeamName);
        }
        self.distribution.validate()?;
        if let Some(o) = self
            .distribution
            .outcomes()
            .iter()
            .find(|o| o.weight > 0.0 && o.total_goals() > GOAL_CAPACITY)
        {
            return Err(SimError::GoalCapacityExceeded {
                goals: o.total_goals(),
                capacity: GOAL_CAPACITY,
            });
        }
        if self.bet_slip.is_empty() {
            return Err(SimError::EmptyBetSlip);
        }
        self.bet_slip.iter().try_for_each(BetSelection::validate)
    }
}

/// The result of one simulation call, before settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationOutcome {
    pub home_team: String,
    pub away_team: String,
    pub seed: Seed,
    pub rtp: f64,
    pub volatility: Volatility,
    pub rigged_distribution: ScoreDistribution,
    pub rig_decisions: Vec<RigDecision>,
    pub final_score: Score,
    pub timeline: Timeline,
}

impl SimulationOutcome {
    pub fn events(&self) -> &[MatchEvent] {
        &self.timeline.events
    }

    pub fn stats(&self) -> &MatchStats {
        &self.timeline.stats
    }
}

/// Run steps 1-5: rig, draw, synthesize.
pub fn run_simulation(request: &SimulationRequest, rtp: f64) -> SimResult<SimulationOutcome> {
    validate_rtp(rtp)?;
    request.validate()?;

    let mut rng = MatchRng::resolve(request.seed);
    let seed = rng.seed();

    let (rigged, decisions) = rig_slip(&request.distribution, &request.bet_slip, rtp, &mut rng);
    let final_score = select_final_score(&rigged, request.volatility, &mut rng)?;
    let timeline = EventSynthesizer::new(&request.home_team, &request.away_team)
        .synthesize(final_score, &mut rng)?;

    log::info!(
        "simulated {} {} {} (seed={seed} rtp={rtp:.3} volatility={} bets={} events={} draws={})",
        request.home_team,
        final_score,
        request.away_team,
        request.volatility,
        request.bet_slip.len(),
        timeline.events.len(),
        rng.draws()
    );

    Ok(SimulationOutcome {
        home_team: request.home_team.clone(),
        away_team: request.away_team.clone(),
        seed,
        rtp,
        volatility: request.volatility,
        rigged_distribution: rigged,
        rig_decisions: decisions,
        final_score,
        timeline,
    })
}

/// A simulated and settled match, plus the record a sink would persist.
#[derive(Debug, Clone)]
pub struct CompletedSimulation {
    pub outcome: SimulationOutcome,
    pub settlement: SlipSettlement,
    pub record: SimulationRecord,
}

pub struct MatchEngine {
    policy: SettlementPolicy,
}

impl MatchEngine {
    pub fn new(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.settlement_policy)
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    pub fn simulate(&self, request: &SimulationRequest, rtp: f64) -> SimResult<SimulationOutcome> {
        run_simulation(request, rtp)
    }

    /// Step 6 for an outcome produced from `slip`.
    pub fn settle(&self, outcome: &SimulationOutcome, slip: &[BetSelection]) -> SimResult<SlipSettlement> {
        settle_slip(
            slip,
            &outcome.home_team,
            &outcome.away_team,
            outcome.final_score,
            self.policy,
        )
    }

    /// Simulate, settle and build the persistable record in one call.
    pub fn run(&self, user_id: &str, request: &SimulationRequest, rtp: f64) -> SimResult<CompletedSimulation> {
        let outcome = self.simulate(request, rtp)?;
        let settlement = self.settle(&outcome, &request.bet_slip)?;
        let record = SimulationRecord::build(user_id, &outcome, &settlement)?;
        Ok(CompletedSimulation {
            outcome,
            settlement,
            record,
        })
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(SettlementPolicy::default())
    }
}
