//! End-to-end runs through MatchEngine, including the permanent
//! regression fixture.

use matchday_core::{
    distribution::{ScoreDistribution, Volatility},
    engine::{run_simulation, MatchEngine, SimulationRequest},
    error::SimError,
    event::EventKind,
    market::{BetSelection, MarketKind},
    rigging::RigEffect,
    settlement::{OutcomeCheck, SettlementPolicy},
    types::Score,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture() -> SimulationRequest {
    SimulationRequest {
        home_team: "Arsenal".into(),
        away_team: "Chelsea".into(),
        distribution: [(1, 0, 0.5), (0, 1, 0.5)].into_iter().collect::<ScoreDistribution>(),
        bet_slip: vec![BetSelection::staked(MarketKind::MatchResult, "1", 10.0, 2.0)],
        volatility: Volatility::Medium,
        seed: Some(42),
    }
}

/// Recorded from the first correct run; any change here is a replay break.
#[test]
fn regression_fixture_seed_42() {
    init_logging();
    let done = MatchEngine::default().run("fixture", &fixture(), 0.96).unwrap();

    assert_eq!(done.outcome.final_score, Score::new(1, 0));
    let bet = &done.settlement.results[0];
    assert!(bet.won);
    assert_eq!(bet.payout, Some(20.0));
    assert_eq!(bet.profit, Some(10.0));

    let decision = &done.outcome.rig_decisions[0];
    assert!((decision.target_win_probability - 0.384).abs() < 1e-12);
    assert!(!decision.should_win);
    assert_eq!(decision.effect, RigEffect::BoostedUnfavorable);
}

#[test]
fn fixture_is_internally_consistent() {
    let done = MatchEngine::default().run("fixture", &fixture(), 0.96).unwrap();
    let outcome = &done.outcome;

    assert_eq!(outcome.seed, 42);
    assert_eq!(outcome.timeline.final_score, outcome.final_score);
    assert_eq!(outcome.stats().total_goals, outcome.final_score.total());

    let events = outcome.events();
    assert_eq!(events.first().map(|e| e.event_type), Some(EventKind::Kickoff));
    assert_eq!(events.last().map(|e| e.event_type), Some(EventKind::Fulltime));
    assert_eq!(events.last().map(|e| e.minute), Some(90));
    assert!(events
        .last()
        .is_some_and(|e| e.description == format!("Full-time: Arsenal {} - {} Chelsea", outcome.final_score.home, outcome.final_score.away)));

    let goals = events.iter().filter(|e| e.event_type == EventKind::Goal).count() as u32;
    assert_eq!(goals, outcome.final_score.total());

    let rigged_sum: f64 = outcome.rigged_distribution.outcomes().iter().map(|o| o.weight).sum();
    assert!((rigged_sum - 1.0).abs() < 1e-12);

    let s = &done.settlement;
    assert_eq!(s.total_stake, Some(10.0));
    assert_eq!(s.slip_won, s.results[0].won);
    assert_eq!(s.total_payout, s.results[0].payout);

    let r = &done.record;
    assert_eq!(r.user_id, "fixture");
    assert_eq!(r.final_score(), outcome.final_score);
    assert_eq!(r.total_events, events.len());
    assert_eq!(r.number_of_bets, 1);
    assert_eq!(r.configured_rtp, 0.96);
    assert_eq!(r.parsed_events().unwrap(), events);
    assert_eq!(r.parsed_stats().unwrap(), *outcome.stats());
}

#[test]
fn validation_rejects_bad_requests() {
    let mut req = fixture();
    req.home_team = "  ".into();
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::EmptyTeamName)));

    let mut req = fixture();
    req.bet_slip.clear();
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::EmptyBetSlip)));

    let mut req = fixture();
    req.distribution = [(1, 0, 0.0), (0, 1, 0.0)].into_iter().collect();
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::NonPositiveWeightSum { .. })));

    let mut req = fixture();
    req.distribution = [(1, 0, 1e308), (0, 1, 1e308)].into_iter().collect();
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::NonPositiveWeightSum { .. })));

    let mut req = fixture();
    req.distribution = ScoreDistribution::default();
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::EmptyDistribution)));

    let mut req = fixture();
    req.bet_slip = vec![BetSelection::staked(MarketKind::MatchResult, "1", 10.0, 1.0)];
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::InvalidOdds { .. })));

    let mut req = fixture();
    req.bet_slip[0].odds = None;
    assert!(matches!(run_simulation(&req, 0.96), Err(SimError::StakeOddsMismatch { .. })));

    assert!(matches!(run_simulation(&fixture(), 1.5), Err(SimError::InvalidRtp { .. })));
}

#[test]
fn goal_capacity_only_applies_to_reachable_scores() {
    let mut req = fixture();
    req.distribution = [(86, 0, 0.2), (1, 1, 0.8)].into_iter().collect();
    assert!(matches!(
        run_simulation(&req, 0.96),
        Err(SimError::GoalCapacityExceeded { goals: 86, capacity: 85 })
    ));

    req.distribution = [(86, 0, 0.0), (1, 1, 1.0)].into_iter().collect();
    let outcome = run_simulation(&req, 0.96).unwrap();
    assert_eq!(outcome.final_score, Score::new(1, 1));
}

#[test]
fn high_scoring_match_keeps_every_goal() {
    let mut req = fixture();
    req.distribution = [(9, 8, 1.0)].into_iter().collect();
    for seed in 0..20 {
        req.seed = Some(seed);
        let outcome = run_simulation(&req, 0.96).unwrap();
        assert_eq!(outcome.final_score, Score::new(9, 8));
        assert_eq!(outcome.timeline.final_score, Score::new(9, 8));
        assert_eq!(outcome.stats().total_goals, 17);
    }
}

#[test]
fn unparseable_labels_follow_the_policy() {
    init_logging();
    let mut req = fixture();
    req.bet_slip = vec![BetSelection::staked(MarketKind::OverUnder, "over_lots", 5.0, 1.8)];

    let lenient = MatchEngine::new(SettlementPolicy::TreatAsLoss)
        .run("u", &req, 0.96)
        .unwrap();
    let bet = &lenient.settlement.results[0];
    assert_eq!(bet.check, OutcomeCheck::Unparseable);
    assert!(!bet.won);
    assert_eq!(bet.payout, Some(0.0));

    let strict = MatchEngine::new(SettlementPolicy::Reject).run("u", &req, 0.96);
    assert!(matches!(strict, Err(SimError::UnparseableOutcome { .. })));
}

#[test]
fn engine_reads_policy_from_config() {
    let config = matchday_core::config::SimConfig::default_test();
    assert_eq!(MatchEngine::from_config(&config).policy(), SettlementPolicy::Reject);
}
