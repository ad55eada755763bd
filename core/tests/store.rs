//! SimStore against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use matchday_core::{
    distribution::{ScoreDistribution, Volatility},
    engine::{MatchEngine, SimulationRequest},
    market::{BetSelection, MarketKind},
    record::{SimulationRecord, SimulationSink},
    store::{SimStore, SimulationFilter},
};

fn store() -> SimStore {
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn record(user: &str, home: &str, away: &str, seed: u32, minutes_after: i64) -> SimulationRecord {
    let request = SimulationRequest {
        home_team: home.into(),
        away_team: away.into(),
        distribution: [(2, 1, 0.4), (1, 1, 0.3), (0, 2, 0.3)]
            .into_iter()
            .collect::<ScoreDistribution>(),
        bet_slip: vec![BetSelection::staked(MarketKind::MatchResult, "1", 10.0, 2.0)],
        volatility: Volatility::Medium,
        seed: Some(seed),
    };
    let mut record = MatchEngine::default()
        .run(user, &request, 0.9)
        .expect("simulation")
        .record;
    record.created_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes_after);
    record
}

#[test]
fn migrate_is_repeatable() {
    let store = store();
    store.migrate().expect("second migration");
}

#[test]
fn append_then_read_back() {
    let store = store();
    let original = record("alice", "Lazio", "Torino", 1, 0);
    let id = store.append(&original).unwrap();
    assert!(id > 0);

    let loaded = store.simulation_by_id(&original.simulation_id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(SimulationRecord { id: None, ..loaded.clone() }, original);
    assert_eq!(loaded.parsed_bet_results().unwrap().len(), 1);
    assert!(store.simulation_by_id("missing").unwrap().is_none());
}

#[test]
fn listing_filters_and_paginates() {
    let store = store();
    for (i, (user, home, away)) in [
        ("alice", "Lazio", "Torino"),
        ("bob", "Inter", "Lazio"),
        ("alice", "Milan", "Genoa"),
        ("carol", "Lazio", "Roma"),
        ("alice", "Inter", "Milan"),
    ]
    .into_iter()
    .enumerate()
    {
        store.append(&record(user, home, away, i as u32, i as i64)).unwrap();
    }

    let all = store.simulations(&SimulationFilter::default()).unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at), "newest first");
    assert_eq!(all[0].home_team, "Inter");
    assert_eq!(all[0].away_team, "Milan");

    let alice = SimulationFilter::for_user("alice");
    assert_eq!(store.simulation_count(&alice).unwrap(), 3);
    assert!(store.simulations(&alice).unwrap().iter().all(|r| r.user_id == "alice"));

    let lazio = SimulationFilter { team: Some("azi".into()), ..SimulationFilter::default() };
    assert_eq!(store.simulation_count(&lazio).unwrap(), 3);

    let page = SimulationFilter { limit: 2, offset: 2, ..SimulationFilter::default() };
    let second_page = store.simulations(&page).unwrap();
    assert_eq!(second_page.len(), 2);
    assert_eq!(second_page[0].simulation_id, all[2].simulation_id);
    assert_eq!(store.simulation_count(&page).unwrap(), 5, "count ignores pagination");

    let won = SimulationFilter { bet_slip_won: Some(true), ..SimulationFilter::default() };
    let lost = SimulationFilter { bet_slip_won: Some(false), ..SimulationFilter::default() };
    assert_eq!(
        store.simulation_count(&won).unwrap() + store.simulation_count(&lost).unwrap(),
        5
    );
}

#[test]
fn rtp_summary_matches_the_records() {
    let store = store();
    let records: Vec<_> = (0..12)
        .map(|i| record(if i % 3 == 0 { "dave" } else { "erin" }, "Ajax", "PSV", i, i64::from(i)))
        .collect();
    for r in &records {
        store.append(r).unwrap();
    }

    let summary = store.rtp_summary(None).unwrap();
    let staked: f64 = records.iter().filter_map(|r| r.total_stake).sum();
    let paid: f64 = records.iter().filter_map(|r| r.total_payout).sum();
    let won = records.iter().filter(|r| r.bet_slip_won).count() as i64;

    assert_eq!(summary.total_simulations, 12);
    assert_eq!(summary.won_slips, won);
    assert_eq!(summary.lost_slips, 12 - won);
    assert_eq!(summary.total_bets, 12);
    assert!((summary.total_staked - staked).abs() < 1e-9);
    assert!((summary.total_paid_out - paid).abs() < 1e-9);
    assert!((summary.house_profit - (staked - paid)).abs() < 1e-9);
    assert!((summary.actual_rtp - paid / staked).abs() < 1e-9);
    assert!((summary.avg_configured_rtp - 0.9).abs() < 1e-9);

    let dave = store.rtp_summary(Some("dave")).unwrap();
    assert_eq!(dave.user_id.as_deref(), Some("dave"));
    assert_eq!(dave.total_simulations, 4);
}

#[test]
fn empty_store_reports_zero_rtp() {
    let store = store();
    let summary = store.rtp_summary(None).unwrap();
    assert_eq!(summary.total_simulations, 0);
    assert_eq!(summary.actual_rtp, 0.0);
    assert!(store.rtp_trends(10, 5).unwrap().is_empty());
    assert!(store.players().unwrap().is_empty());
}

#[test]
fn trends_are_cumulative_and_windowed() {
    let store = store();
    let records: Vec<_> = (0..6).map(|i| record("fay", "Lyon", "Nice", i, i64::from(i))).collect();
    for r in &records {
        store.append(r).unwrap();
    }

    let trends = store.rtp_trends(100, 2).unwrap();
    assert_eq!(trends.len(), 6);
    for (idx, point) in trends.iter().enumerate() {
        assert_eq!(point.simulation_number, idx + 1);
        assert_eq!(point.bet_slip_won, records[idx].bet_slip_won);

        let paid: f64 = records[..=idx].iter().filter_map(|r| r.total_payout).sum();
        assert!((point.cumulative_payout - paid).abs() < 1e-9);
        assert!((point.cumulative_stake - 10.0 * (idx + 1) as f64).abs() < 1e-9);

        let start = idx.saturating_sub(1);
        let window_paid: f64 = records[start..=idx].iter().filter_map(|r| r.total_payout).sum();
        let window_staked = 10.0 * (idx + 1 - start) as f64;
        assert!((point.rolling_window_rtp - window_paid / window_staked).abs() < 1e-9);
    }

    assert_eq!(store.rtp_trends(3, 2).unwrap().len(), 3);
}

#[test]
fn players_are_rolled_up_most_recent_first() {
    let store = store();
    store.append(&record("gus", "Lens", "Metz", 1, 0)).unwrap();
    store.append(&record("hana", "Lens", "Metz", 2, 5)).unwrap();
    store.append(&record("gus", "Lens", "Metz", 3, 10)).unwrap();

    let players = store.players().unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].user_id, "gus");
    assert_eq!(players[0].total_simulations, 2);
    assert!((players[0].total_staked - 20.0).abs() < 1e-9);
    assert_eq!(players[1].user_id, "hana");
}

#[test]
fn details_decode_the_json_columns() {
    let store = store();
    let original = record("ivy", "Nantes", "Rennes", 8, 0);
    store.append(&original).unwrap();

    let details = store.simulation_details(&SimulationFilter::for_user("ivy")).unwrap();
    assert_eq!(details.len(), 1);
    let detail = &details[0];
    assert_eq!(detail.simulation_id, original.simulation_id);
    assert_eq!(detail.final_score, original.final_score());
    assert_eq!(detail.bet_results, original.parsed_bet_results().unwrap());
    assert_eq!(detail.events, original.parsed_events().unwrap());
    assert_eq!(detail.match_stats, original.parsed_stats().unwrap());

    let json = serde_json::to_value(detail).unwrap();
    assert!(json["events"].is_array());
    assert!(json["bet_results"].is_array());
    assert!(json["match_stats"].is_object());
}
