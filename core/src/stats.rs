//! Summary statistics derived from a finished timeline.

use crate::{
    event::{EventKind, MatchEvent},
    types::Side,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TeamStats {
    /// Percentage of possession, one decimal place.
    pub possession: f64,
    /// Shots plus goals.
    pub shots: u32,
    pub corners: u32,
    pub fouls: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MatchStats {
    pub home: TeamStats,
    pub away: TeamStats,
    pub total_goals: u32,
}

impl MatchStats {
    /// Possession is each side's share of pass, shot and goal events
    /// (50/50 when there are none); the two shares always sum to 100.0.
    pub fn from_events(events: &[MatchEvent]) -> Self {
        let count = |side: Side, pred: fn(&EventKind) -> bool| -> u32 {
            events
                .iter()
                .filter(|e| e.side == Some(side) && pred(&e.event_type))
                .count() as u32
        };

        let home_touches = count(Side::Home, EventKind::counts_for_possession);
        let away_touches = count(Side::Away, EventKind::counts_for_possession);
        let touches = home_touches + away_touches;

        let home_possession = if touches > 0 {
            (f64::from(home_touches) / f64::from(touches) * 1000.0).round() / 10.0
        } else {
            50.0
        };
        let away_possession = 100.0 - home_possession;

        let team = |side: Side, possession: f64| TeamStats {
            possession,
            shots: count(side, EventKind::is_attempt),
            corners: count(side, |k| *k == EventKind::Corner),
            fouls: count(side, |k| *k == EventKind::Foul),
        };

        Self {
            home: team(Side::Home, home_possession),
            away: team(Side::Away, away_possession),
            total_goals: count(Side::Home, |k| *k == EventKind::Goal)
                + count(Side::Away, |k| *k == EventKind::Goal),
        }
    }
}
