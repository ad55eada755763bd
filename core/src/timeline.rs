//! Event synthesis: turn a drawn final score into a minute-by-minute
//! narrative that ends on exactly that score.
//!
//! DRAW ORDER (fixed; replay depends on it):
//!   1. shuffle of the candidate goal minutes 5..=89
//!   2. one coin flip per goal while both sides still have goals to place
//!   3. the minute loop: per goal, one player pick; per empty step, the
//!      filler roll (plus side, kind and player when it fires) and then
//!      the 1-3 minute advance.
//!
//! The clock never steps past the next scheduled goal, so every scheduled
//! goal is emitted and the running score at full time equals the target.

use crate::{
    clock::{MatchClock, FULLTIME_MINUTE, HALFTIME_MINUTE, KICKOFF_MINUTE},
    error::{SimError, SimResult},
    event::{EventKind, MatchEvent},
    rng::MatchRng,
    squad::{PlayerPool, Squad},
    stats::MatchStats,
    types::{Minute, Score, Side},
};
use serde::{Deserialize, Serialize};

pub const FIRST_GOAL_MINUTE: Minute = 5;
pub const LAST_GOAL_MINUTE: Minute = 89;
pub const FILLER_PROBABILITY: f64 = 0.3;
pub const MIN_STEP: u32 = 1;
pub const MAX_STEP: u32 = 3;

/// Most goals a single match can hold: one per candidate minute.
pub const GOAL_CAPACITY: u32 = (LAST_GOAL_MINUTE - FIRST_GOAL_MINUTE + 1) as u32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledGoal {
    pub minute: Minute,
    pub side: Side,
}

/// Place `score.total()` goals on distinct minutes in 5..=89, sorted ascending.
pub fn schedule_goals(score: Score, rng: &mut MatchRng) -> SimResult<Vec<ScheduledGoal>> {
    let total = score.total();
    if total > GOAL_CAPACITY {
        return Err(SimError::GoalCapacityExceeded {
            goals: total,
            capacity: GOAL_CAPACITY,
        });
    }

    let mut minutes: Vec<Minute> = (FIRST_GOAL_MINUTE..=LAST_GOAL_MINUTE).collect();
    rng.shuffle(&mut minutes);

    let mut home_left = score.home;
    let mut away_left = score.away;
    let mut goals: Vec<ScheduledGoal> = minutes
        .into_iter()
        .take(total as usize)
        .map(|minute| {
            let side = if home_left > 0 && away_left > 0 {
                if rng.chance(0.5) {
                    Side::Home
                } else {
                    Side::Away
                }
            } else if home_left > 0 {
                Side::Home
            } else {
                Side::Away
            };
            match side {
                Side::Home => home_left -= 1,
                Side::Away => away_left -= 1,
            }
            ScheduledGoal { minute, side }
        })
        .collect();

    goals.sort_by_key(|g| g.minute);
    log::debug!("scheduled {} goals for {score}: {:?}", goals.len(), goals);
    Ok(goals)
}

/// A background event that may fire on a step with no goal due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Filler {
    kind: EventKind,
    action: &'static str,
    pool: PlayerPool,
}

const FILLERS: [(Filler, f64); 6] = [
    (Filler { kind: EventKind::Pass, action: "passes the ball forward", pool: PlayerPool::Midfield }, 0.35),
    (Filler { kind: EventKind::Shot, action: "attempts a shot", pool: PlayerPool::Attacking }, 0.20),
    (Filler { kind: EventKind::Corner, action: "wins a corner kick", pool: PlayerPool::Midfield }, 0.15),
    (Filler { kind: EventKind::Foul, action: "commits a foul", pool: PlayerPool::Midfield }, 0.15),
    (Filler { kind: EventKind::Offside, action: "caught offside", pool: PlayerPool::Attacking }, 0.10),
    (Filler { kind: EventKind::Save, action: "shot saved by the goalkeeper!", pool: PlayerPool::Attacking }, 0.05),
];

/// The synthesized match: ordered events, the score they add up to and stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub events: Vec<MatchEvent>,
    pub final_score: Score,
    pub stats: MatchStats,
}

pub struct EventSynthesizer<'a> {
    home_team: &'a str,
    away_team: &'a str,
    home_squad: Squad,
    away_squad: Squad,
    events: Vec<MatchEvent>,
    score: Score,
}

impl<'a> EventSynthesizer<'a> {
    pub fn new(home_team: &'a str, away_team: &'a str) -> Self {
        Self {
            home_team,
            away_team,
            home_squad: Squad::for_team(home_team),
            away_squad: Squad::for_team(away_team),
            events: Vec::new(),
            score: Score::default(),
        }
    }

    /// Build the full timeline for `target`.
    pub fn synthesize(mut self, target: Score, rng: &mut MatchRng) -> SimResult<Timeline> {
        self.events.push(MatchEvent::for_team(
            KICKOFF_MINUTE,
            EventKind::Kickoff,
            Side::Home,
            self.home_team,
            None,
            format!("Match kicks off! {} vs {}", self.home_team, self.away_team),
        ));

        let goals = schedule_goals(target, rng)?;
        let mut clock = MatchClock::new();
        let mut next_goal = 0;

        while clock.is_running() {
            let due = goals.get(next_goal).copied();
            match due {
                Some(goal) if clock.minute() >= goal.minute => {
                    self.goal_sequence(goal, rng);
                    next_goal += 1;
                    clock.resume_after(goal.minute);
                }
                _ => {
                    if rng.chance(FILLER_PROBABILITY) {
                        self.filler(clock.minute(), rng);
                    }
                    let step = rng.next_int(MIN_STEP, MAX_STEP) as Minute;
                    clock.advance(step, due.map(|g| g.minute));
                }
            }

            if clock.take_halftime() {
                self.events.push(MatchEvent::neutral(
                    HALFTIME_MINUTE,
                    EventKind::Halftime,
                    format!("Half-time: {}", self.scoreline()),
                ));
            }
        }

        self.events.push(MatchEvent::neutral(
            FULLTIME_MINUTE,
            EventKind::Fulltime,
            format!("Full-time: {}", self.scoreline()),
        ));

        debug_assert_eq!(self.score, target, "timeline diverged from the drawn score");

        let stats = MatchStats::from_events(&self.events);
        Ok(Timeline {
            events: self.events,
            final_score: self.score,
            stats,
        })
    }

    fn team(&self, side: Side) -> (&'a str, &Squad) {
        match side {
            Side::Home => (self.home_team, &self.home_squad),
            Side::Away => (self.away_team, &self.away_squad),
        }
    }

    fn scoreline(&self) -> String {
        format!(
            "{} {} - {} {}",
            self.home_team, self.score.home, self.score.away, self.away_team
        )
    }

    fn goal_sequence(&mut self, goal: ScheduledGoal, rng: &mut MatchRng) {
        let (team, squad) = self.team(goal.side);
        let player = squad.pick(PlayerPool::Attacking, rng);

        let buildup = [
            format!("Nice passing movement by {team}"),
            format!("{team} building up the attack"),
        ];
        for (offset, description) in (1..=2u8).rev().zip(buildup) {
            let minute = goal.minute.saturating_sub(offset).max(1);
            self.push(MatchEvent::for_team(minute, EventKind::Pass, goal.side, team, None, description));
        }

        self.push(MatchEvent::for_team(
            goal.minute,
            EventKind::Shot,
            goal.side,
            team,
            Some(player.clone()),
            format!("{player} takes a shot!"),
        ));

        self.score.increment(goal.side);
        let description = format!("GOAL! {player} scores for {team}! {}", self.scoreline());
        self.push(MatchEvent::for_team(
            goal.minute,
            EventKind::Goal,
            goal.side,
            team,
            Some(player),
            description,
        ));
    }

    fn filler(&mut self, minute: Minute, rng: &mut MatchRng) {
        let side = if rng.chance(0.5) { Side::Home } else { Side::Away };
        let Some(filler) = rng.weighted_choice(&FILLERS).copied() else {
            return;
        };
        let (team, squad) = self.team(side);
        let player = squad.pick(filler.pool, rng);
        let description = format!("{player} {}", filler.action);
        self.push(MatchEvent::for_team(minute, filler.kind, side, team, Some(player), description));
    }

    fn push(&mut self, event: MatchEvent) {
        log::trace!("{}' {} {}", event.minute, event.event_type.as_str(), event.description);
        self.events.push(event);
    }
}
