//! Match events: the entries of a synthesized timeline.

use crate::types::{Minute, Side};
use serde::{Deserialize, Serialize};

/// Every kind of event the timeline can contain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Kickoff,
    Pass,
    Shot,
    Goal,
    Corner,
    Foul,
    Offside,
    Save,
    Halftime,
    Fulltime,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kickoff => "kickoff",
            Self::Pass => "pass",
            Self::Shot => "shot",
            Self::Goal => "goal",
            Self::Corner => "corner",
            Self::Foul => "foul",
            Self::Offside => "offside",
            Self::Save => "save",
            Self::Halftime => "halftime",
            Self::Fulltime => "fulltime",
        }
    }

    /// Events that count toward a team's share of possession.
    pub fn counts_for_possession(&self) -> bool {
        matches!(self, Self::Pass | Self::Shot | Self::Goal)
    }

    /// Events that count as an attempt on goal.
    pub fn is_attempt(&self) -> bool {
        matches!(self, Self::Shot | Self::Goal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    pub minute: Minute,
    pub event_type: EventKind,
    /// None for neutral markers (half time, full time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Team name, empty for neutral markers.
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    pub description: String,
}

impl MatchEvent {
    pub fn neutral(minute: Minute, event_type: EventKind, description: String) -> Self {
        Self {
            minute,
            event_type,
            side: None,
            team: String::new(),
            player: None,
            description,
        }
    }

    pub fn for_team(
        minute: Minute,
        event_type: EventKind,
        side: Side,
        team: &str,
        player: Option<String>,
        description: String,
    ) -> Self {
        Self {
            minute,
            event_type,
            side: Some(side),
            team: team.to_string(),
            player,
            description,
        }
    }
}
