//! Deterministic player labels for a team.
//!
//! Players are labelled "<initial>. Player <n>": numbers 1-3 are forwards,
//! 4-7 midfielders. Picking a player is one draw on the run's stream.

use crate::rng::MatchRng;

/// Which part of the squad an event's player is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPool {
    /// Forwards and midfielders.
    Attacking,
    /// Midfielders only.
    Midfield,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Squad {
    attackers: Vec<String>,
    midfielders: Vec<String>,
}

impl Squad {
    pub fn for_team(team: &str) -> Self {
        let initial = team.chars().next().unwrap_or('?');
        let label = |n: u32| format!("{initial}. Player {n}");
        let forwards = (1..=3).map(label);
        let midfielders: Vec<String> = (4..=7).map(label).collect();
        Self {
            attackers: forwards.chain(midfielders.iter().cloned()).collect(),
            midfielders,
        }
    }

    pub fn pool(&self, pool: PlayerPool) -> &[String] {
        match pool {
            PlayerPool::Attacking => &self.attackers,
            PlayerPool::Midfield => &self.midfielders,
        }
    }

    pub fn pick(&self, pool: PlayerPool, rng: &mut MatchRng) -> String {
        rng.choose(self.pool(pool)).cloned().unwrap_or_default()
    }
}
