//! Match clock. Owns the minute cursor the timeline advances through.

use crate::types::Minute;
use serde::{Deserialize, Serialize};

pub const KICKOFF_MINUTE: Minute = 0;
pub const HALFTIME_MINUTE: Minute = 45;
pub const FULLTIME_MINUTE: Minute = 90;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchClock {
    cursor: Minute,
}

impl MatchClock {
    /// A clock positioned at minute 1, just after kickoff.
    pub fn new() -> Self {
        Self { cursor: KICKOFF_MINUTE + 1 }
    }

    pub fn minute(&self) -> Minute {
        self.cursor
    }

    /// True until the cursor passes full time.
    pub fn is_running(&self) -> bool {
        self.cursor <= FULLTIME_MINUTE
    }

    /// Move forward by `step` minutes, stopping at `stop_at` if that comes first.
    /// Returns the new minute.
    pub fn advance(&mut self, step: Minute, stop_at: Option<Minute>) -> Minute {
        let target = self.cursor.saturating_add(step);
        self.cursor = match stop_at {
            Some(stop) if stop >= self.cursor => target.min(stop),
            _ => target,
        };
        self.cursor
    }

    /// Continue from the minute after `minute`.
    pub fn resume_after(&mut self, minute: Minute) {
        self.cursor = minute.saturating_add(1);
    }

    /// If the cursor sits exactly on the half-time minute, move it to the
    /// start of the second half and report true.
    pub fn take_halftime(&mut self) -> bool {
        if self.cursor == HALFTIME_MINUTE {
            self.cursor = HALFTIME_MINUTE + 1;
            true
        } else {
            false
        }
    }
}

impl Default for MatchClock {
    fn default() -> Self {
        Self::new()
    }
}
