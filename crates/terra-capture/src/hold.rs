use serde::{Deserialize, Serialize};
use terra_core::{EpochMillis, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRules {
    pub interval_ms: u64,
    pub points_per_interval: u64,
}

impl Default for HoldRules {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            points_per_interval: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HoldUpdate {
    pub updated: bool,
    pub points_added: u64,
}

#[derive(Debug, Clone)]
pub struct HoldTracker {
    owner_team: Team,
    rules: HoldRules,
    points: u64,
    last_update_ms: EpochMillis,
}

impl HoldTracker {
    pub fn new(owner_team: Team, rules: HoldRules, now_ms: EpochMillis) -> Self {
        Self {
            owner_team,
            rules,
            points: 0,
            last_update_ms: now_ms,
        }
    }

    pub fn tick(&mut self, now_ms: EpochMillis) -> HoldUpdate {
        if now_ms.saturating_sub(self.last_update_ms) < self.rules.interval_ms {
            return HoldUpdate::default();
        }
        self.points += self.rules.points_per_interval;
        self.last_update_ms = now_ms;
        HoldUpdate {
            updated: true,
            points_added: self.rules.points_per_interval,
        }
    }

    pub fn reset(&mut self, now_ms: EpochMillis) {
        self.points = 0;
        self.last_update_ms = now_ms;
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn owner_team(&self) -> Team {
        self.owner_team
    }
}
