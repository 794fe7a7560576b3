//! Running campaign statistics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub projects_completed: u32,
    pub projects_failed: u32,
    pub projects_cancelled: u32,
    pub on_time_deliveries: u32,
    pub perfect_deliveries: u32,
    pub deadlines_missed: u32,
    pub team_quits: u32,
    pub scope_creep_handled: u32,
    pub events_resolved: u32,
    pub sick_days: u32,
    /// Sum of final satisfaction over completed projects.
    pub completed_satisfaction_total: f64,
    pub total_earned: i64,
    pub min_team_morale: f64,
    pub max_team_morale: f64,
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            projects_completed: 0,
            projects_failed: 0,
            projects_cancelled: 0,
            on_time_deliveries: 0,
            perfect_deliveries: 0,
            deadlines_missed: 0,
            team_quits: 0,
            scope_creep_handled: 0,
            events_resolved: 0,
            sick_days: 0,
            completed_satisfaction_total: 0.0,
            total_earned: 0,
            min_team_morale: 100.0,
            max_team_morale: 0.0,
        }
    }
}

impl GameStats {
    pub fn average_completed_satisfaction(&self) -> f64 {
        if self.projects_completed == 0 {
            0.0
        } else {
            self.completed_satisfaction_total / self.projects_completed as f64
        }
    }

    pub fn record_team_morale(&mut self, morale: f64) {
        self.min_team_morale = self.min_team_morale.min(morale);
        self.max_team_morale = self.max_team_morale.max(morale);
    }
}
