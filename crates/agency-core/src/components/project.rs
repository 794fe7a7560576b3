//! Projects and their phases.
//!
//! Aggregate progress, hours and estimate are always derived from the
//! four phases and never stored.

use agency_logic::calendar::CalendarDay;
use agency_logic::efficiency::{PhaseKind, PhaseStatus};
use agency_logic::satisfaction::{ClientProfile, ProjectStatus, RiskSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase {
    pub kind: PhaseKind,
    /// 0.0..=1.0
    pub progress: f64,
    pub status: PhaseStatus,
    pub hours_required: f64,
    /// Skill of the hired freelancer, if any.
    pub freelancer: Option<u8>,
    /// Work started before the predecessor finished.
    pub risky_overlap: bool,
}

impl Default for Phase {
    fn default() -> Self {
        Self::new(PhaseKind::Management, 0.0)
    }
}

impl Phase {
    pub fn new(kind: PhaseKind, hours_required: f64) -> Self {
        Self {
            kind,
            progress: 0.0,
            status: if kind == PhaseKind::Management {
                PhaseStatus::Ready
            } else {
                PhaseStatus::Waiting
            },
            hours_required,
            freelancer: None,
            risky_overlap: false,
        }
    }

    pub fn hours_completed(&self) -> f64 {
        self.progress * self.hours_required
    }

    pub fn is_complete(&self) -> bool {
        self.status == PhaseStatus::Complete
    }
}

/// Exactly four phases, one per [`PhaseKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMap {
    pub management: Phase,
    pub design: Phase,
    pub development: Phase,
    pub review: Phase,
}

impl PhaseMap {
    pub fn from_hours(hours: impl Fn(PhaseKind) -> f64) -> Self {
        Self {
            management: Phase::new(PhaseKind::Management, hours(PhaseKind::Management)),
            design: Phase::new(PhaseKind::Design, hours(PhaseKind::Design)),
            development: Phase::new(PhaseKind::Development, hours(PhaseKind::Development)),
            review: Phase::new(PhaseKind::Review, hours(PhaseKind::Review)),
        }
    }

    pub fn get(&self, kind: PhaseKind) -> &Phase {
        match kind {
            PhaseKind::Management => &self.management,
            PhaseKind::Design => &self.design,
            PhaseKind::Development => &self.development,
            PhaseKind::Review => &self.review,
        }
    }

    pub fn get_mut(&mut self, kind: PhaseKind) -> &mut Phase {
        match kind {
            PhaseKind::Management => &mut self.management,
            PhaseKind::Design => &mut self.design,
            PhaseKind::Development => &mut self.development,
            PhaseKind::Review => &mut self.review,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        [&self.management, &self.design, &self.development, &self.review].into_iter()
    }
}

impl Default for PhaseMap {
    fn default() -> Self {
        Self::from_hours(|_| 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub client: String,
    pub client_profile: ClientProfile,
    pub budget: i64,
    pub total_weeks: f64,
    pub weeks_remaining: f64,
    pub phases: PhaseMap,
    pub status: ProjectStatus,
    pub satisfaction: f64,
    /// Accumulated client mood from events and penalties, added on top of
    /// the computed score.
    pub satisfaction_offset: f64,
    pub risk: RiskSummary,
    pub scope_creep_count: u32,
    /// Stored budget-status ratio, 0..=1.
    pub budget_health: f64,
    pub response_latency_hours: f64,
    pub original_estimated_hours: f64,
    /// Ordinal of the last day weeks_remaining was decremented.
    pub last_decrement_day: Option<u32>,
    pub deadline_missed: bool,
    pub crisis_penalty_applied: bool,
    pub deadline_cut_applied: bool,
    pub failed: bool,
    pub completed_on: Option<CalendarDay>,
    pub payment: Option<i64>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: String::new(),
            template_id: String::new(),
            name: String::new(),
            client: String::new(),
            client_profile: ClientProfile::default(),
            budget: 0,
            total_weeks: 2.0,
            weeks_remaining: 2.0,
            phases: PhaseMap::default(),
            status: ProjectStatus::Ok,
            satisfaction: 70.0,
            satisfaction_offset: 0.0,
            risk: RiskSummary::default(),
            scope_creep_count: 0,
            budget_health: 1.0,
            response_latency_hours: 0.0,
            original_estimated_hours: 0.0,
            last_decrement_day: None,
            deadline_missed: false,
            crisis_penalty_applied: false,
            deadline_cut_applied: false,
            failed: false,
            completed_on: None,
            payment: None,
        }
    }
}

impl Project {
    pub fn estimated_hours(&self) -> f64 {
        self.phases.iter().map(|p| p.hours_required).sum()
    }

    pub fn hours_completed(&self) -> f64 {
        self.phases.iter().map(|p| p.hours_completed()).sum()
    }

    /// Hours-weighted progress across all four phases.
    pub fn progress(&self) -> f64 {
        let total = self.estimated_hours();
        if total <= 0.0 {
            return 0.0;
        }
        self.hours_completed() / total
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn all_phases_complete(&self) -> bool {
        self.phases.iter().all(|p| p.progress >= 1.0)
    }

    /// The earliest phase that is open for work, if any.
    pub fn current_phase(&self) -> Option<PhaseKind> {
        self.phases
            .iter()
            .find(|p| p.status.is_workable())
            .map(|p| p.kind)
    }

    pub fn weeks_late(&self) -> f64 {
        (-self.weeks_remaining).max(0.0)
    }

    pub fn is_overdue(&self) -> bool {
        self.weeks_remaining < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: "p1".into(),
            phases: PhaseMap::from_hours(|k| k.hours_multiplier()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_phases_start_gated() {
        let p = project();
        assert_eq!(p.phases.management.status, PhaseStatus::Ready);
        assert_eq!(p.phases.design.status, PhaseStatus::Waiting);
        assert_eq!(p.current_phase(), Some(PhaseKind::Management));
    }

    #[test]
    fn test_progress_is_hours_weighted() {
        let mut p = project();
        p.phases.management.progress = 1.0;
        p.phases.design.progress = 0.5;
        // (3 + 2) / 15
        assert!((p.progress() - 5.0 / 15.0).abs() < 1e-12);
        assert!((p.hours_completed() - 5.0).abs() < 1e-12);
        assert_eq!(p.estimated_hours(), 15.0);
    }

    #[test]
    fn test_weeks_late() {
        let mut p = project();
        p.weeks_remaining = -1.5;
        assert!(p.is_overdue());
        assert_eq!(p.weeks_late(), 1.5);
    }
}
