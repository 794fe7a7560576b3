//! Client satisfaction scoring, project status, and risk labels.
//!
//! Satisfaction is a weighted sum of four normalized sub-scores. The
//! weights come from each client's [`ClientProfile`]; they are expected
//! to sum to 1.0 but that is not enforced.
//!
//! | Sub-score | Source |
//! |-----------|--------|
//! | quality | assigned members' effective skill × average morale |
//! | deadlines | 0.5 + (actual − expected progress) |
//! | responsiveness | 1.0 within 4h, else 4 / latency |
//! | budget | stored budget-health ratio |

use serde::{Deserialize, Serialize};

use crate::constants::satisfaction;

/// Per-client weighting of the four satisfaction factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientProfile {
    pub quality: f64,
    pub deadlines: f64,
    pub responsiveness: f64,
    pub budget: f64,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            quality: 0.3,
            deadlines: 0.3,
            responsiveness: 0.2,
            budget: 0.2,
        }
    }
}

impl ClientProfile {
    pub fn weight_sum(&self) -> f64 {
        self.quality + self.deadlines + self.responsiveness + self.budget
    }
}

/// One assigned worker as seen by the quality sub-score.
#[derive(Debug, Clone, Copy)]
pub struct QualityContributor {
    /// Skill after multipliers, normalized to [0, 1].
    pub effective_skill: f64,
    pub morale: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SatisfactionInputs {
    pub contributors: Vec<QualityContributor>,
    pub actual_progress: f64,
    pub expected_progress: f64,
    pub response_latency_hours: f64,
    pub budget_health: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub quality: f64,
    pub deadlines: f64,
    pub responsiveness: f64,
    pub budget: f64,
}

pub fn quality_score(contributors: &[QualityContributor]) -> f64 {
    if contributors.is_empty() {
        return satisfaction::NEUTRAL_QUALITY;
    }
    let n = contributors.len() as f64;
    let skill = contributors.iter().map(|c| c.effective_skill).sum::<f64>() / n;
    let morale = contributors.iter().map(|c| c.morale).sum::<f64>() / n / 100.0;
    (skill * morale).clamp(0.0, 1.0)
}

pub fn deadline_score(actual_progress: f64, expected_progress: f64) -> f64 {
    (0.5 + (actual_progress - expected_progress)).clamp(0.0, 1.0)
}

pub fn responsiveness_score(latency_hours: f64) -> f64 {
    if latency_hours <= satisfaction::RESPONSIVE_HOURS {
        1.0
    } else {
        (satisfaction::RESPONSIVE_HOURS / latency_hours).clamp(0.0, 1.0)
    }
}

pub fn sub_scores(inputs: &SatisfactionInputs) -> SubScores {
    SubScores {
        quality: quality_score(&inputs.contributors),
        deadlines: deadline_score(inputs.actual_progress, inputs.expected_progress),
        responsiveness: responsiveness_score(inputs.response_latency_hours),
        budget: inputs.budget_health.clamp(0.0, 1.0),
    }
}

/// Final 0–100 satisfaction score.
pub fn satisfaction_score(profile: &ClientProfile, inputs: &SatisfactionInputs) -> f64 {
    let s = sub_scores(inputs);
    let weighted = s.quality * profile.quality
        + s.deadlines * profile.deadlines
        + s.responsiveness * profile.responsiveness
        + s.budget * profile.budget;
    (100.0 * weighted).round().clamp(0.0, 100.0)
}

/// Overall project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Ok,
    Warning,
    Crisis,
    Complete,
    Cancelled,
}

impl ProjectStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Complete | ProjectStatus::Cancelled)
    }
}

/// Status derived from hours, schedule and satisfaction.
pub fn derive_project_status(
    hours_completed: f64,
    estimated_hours: f64,
    weeks_remaining: f64,
    satisfaction_score: f64,
    progress: f64,
) -> ProjectStatus {
    if estimated_hours > 0.0 && hours_completed + 1e-9 >= estimated_hours {
        ProjectStatus::Complete
    } else if weeks_remaining < 0.0 || satisfaction_score < satisfaction::CRISIS_BELOW {
        ProjectStatus::Crisis
    } else if weeks_remaining < satisfaction::WARNING_WEEKS && progress < satisfaction::WARNING_PROGRESS {
        ProjectStatus::Warning
    } else {
        ProjectStatus::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSummary {
    pub scope: RiskLevel,
    pub timeline: RiskLevel,
    pub satisfaction: RiskLevel,
    pub scope_creep: RiskLevel,
}

pub fn scope_risk(current_hours: f64, original_hours: f64) -> RiskLevel {
    if original_hours <= 0.0 {
        return RiskLevel::None;
    }
    let growth = (current_hours - original_hours) / original_hours;
    if growth >= 0.30 {
        RiskLevel::High
    } else if growth >= 0.10 {
        RiskLevel::Medium
    } else {
        RiskLevel::None
    }
}

pub fn satisfaction_risk(score: f64) -> RiskLevel {
    if score <= 40.0 {
        RiskLevel::High
    } else if score <= 65.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::None
    }
}

pub fn timeline_risk(weeks_remaining: f64) -> RiskLevel {
    if weeks_remaining <= 0.0 {
        RiskLevel::High
    } else if weeks_remaining <= 1.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::None
    }
}

pub fn scope_creep_risk(count: u32) -> RiskLevel {
    match count {
        0 => RiskLevel::None,
        1 => RiskLevel::Low,
        2 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

pub fn assess_risk(
    current_hours: f64,
    original_hours: f64,
    weeks_remaining: f64,
    satisfaction_score: f64,
    scope_creep_count: u32,
) -> RiskSummary {
    RiskSummary {
        scope: scope_risk(current_hours, original_hours),
        timeline: timeline_risk(weeks_remaining),
        satisfaction: satisfaction_risk(satisfaction_score),
        scope_creep: scope_creep_risk(scope_creep_count),
    }
}

/// Tone of the weekly client check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackBand {
    Delighted,
    Content,
    Uneasy,
    Unhappy,
}

pub fn feedback_band(score: f64) -> FeedbackBand {
    if score >= 80.0 {
        FeedbackBand::Delighted
    } else if score >= 60.0 {
        FeedbackBand::Content
    } else if score >= 40.0 {
        FeedbackBand::Uneasy
    } else {
        FeedbackBand::Unhappy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_inputs() -> SatisfactionInputs {
        SatisfactionInputs {
            contributors: vec![],
            actual_progress: 0.0,
            expected_progress: 0.0,
            response_latency_hours: 0.0,
            budget_health: 1.0,
        }
    }

    #[test]
    fn test_default_profile_sums_to_one() {
        assert!((ClientProfile::default().weight_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_project_score() {
        // quality 0.5, deadlines 0.5, responsiveness 1.0, budget 1.0
        let s = satisfaction_score(&ClientProfile::default(), &neutral_inputs());
        assert_eq!(s, 70.0);
    }

    #[test]
    fn test_quality_from_contributors() {
        let q = quality_score(&[
            QualityContributor { effective_skill: 1.0, morale: 80.0 },
            QualityContributor { effective_skill: 0.6, morale: 60.0 },
        ]);
        assert!((q - 0.8 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_responsiveness_decays_after_four_hours() {
        assert_eq!(responsiveness_score(4.0), 1.0);
        assert!((responsiveness_score(8.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_deadline_score_clamped() {
        assert_eq!(deadline_score(1.0, 0.0), 1.0);
        assert_eq!(deadline_score(0.0, 1.0), 0.0);
        assert!((deadline_score(0.5, 0.4) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_status_crisis_when_overdue_and_unhappy() {
        let s = derive_project_status(5.0, 15.0, -0.5, 25.0, 0.33);
        assert_eq!(s, ProjectStatus::Crisis);
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(derive_project_status(15.0, 15.0, -3.0, 10.0, 1.0), ProjectStatus::Complete);
        assert_eq!(derive_project_status(5.0, 15.0, 1.0, 70.0, 0.3), ProjectStatus::Warning);
        assert_eq!(derive_project_status(12.0, 15.0, 1.0, 70.0, 0.8), ProjectStatus::Ok);
        assert_eq!(derive_project_status(1.0, 15.0, 3.0, 29.0, 0.1), ProjectStatus::Crisis);
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(scope_risk(13.0, 10.0), RiskLevel::High);
        assert_eq!(scope_risk(11.0, 10.0), RiskLevel::Medium);
        assert_eq!(scope_risk(10.5, 10.0), RiskLevel::None);
        assert_eq!(satisfaction_risk(40.0), RiskLevel::High);
        assert_eq!(satisfaction_risk(65.0), RiskLevel::Medium);
        assert_eq!(satisfaction_risk(66.0), RiskLevel::None);
        assert_eq!(timeline_risk(0.0), RiskLevel::High);
        assert_eq!(timeline_risk(1.5), RiskLevel::Medium);
        assert_eq!(timeline_risk(2.0), RiskLevel::None);
        assert_eq!(scope_creep_risk(3), RiskLevel::High);
        assert_eq!(scope_creep_risk(2), RiskLevel::Medium);
        assert_eq!(scope_creep_risk(1), RiskLevel::Low);
        assert_eq!(scope_creep_risk(0), RiskLevel::None);
    }

    #[test]
    fn test_feedback_bands() {
        assert_eq!(feedback_band(85.0), FeedbackBand::Delighted);
        assert_eq!(feedback_band(60.0), FeedbackBand::Content);
        assert_eq!(feedback_band(45.0), FeedbackBand::Uneasy);
        assert_eq!(feedback_band(10.0), FeedbackBand::Unhappy);
    }
}
