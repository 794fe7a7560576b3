//! End-of-campaign scoring, victory tiers, and payment adjustments.

use serde::{Deserialize, Serialize};

use crate::constants::deadlines;

/// How well the campaign went. Each tier requires all of its criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryTier {
    Rockstar,
    Professional,
    Survivor,
    Struggled,
}

struct TierCriteria {
    tier: VictoryTier,
    completed: u32,
    money: i64,
    satisfaction: f64,
    morale: f64,
}

const TIERS: [TierCriteria; 3] = [
    TierCriteria {
        tier: VictoryTier::Rockstar,
        completed: 5,
        money: 50_000,
        satisfaction: 85.0,
        morale: 70.0,
    },
    TierCriteria {
        tier: VictoryTier::Professional,
        completed: 3,
        money: 20_000,
        satisfaction: 70.0,
        morale: 50.0,
    },
    TierCriteria {
        tier: VictoryTier::Survivor,
        completed: 1,
        money: 0,
        satisfaction: 50.0,
        morale: 30.0,
    },
];

/// Aggregates the tiering and score formula read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerSummary {
    pub projects_completed: u32,
    pub money: i64,
    /// Mean satisfaction of completed projects.
    pub average_satisfaction: f64,
    pub team_morale: f64,
    pub perfect_deliveries: u32,
    pub scope_creep_handled: u32,
    pub projects_failed: u32,
    pub deadlines_missed: u32,
    pub team_quits: u32,
    /// Weeks left on the calendar when the game ended.
    pub weeks_remaining: u32,
}

pub fn classify_victory(s: &CareerSummary) -> VictoryTier {
    TIERS
        .iter()
        .find(|c| {
            s.projects_completed >= c.completed
                && s.money >= c.money
                && s.average_satisfaction >= c.satisfaction
                && s.team_morale >= c.morale
        })
        .map(|c| c.tier)
        .unwrap_or(VictoryTier::Struggled)
}

/// Weighted final score.
pub fn final_score(s: &CareerSummary) -> i64 {
    let mut score = 0i64;
    score += s.projects_completed as i64 * 1000;
    score += s.money / 10;
    score += (s.average_satisfaction * 20.0).round() as i64;
    score += (s.team_morale * 10.0).round() as i64;
    score += s.perfect_deliveries as i64 * 500;
    score += s.scope_creep_handled as i64 * 200;
    score -= s.projects_failed as i64 * 750;
    score -= s.deadlines_missed as i64 * 300;
    score -= s.team_quits as i64 * 400;
    score += s.weeks_remaining as i64 * 100;
    score
}

/// Budget multiplier for a newly offered project given the agency's
/// history of missed deadlines.
///
/// ```
/// use agency_logic::scoring::reputation_budget_factor;
///
/// assert_eq!(reputation_budget_factor(0, 4), 1.0);
/// assert_eq!(reputation_budget_factor(2, 3), 0.7);
/// ```
pub fn reputation_budget_factor(missed: u32, delivered: u32) -> f64 {
    let total = missed + delivered;
    if total == 0 {
        return 1.0;
    }
    let ratio = missed as f64 / total as f64;
    if ratio >= 0.5 {
        0.5
    } else if ratio >= 0.3 {
        0.7
    } else if ratio >= 0.1 {
        0.9
    } else {
        1.0
    }
}

/// Late fee as a fraction of payment.
pub fn late_fee_fraction(weeks_late: f64) -> f64 {
    if weeks_late <= 0.0 {
        return 0.0;
    }
    (weeks_late * deadlines::LATE_FEE_PER_WEEK).min(deadlines::LATE_FEE_CAP)
}

/// Payment on delivery: budget scaled by satisfaction, minus any late fee.
pub fn completion_payment(budget: i64, satisfaction: f64, weeks_late: f64) -> i64 {
    let gross = budget as f64 * (satisfaction / 100.0).clamp(0.0, 1.0);
    (gross * (1.0 - late_fee_fraction(weeks_late))).round() as i64
}
