//! Burnout, morale drift, and illness formulas.
//!
//! Burnout never decreases on its own. Relief only arrives through
//! explicit choices, and [`damp_burnout_delta`] cuts every reduction to
//! 60% of its face value.

use serde::{Deserialize, Serialize};

use crate::constants::{burnout, illness, morale};

/// Inputs to the lead's per-tick stress accrual.
#[derive(Debug, Clone, Copy, Default)]
pub struct StressInputs {
    /// Active projects the lead is assigned to.
    pub assigned_projects: usize,
    /// Of those, projects in crisis.
    pub crisis_projects: usize,
    pub hours_remaining: f64,
    pub team_morale: f64,
}

/// Burnout gained over one tick.
pub fn burnout_accrual(inputs: &StressInputs) -> f64 {
    let mut delta = burnout::BASE_STRESS;
    delta += burnout::PER_PROJECT * inputs.assigned_projects as f64;
    delta += burnout::PER_CRISIS_PROJECT * inputs.crisis_projects as f64;
    if inputs.hours_remaining < burnout::LOW_HOURS_THRESHOLD {
        delta += burnout::LOW_HOURS;
    }
    if inputs.team_morale < burnout::LOW_TEAM_MORALE_THRESHOLD {
        delta += burnout::LOW_TEAM_MORALE;
    }
    delta
}

/// Applies relief damping: decreases land at 60%, increases in full.
pub fn damp_burnout_delta(delta: f64) -> f64 {
    if delta < 0.0 {
        delta * burnout::RELIEF_DAMPING
    } else {
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutThreshold {
    Warning,
    Critical,
}

impl BurnoutThreshold {
    pub fn value(self) -> f64 {
        match self {
            BurnoutThreshold::Warning => burnout::WARNING,
            BurnoutThreshold::Critical => burnout::CRITICAL,
        }
    }
}

/// Thresholds crossed on the way up from `before` to `after`.
pub fn burnout_crossings(before: f64, after: f64) -> Vec<BurnoutThreshold> {
    [BurnoutThreshold::Warning, BurnoutThreshold::Critical]
        .into_iter()
        .filter(|t| before < t.value() && after >= t.value())
        .collect()
}

/// Inputs to one member's daily morale drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftInputs {
    pub never_demoralized: bool,
    pub days_on_assignment: u32,
    pub assigned: bool,
    pub team_morale: f64,
    pub lead_burnout: f64,
}

/// Morale change for one day. Always zero or negative.
pub fn morale_drift(inputs: &DriftInputs) -> f64 {
    if inputs.never_demoralized {
        return 0.0;
    }
    let mut delta = -morale::DAILY_DECAY;
    if inputs.assigned && inputs.days_on_assignment > morale::OVERWORK_DAYS {
        delta -= morale::OVERWORK_PENALTY;
    }
    if !inputs.assigned {
        delta -= morale::IDLE_PENALTY;
    }
    if inputs.team_morale < morale::LOW_TEAM_MORALE
        && inputs.lead_burnout > morale::BURNOUT_CONTAGION_START
    {
        delta -= (inputs.lead_burnout - morale::BURNOUT_CONTAGION_START)
            / morale::BURNOUT_CONTAGION_DIVISOR;
    }
    delta
}

/// Daily chance of a member falling ill.
pub fn illness_chance(often_ill: bool, morale_value: f64, streak_days: u32) -> f64 {
    let mut chance = illness::BASE_CHANCE;
    if often_ill {
        chance *= illness::OFTEN_ILL_MULTIPLIER;
    }
    if morale_value < illness::LOW_MORALE {
        chance += illness::LOW_MORALE_BONUS;
    }
    if streak_days > illness::LONG_STREAK_DAYS {
        chance += illness::LONG_STREAK_BONUS;
    }
    chance.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoraleCrossing {
    Low,
    High,
}

/// Hysteresis for the low/high morale personality events.
///
/// Low fires on falling below 25 and re-arms at 30. High fires on rising
/// above 85 and re-arms at 80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoraleLatch {
    pub low_armed: bool,
    pub high_armed: bool,
}

impl Default for MoraleLatch {
    fn default() -> Self {
        Self {
            low_armed: true,
            high_armed: true,
        }
    }
}

impl MoraleLatch {
    pub fn update(&mut self, before: f64, after: f64) -> Option<MoraleCrossing> {
        if after >= morale::LOW_RESET {
            self.low_armed = true;
        }
        if after <= morale::HIGH_RESET {
            self.high_armed = true;
        }
        if self.low_armed && before >= morale::LOW_TRIGGER && after < morale::LOW_TRIGGER {
            self.low_armed = false;
            return Some(MoraleCrossing::Low);
        }
        if self.high_armed && before <= morale::HIGH_TRIGGER && after > morale::HIGH_TRIGGER {
            self.high_armed = false;
            return Some(MoraleCrossing::High);
        }
        None
    }
}
