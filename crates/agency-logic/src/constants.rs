//! Balance constants: phase thresholds, efficiencies, satisfaction bands.
//!
//! These values are shared by the engine and the simtest harness. They are
//! deliberately not part of [`SimConfig`](crate::config::SimConfig): a save
//! file must never be able to re-tune the game's balance.

/// Phase activation thresholds on the predecessor's progress.
pub mod thresholds {
    pub const DESIGN_AFTER_MANAGEMENT: f64 = 0.6;
    pub const DEVELOPMENT_AFTER_DESIGN: f64 = 0.8;
    pub const REVIEW_AFTER_DEVELOPMENT: f64 = 1.0;
}

/// Required-hours multipliers applied to template complexity.
pub mod phase_hours {
    pub const MANAGEMENT: f64 = 3.0;
    pub const DESIGN: f64 = 4.0;
    pub const DEVELOPMENT: f64 = 5.0;
    pub const REVIEW: f64 = 3.0;
}

/// Progress added per simulated workday at efficiency 1.0.
pub mod phase_rates {
    pub const MANAGEMENT: f64 = 0.25;
    pub const DESIGN: f64 = 0.20;
    pub const DEVELOPMENT: f64 = 0.15;
    pub const REVIEW: f64 = 0.30;
}

pub mod efficiency {
    pub const LEAD: f64 = 0.9;
    pub const MATCH: f64 = 1.0;
    pub const MISMATCH: f64 = 0.6;
    pub const OVERTIME_PENALTY: f64 = 0.5;
    pub const MAX_SKILL: f64 = 5.0;
    pub const FREELANCER_MULTIPLIER: f64 = 1.5;
    pub const FREELANCER_MIN_SKILL: u8 = 3;
    pub const FREELANCER_MAX_SKILL: u8 = 5;
}

pub mod morale {
    pub const LOW_TRIGGER: f64 = 25.0;
    pub const LOW_RESET: f64 = 30.0;
    pub const HIGH_TRIGGER: f64 = 85.0;
    pub const HIGH_RESET: f64 = 80.0;
    /// Morale at or below which a member walks out.
    pub const QUIT_FLOOR: f64 = 5.0;
    /// Members below this count toward the collapse endings.
    pub const COLLAPSE_FLOOR: f64 = 10.0;
    pub const DAILY_DECAY: f64 = 1.0;
    pub const OVERWORK_DAYS: u32 = 10;
    pub const OVERWORK_PENALTY: f64 = 2.0;
    pub const IDLE_PENALTY: f64 = 1.5;
    pub const LOW_TEAM_MORALE: f64 = 50.0;
    pub const BURNOUT_CONTAGION_START: f64 = 50.0;
    pub const BURNOUT_CONTAGION_DIVISOR: f64 = 10.0;
    pub const COMPLETION_BOOST: f64 = 5.0;
    pub const CRISIS_HIT: f64 = 5.0;
}

pub mod burnout {
    pub const WARNING: f64 = 60.0;
    pub const CRITICAL: f64 = 80.0;
    pub const EXTREME: f64 = 90.0;
    /// Fraction of requested relief that actually lands.
    pub const RELIEF_DAMPING: f64 = 0.6;
    pub const BASE_STRESS: f64 = 0.005;
    pub const PER_PROJECT: f64 = 0.004;
    pub const PER_CRISIS_PROJECT: f64 = 0.012;
    pub const LOW_HOURS: f64 = 0.01;
    pub const LOW_HOURS_THRESHOLD: f64 = 4.0;
    pub const LOW_TEAM_MORALE: f64 = 0.008;
    pub const LOW_TEAM_MORALE_THRESHOLD: f64 = 40.0;
}

/// Penalties rolled on top of a resolved choice while the lead is at
/// extreme burnout.
pub mod burnout_fallout {
    /// Team morale lost when the lead snaps at everyone.
    pub const TEAM_MORALE_HIT: f64 = 5.0;
    /// Cost of an exhausted mistake.
    pub const MISTAKE_COST: i64 = 1_000;
    /// Extra burnout from being unable to switch off.
    pub const SPIRAL_BURNOUT: f64 = 5.0;
}

/// Weekend choice effects.
pub mod weekend {
    /// Burnout relief requested by resting, before damping.
    pub const REST_RELIEF: f64 = 10.0;
    pub const REST_MORALE: f64 = 3.0;
    pub const CATCH_UP_DAYS: u32 = 1;
    pub const CATCH_UP_BURNOUT: f64 = 6.0;
    pub const CATCH_UP_MORALE: f64 = -2.0;
    pub const CRUNCH_DAYS: u32 = 2;
    pub const CRUNCH_BURNOUT: f64 = 12.0;
    pub const CRUNCH_MORALE: f64 = -5.0;
}

pub mod illness {
    pub const BASE_CHANCE: f64 = 0.02;
    pub const OFTEN_ILL_MULTIPLIER: f64 = 2.5;
    pub const LOW_MORALE: f64 = 30.0;
    pub const LOW_MORALE_BONUS: f64 = 0.03;
    pub const LONG_STREAK_DAYS: u32 = 10;
    pub const LONG_STREAK_BONUS: f64 = 0.02;
}

pub mod satisfaction {
    pub const RESPONSIVE_HOURS: f64 = 4.0;
    pub const NEUTRAL_QUALITY: f64 = 0.5;
    pub const CRISIS_BELOW: f64 = 30.0;
    pub const WARNING_WEEKS: f64 = 2.0;
    pub const WARNING_PROGRESS: f64 = 0.7;
    pub const OVERDUE_DAILY_PENALTY: f64 = 3.0;
    pub const PERFECT_DELIVERY: f64 = 90.0;
}

pub mod deadlines {
    /// Overdue by more than this many weeks triggers the one-time cut.
    pub const CUT_AFTER_WEEKS: f64 = 2.0;
    pub const BUDGET_CUT: f64 = 0.30;
    pub const SCOPE_CUT: f64 = 0.20;
    /// Overdue by more than this many weeks cancels the project.
    pub const FAIL_AFTER_WEEKS: f64 = 4.0;
    pub const LATE_FEE_PER_WEEK: f64 = 0.10;
    pub const LATE_FEE_CAP: f64 = 0.50;
}

pub mod scope {
    pub const PENALTY_PER_REPEAT: f64 = 3.0;
    pub const PENALTY_CAP: f64 = 15.0;
}
