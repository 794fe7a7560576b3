//! Roles, phases, and the worker efficiency model.
//!
//! Every unit of project progress in the game is produced here:
//!
//! ```text
//! efficiency = role_fit × (skill / 5 × multiplier) × (morale / 100)
//!            × overtime_penalty × time_fraction
//! delta      = Σ efficiency × phase_rate × day_fraction
//! ```
//!
//! ```
//! use agency_logic::efficiency::{PhaseKind, Role, role_efficiency};
//!
//! assert_eq!(role_efficiency(Role::Designer, PhaseKind::Design), 1.0);
//! assert_eq!(role_efficiency(Role::Lead, PhaseKind::Review), 0.9);
//! assert_eq!(role_efficiency(Role::Developer, PhaseKind::Design), 0.6);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{efficiency, phase_hours, phase_rates, thresholds};

/// Team member role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The agency lead, played by the user.
    Lead,
    Manager,
    Designer,
    Developer,
    Junior,
    ArtDirector,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Lead => "Agency Lead",
            Role::Manager => "Project Manager",
            Role::Designer => "Designer",
            Role::Developer => "Developer",
            Role::Junior => "Junior Designer",
            Role::ArtDirector => "Art Director",
        }
    }

    /// The phase this role is hired for, if any.
    pub fn home_phase(self) -> Option<PhaseKind> {
        match self {
            Role::Manager => Some(PhaseKind::Management),
            Role::Designer => Some(PhaseKind::Design),
            Role::Developer => Some(PhaseKind::Development),
            _ => None,
        }
    }
}

/// The four phases every project moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Management,
    Design,
    Development,
    Review,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 4] = [
        PhaseKind::Management,
        PhaseKind::Design,
        PhaseKind::Development,
        PhaseKind::Review,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PhaseKind::Management => "management",
            PhaseKind::Design => "design",
            PhaseKind::Development => "development",
            PhaseKind::Review => "review",
        }
    }

    pub fn predecessor(self) -> Option<PhaseKind> {
        match self {
            PhaseKind::Management => None,
            PhaseKind::Design => Some(PhaseKind::Management),
            PhaseKind::Development => Some(PhaseKind::Design),
            PhaseKind::Review => Some(PhaseKind::Development),
        }
    }

    pub fn successor(self) -> Option<PhaseKind> {
        match self {
            PhaseKind::Management => Some(PhaseKind::Design),
            PhaseKind::Design => Some(PhaseKind::Development),
            PhaseKind::Development => Some(PhaseKind::Review),
            PhaseKind::Review => None,
        }
    }

    /// Predecessor progress needed before this phase may start.
    pub fn activation_threshold(self) -> f64 {
        match self {
            PhaseKind::Management => 0.0,
            PhaseKind::Design => thresholds::DESIGN_AFTER_MANAGEMENT,
            PhaseKind::Development => thresholds::DEVELOPMENT_AFTER_DESIGN,
            PhaseKind::Review => thresholds::REVIEW_AFTER_DEVELOPMENT,
        }
    }

    /// Progress per workday at efficiency 1.0.
    pub fn base_rate(self) -> f64 {
        match self {
            PhaseKind::Management => phase_rates::MANAGEMENT,
            PhaseKind::Design => phase_rates::DESIGN,
            PhaseKind::Development => phase_rates::DEVELOPMENT,
            PhaseKind::Review => phase_rates::REVIEW,
        }
    }

    pub fn hours_multiplier(self) -> f64 {
        match self {
            PhaseKind::Management => phase_hours::MANAGEMENT,
            PhaseKind::Design => phase_hours::DESIGN,
            PhaseKind::Development => phase_hours::DEVELOPMENT,
            PhaseKind::Review => phase_hours::REVIEW,
        }
    }
}

/// Phase lifecycle. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Waiting,
    Ready,
    Active,
    Complete,
}

impl PhaseStatus {
    /// Whether progress may accrue in this status.
    pub fn is_workable(self) -> bool {
        matches!(self, PhaseStatus::Ready | PhaseStatus::Active)
    }
}

/// Role-to-phase fit.
pub fn role_efficiency(role: Role, phase: PhaseKind) -> f64 {
    match (role, phase) {
        (Role::Lead, _) => efficiency::LEAD,
        (Role::Manager, PhaseKind::Management | PhaseKind::Review)
        | (Role::Designer, PhaseKind::Design)
        | (Role::Developer, PhaseKind::Development) => efficiency::MATCH,
        _ => efficiency::MISMATCH,
    }
}

/// Whether `phase` may start given its predecessor's progress.
pub fn can_activate(phase: PhaseKind, predecessor_progress: Option<f64>) -> bool {
    match phase.predecessor() {
        None => true,
        Some(_) => {
            let p = predecessor_progress.unwrap_or(0.0);
            p + 1e-9 >= phase.activation_threshold()
        }
    }
}

/// Next status for a phase given its own and its predecessor's progress.
///
/// Transitions are forward-only and single-step: `Waiting` becomes
/// `Ready` once eligible, `Ready` becomes `Active` once someone has
/// contributed work, and any status becomes `Complete` at full progress.
pub fn derive_phase_status(
    current: PhaseStatus,
    phase: PhaseKind,
    progress: f64,
    predecessor_progress: Option<f64>,
    worked: bool,
) -> PhaseStatus {
    if current == PhaseStatus::Complete || progress >= 1.0 {
        return PhaseStatus::Complete;
    }
    match current {
        PhaseStatus::Waiting if can_activate(phase, predecessor_progress) => PhaseStatus::Ready,
        PhaseStatus::Ready if worked => PhaseStatus::Active,
        other => other,
    }
}

/// Per-member inputs to the efficiency formula.
#[derive(Debug, Clone)]
pub struct WorkerInput {
    pub role: Role,
    /// Skill level 1..=5.
    pub skill: u8,
    /// Trait/training multiplier on skill. 1.0 for most members.
    pub skill_multiplier: f64,
    pub morale: f64,
    pub hours_remaining: f64,
    pub is_ill: bool,
    pub is_player: bool,
    /// Number of workable phases this member is split across, including this one.
    pub concurrent_assignments: usize,
}

/// Share of a member's time that goes to one of their assignments.
pub fn time_fraction(concurrent_assignments: usize) -> f64 {
    1.0 / concurrent_assignments.max(1) as f64
}

/// Whether the member is able to contribute at all this tick.
pub fn can_contribute(w: &WorkerInput) -> bool {
    if w.is_ill {
        return false;
    }
    // Only the lead is allowed to keep working into hour debt.
    w.is_player || w.hours_remaining > 0.0
}

/// Efficiency of one member on one phase.
pub fn worker_efficiency(w: &WorkerInput, phase: PhaseKind) -> f64 {
    if !can_contribute(w) {
        return 0.0;
    }
    let skill = (w.skill as f64 / efficiency::MAX_SKILL) * w.skill_multiplier;
    let morale = (w.morale / 100.0).clamp(0.0, 1.0);
    let overtime = if w.hours_remaining < 0.0 {
        efficiency::OVERTIME_PENALTY
    } else {
        1.0
    };
    role_efficiency(w.role, phase) * skill * morale * overtime * time_fraction(w.concurrent_assignments)
}

/// Flat contribution of a hired freelancer.
pub fn freelancer_efficiency(skill: u8) -> f64 {
    (skill as f64 / efficiency::MAX_SKILL) * efficiency::MATCH * efficiency::FREELANCER_MULTIPLIER
}

/// Progress added to a phase for the given summed efficiency.
///
/// `day_fraction` is the share of a workday being simulated, e.g.
/// `tick_hours / workday_hours` for one tick.
pub fn phase_progress_delta(total_efficiency: f64, phase: PhaseKind, day_fraction: f64) -> f64 {
    (total_efficiency * phase.base_rate() * day_fraction).max(0.0)
}
