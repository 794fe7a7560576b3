//! Conversation templates.

use agency_logic::calendar::GamePhase;
use agency_logic::efficiency::Role;
use agency_logic::satisfaction::ProjectStatus;
use agency_logic::wellbeing::{BurnoutThreshold, MoraleCrossing};
use serde::{Deserialize, Serialize};

use super::Consequence;
use crate::components::Personality;

/// When a conversation may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    Fixed { week: u32, day: u32 },
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
}

/// Predicate that makes a conditional conversation eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    PlayerBurnoutAbove { threshold: f64 },
    TeamMoraleBelow { threshold: f64 },
    /// Fires from a burnout threshold crossing.
    BurnoutCrossed { threshold: BurnoutThreshold },
    /// Fires from a member's morale latch. Binds `{{MEMBER}}`.
    MoraleCrossed {
        crossing: MoraleCrossing,
        #[serde(default)]
        personality: Option<Personality>,
    },
    /// Binds `{{LINKED}}` to the first open project in `status`.
    ProjectStatusIs { status: ProjectStatus },
    /// Binds `{{LINKED}}` to the first open project in the band.
    ProjectProgressBetween { min: f64, max: f64 },
    /// A random member of `role` has something to say. Binds `{{MEMBER}}`.
    RoleCheckIn {
        role: Role,
        #[serde(default)]
        personality: Option<Personality>,
    },
    /// Time-of-day reminder on workdays.
    HourOfDay { hour: u32 },
    /// At least `min_idle` staff have no assignment.
    IdleCapacity { min_idle: usize },
    /// One-time project offer window.
    OfferWindow { from_week: u32, to_week: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    /// Human-readable consequence summary.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub consequence: Consequence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Legacy character id the text was written for.
    #[serde(default)]
    pub speaker: Option<String>,
    pub schedule: Schedule,
    #[serde(default)]
    pub trigger: Option<Trigger>,
    /// Probability the trigger fires when its predicate holds.
    #[serde(default = "default_chance")]
    pub chance: f64,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub response_deadline_hours: Option<f64>,
    #[serde(default)]
    pub linked_project: Option<String>,
    /// Campaign phases in which it may appear. Empty means any.
    #[serde(default)]
    pub phases: Vec<GamePhase>,
    #[serde(default)]
    pub repeatable: bool,
    pub choices: Vec<Choice>,
}

fn default_chance() -> f64 {
    1.0
}

impl Conversation {
    pub fn allowed_in(&self, phase: GamePhase) -> bool {
        self.phases.is_empty() || self.phases.contains(&phase)
    }
}
