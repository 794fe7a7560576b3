//! The root game state.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use agency_logic::calendar::{CalendarDay, GamePhase};
use agency_logic::scoring::VictoryTier;
use agency_logic::wellbeing::{BurnoutThreshold, MoraleCrossing};
use serde::{Deserialize, Serialize};

use super::{GameClock, GameStats, Project, Team};
use crate::catalog::Conversation;

/// Snapshot shape version. Older snapshots go through migration on load.
pub const STATE_VERSION: u32 = 2;

/// How the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Victory(VictoryTier),
    Bankrupt,
    MassQuit,
    BurnoutCollapse,
}

impl GameOutcome {
    pub fn is_victory(self) -> bool {
        matches!(self, GameOutcome::Victory(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMomentKind {
    Quit,
    ProjectCompleted,
    ProjectFailed,
    ProjectCancelled,
    Milestone,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMoment {
    pub day: CalendarDay,
    pub kind: KeyMomentKind,
    pub text: String,
}

/// Threshold crossings waiting for the next event scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSignal {
    Morale { member_id: String, crossing: MoraleCrossing },
    Burnout { threshold: BurnoutThreshold },
}

/// Conversation bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventState {
    /// Displayed conversation awaiting a response.
    pub current: Option<String>,
    /// Absolute game hour the current conversation appeared.
    pub displayed_at: f64,
    /// Pending conversations in FIFO order.
    pub queue: VecDeque<String>,
    pub resolved: BTreeSet<String>,
    /// Conversation id to the day it comes back. Last deferral wins.
    pub deferred: BTreeMap<String, CalendarDay>,
    /// Member bound to `{{MEMBER}}` per conversation.
    pub member_map: BTreeMap<String, String>,
    /// Project bound to `{{LINKED}}` per conversation.
    pub linked_map: BTreeMap<String, String>,
    pub shown_today: BTreeSet<String>,
    pub last_scan_key: Option<(u32, u32, u32)>,
    /// Generated conversations (team pulse) keyed by id.
    pub dynamic: BTreeMap<String, Conversation>,
    pub signals: Vec<EventSignal>,
    /// Re-entrancy guard for choice resolution.
    #[serde(skip)]
    pub resolving: bool,
}

impl EventState {
    pub fn is_pending(&self, id: &str) -> bool {
        self.current.as_deref() == Some(id) || self.queue.iter().any(|q| q == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub version: u32,
    pub clock: GameClock,
    pub money: i64,
    pub phase: GamePhase,
    pub projects: Vec<Project>,
    pub team: Team,
    pub events: EventState,
    pub stats: GameStats,
    pub game_over: Option<GameOutcome>,
    pub key_moments: Vec<KeyMoment>,
    /// Counter for generated project ids.
    pub project_seq: u32,
    /// Ordinal of the last day a tip was shown.
    pub last_tip_day: Option<u32>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            clock: GameClock::default(),
            money: 0,
            phase: GamePhase::Tutorial,
            projects: Vec::new(),
            team: Team::default(),
            events: EventState::default(),
            stats: GameStats::default(),
            game_over: None,
            key_moments: Vec::new(),
            project_seq: 0,
            last_tip_day: None,
        }
    }
}

impl GameState {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// Finds a project by id, falling back to the first open project
    /// built from a template of that id.
    pub fn resolve_project_id(&self, reference: &str) -> Option<String> {
        self.project(reference)
            .or_else(|| {
                self.projects
                    .iter()
                    .find(|p| p.template_id == reference && !p.is_terminal())
            })
            .map(|p| p.id.clone())
    }

    pub fn active_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| !p.is_terminal())
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn awaiting_response(&self) -> bool {
        self.events.current.is_some()
    }

    pub fn push_key_moment(&mut self, kind: KeyMomentKind, text: impl Into<String>, cap: usize) {
        let day = self.clock.today();
        self.key_moments.push(KeyMoment {
            day,
            kind,
            text: text.into(),
        });
        if self.key_moments.len() > cap {
            let excess = self.key_moments.len() - cap;
            self.key_moments.drain(..excess);
        }
    }

    pub fn weekly_payroll(&self) -> i64 {
        self.team
            .members
            .iter()
            .filter(|m| !m.has_quit)
            .map(|m| m.weekly_salary)
            .sum()
    }
}
