//! Outbound ports: presentation callbacks and snapshot storage.
//!
//! The engine never renders or touches storage directly. It calls these
//! traits, and headless callers plug in [`Headless`] and [`NullStore`].

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use agency_logic::satisfaction::ProjectStatus;

use crate::components::GameState;
use crate::persistence::{self, PersistenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    EventAlert,
    Success,
    Warning,
    Celebration,
    Payday,
}

/// End-of-week digest handed to the presentation layer on day 7.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub week: u32,
    pub money: i64,
    pub team_morale: f64,
    pub player_burnout: f64,
    pub completed_this_week: u32,
    pub projects: Vec<(String, ProjectStatus)>,
}

/// Notification hooks. Every method defaults to a no-op.
pub trait Presentation {
    fn notify_success(&mut self, _message: &str) {}
    fn notify_warning(&mut self, _message: &str) {}
    fn celebrate(&mut self, _message: &str) {}
    fn play_sound(&mut self, _cue: SoundCue) {}
    fn week_summary(&mut self, _summary: &WeekSummary) {}
    fn event_displayed(&mut self, _event_id: &str) {}
}

/// Presentation that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Presentation for Headless {}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Celebrate(String),
    Sound(SoundCue),
    WeekSummary(WeekSummary),
    EventDisplayed(String),
}

/// Presentation that records every notice. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct NoticeLog {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Notice::Warning(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }

    fn push(&self, n: Notice) {
        self.notices.borrow_mut().push(n);
    }
}

impl Presentation for NoticeLog {
    fn notify_success(&mut self, message: &str) {
        self.push(Notice::Success(message.to_string()));
    }
    fn notify_warning(&mut self, message: &str) {
        self.push(Notice::Warning(message.to_string()));
    }
    fn celebrate(&mut self, message: &str) {
        self.push(Notice::Celebrate(message.to_string()));
    }
    fn play_sound(&mut self, cue: SoundCue) {
        self.push(Notice::Sound(cue));
    }
    fn week_summary(&mut self, summary: &WeekSummary) {
        self.push(Notice::WeekSummary(summary.clone()));
    }
    fn event_displayed(&mut self, event_id: &str) {
        self.push(Notice::EventDisplayed(event_id.to_string()));
    }
}

/// Where snapshots go.
pub trait SnapshotStore {
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<GameState>, PersistenceError>;
}

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl SnapshotStore for NullStore {
    fn save(&mut self, _state: &GameState) -> Result<(), PersistenceError> {
        Ok(())
    }
    fn load(&mut self) -> Result<Option<GameState>, PersistenceError> {
        Ok(None)
    }
}

/// Keeps the latest JSON snapshot in memory. Clones share storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    json: Rc<RefCell<Option<String>>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        let store = Self::default();
        *store.json.borrow_mut() = Some(json.into());
        store
    }

    pub fn json(&self) -> Option<String> {
        self.json.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        *self.json.borrow_mut() = Some(persistence::to_json(state)?);
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn load(&mut self) -> Result<Option<GameState>, PersistenceError> {
        match self.json.borrow().as_deref() {
            Some(raw) => persistence::from_json(raw).map(Some),
            None => Ok(None),
        }
    }
}

/// JSON snapshot on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileStore {
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        let json = persistence::to_json(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&mut self) -> Result<Option<GameState>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        persistence::from_json(&raw).map(Some)
    }
}
