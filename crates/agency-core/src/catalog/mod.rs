//! Read-only catalog data: conversations, roster and project templates.
//!
//! Catalogs are JSON files with a `schema_version`. The defaults under
//! `data/` are compiled in; [`Catalog::load_or_empty`] reads a directory
//! at runtime instead. A file that fails to load or validate leaves its
//! section empty and logs a warning, so the game stays playable.

mod consequence;
mod conversation;
mod templates;

pub use consequence::*;
pub use conversation::*;
pub use templates::*;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use agency_logic::efficiency::Role;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ROSTER_JSON: &str = include_str!("../../../../data/roster.json");
const PROJECTS_JSON: &str = include_str!("../../../../data/projects.json");
const CONVERSATIONS_JSON: &str = include_str!("../../../../data/conversations.json");

pub const ROSTER_FILE: &str = "roster.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const CONVERSATIONS_FILE: &str = "conversations.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationCatalog {
    pub schema_version: u32,
    pub conversations: Vec<Conversation>,
}

/// Everything the engine reads but never writes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub conversations: ConversationCatalog,
    pub roster: RosterCatalog,
    pub projects: ProjectCatalog,
}

impl Catalog {
    /// The bundled default catalogs.
    pub fn builtin() -> Self {
        Self {
            conversations: section("builtin conversations", parse_conversations(CONVERSATIONS_JSON, "builtin")),
            roster: section("builtin roster", parse_roster(ROSTER_JSON, "builtin")),
            projects: section("builtin projects", parse_projects(PROJECTS_JSON, "builtin")),
        }
    }

    /// Loads all three files from `dir`, failing on the first error.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        Ok(Self {
            conversations: load_file(&dir.join(CONVERSATIONS_FILE), parse_conversations)?,
            roster: load_file(&dir.join(ROSTER_FILE), parse_roster)?,
            projects: load_file(&dir.join(PROJECTS_FILE), parse_projects)?,
        })
    }

    /// Loads each file from `dir`, leaving any section that fails empty.
    pub fn load_or_empty(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            conversations: section(
                CONVERSATIONS_FILE,
                load_file(&dir.join(CONVERSATIONS_FILE), parse_conversations),
            ),
            roster: section(ROSTER_FILE, load_file(&dir.join(ROSTER_FILE), parse_roster)),
            projects: section(PROJECTS_FILE, load_file(&dir.join(PROJECTS_FILE), parse_projects)),
        }
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.conversations.iter().find(|c| c.id == id)
    }

    pub fn project_template(&self, id: &str) -> Option<&ProjectTemplate> {
        self.projects.templates.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.conversations.is_empty()
            && self.roster.members.is_empty()
            && self.projects.templates.is_empty()
    }
}

fn section<T: Default>(name: &str, loaded: Result<T, CatalogError>) -> T {
    match loaded {
        Ok(v) => v,
        Err(e) => {
            log::warn!("catalog {} unavailable, using empty section: {}", name, e);
            T::default()
        }
    }
}

fn load_file<T>(path: &Path, parse: fn(&str, &str) -> Result<T, CatalogError>) -> Result<T, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&raw, &path.display().to_string())
}

fn parse_json<T: DeserializeOwned>(raw: &str, origin: &str) -> Result<T, CatalogError> {
    serde_json::from_str(raw).map_err(|source| CatalogError::Json {
        path: origin.to_string(),
        source,
    })
}

fn check_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(CatalogError::Validation(format!("{} id cannot be empty", kind)));
        }
        if !seen.insert(id) {
            return Err(CatalogError::Validation(format!("duplicate {} id {}", kind, id)));
        }
    }
    Ok(())
}

pub fn parse_conversations(raw: &str, origin: &str) -> Result<ConversationCatalog, CatalogError> {
    let catalog: ConversationCatalog = parse_json(raw, origin)?;
    catalog.validate()?;
    Ok(catalog)
}

pub fn parse_roster(raw: &str, origin: &str) -> Result<RosterCatalog, CatalogError> {
    let catalog: RosterCatalog = parse_json(raw, origin)?;
    catalog.validate()?;
    Ok(catalog)
}

pub fn parse_projects(raw: &str, origin: &str) -> Result<ProjectCatalog, CatalogError> {
    let catalog: ProjectCatalog = parse_json(raw, origin)?;
    catalog.validate()?;
    Ok(catalog)
}

impl ConversationCatalog {
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_ids("conversation", self.conversations.iter().map(|c| c.id.as_str()))?;
        for c in &self.conversations {
            if c.choices.is_empty() {
                return Err(CatalogError::Validation(format!("conversation {} has no choices", c.id)));
            }
            if let Schedule::Fixed { week, day } = c.schedule {
                if !(1..=12).contains(&week) || !(1..=7).contains(&day) {
                    return Err(CatalogError::Validation(format!(
                        "conversation {} scheduled outside the campaign (week {}, day {})",
                        c.id, week, day
                    )));
                }
            }
            if !(0.0..=1.0).contains(&c.chance) {
                return Err(CatalogError::Validation(format!("conversation {} chance out of range", c.id)));
            }
        }
        Ok(())
    }
}

impl RosterCatalog {
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_ids("member", self.members.iter().map(|m| m.id.as_str()))?;
        let leads = self.members.iter().filter(|m| m.role == Role::Lead).count();
        if !self.members.is_empty() && leads != 1 {
            return Err(CatalogError::Validation(format!(
                "roster needs exactly one lead, found {}",
                leads
            )));
        }
        for m in &self.members {
            if !(1..=5).contains(&m.skill) {
                return Err(CatalogError::Validation(format!("member {} skill {} outside 1..=5", m.id, m.skill)));
            }
        }
        Ok(())
    }
}

impl ProjectCatalog {
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_ids("project template", self.templates.iter().map(|t| t.id.as_str()))?;
        for t in &self.templates {
            if t.complexity == 0 {
                return Err(CatalogError::Validation(format!("project template {} has zero complexity", t.id)));
            }
        }
        for id in &self.starting {
            if !self.templates.iter().any(|t| &t.id == id) {
                return Err(CatalogError::Validation(format!("starting project {} has no template", id)));
            }
        }
        Ok(())
    }
}
