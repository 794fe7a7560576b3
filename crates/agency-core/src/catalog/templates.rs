//! Roster and project templates.

use std::collections::BTreeMap;

use agency_logic::efficiency::Role;
use agency_logic::satisfaction::ClientProfile;
use serde::{Deserialize, Serialize};

use crate::components::{Personality, Trait};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTemplate {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub skill: u8,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub traits: Vec<Trait>,
    #[serde(default = "default_morale")]
    pub morale: f64,
    #[serde(default)]
    pub morale_min: Option<f64>,
    #[serde(default)]
    pub morale_max: Option<f64>,
    #[serde(default)]
    pub morale_modifiers: BTreeMap<String, f64>,
    #[serde(default)]
    pub weekly_salary: i64,
}

fn default_morale() -> f64 {
    70.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    pub client: String,
    pub complexity: u32,
    pub budget: i64,
    /// Overrides the complexity-derived schedule.
    #[serde(default)]
    pub weeks: Option<f64>,
    #[serde(default)]
    pub client_profile: ClientProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterCatalog {
    pub schema_version: u32,
    pub members: Vec<MemberTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectCatalog {
    pub schema_version: u32,
    pub templates: Vec<ProjectTemplate>,
    /// Template ids that seed a new game.
    #[serde(default)]
    pub starting: Vec<String>,
}
