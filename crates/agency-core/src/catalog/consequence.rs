//! Declarative consequence descriptors attached to conversation choices.
//!
//! Every field is optional and independent. String references may contain
//! the `{{MEMBER}}` and `{{LINKED}}` placeholders, which are substituted
//! before the consequence is applied.

use agency_logic::efficiency::PhaseKind;
use serde::{Deserialize, Serialize};

pub const MEMBER_PLACEHOLDER: &str = "{{MEMBER}}";
pub const LINKED_PLACEHOLDER: &str = "{{LINKED}}";

/// Who a morale change lands on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoraleTarget {
    All,
    Member(String),
    Members(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoraleEffect {
    pub target: MoraleTarget,
    pub delta: f64,
}

/// Which projects a satisfaction change lands on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectTarget {
    All,
    Project(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEffect {
    pub project: String,
    /// Defaults to the project's current phase.
    #[serde(default)]
    pub phase: Option<PhaseKind>,
    pub delta: f64,
    #[serde(default)]
    pub chance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionEffect {
    pub target: ProjectTarget,
    pub delta: f64,
    #[serde(default)]
    pub chance: Option<f64>,
}

/// Hour, timeline and budget deltas routed to scope-creep handling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeChange {
    pub project: String,
    pub hours: f64,
    pub weeks: f64,
    pub budget: i64,
    /// Explicit morale delta for everyone on the project.
    pub morale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub template: String,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub weeks: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberHours {
    pub member: String,
    pub delta: f64,
    #[serde(default)]
    pub chance: Option<f64>,
}

/// A chance-gated cash reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashRoll {
    pub chance: f64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDamage {
    pub chance: f64,
    pub project: String,
    pub satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub chance: f64,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub chance: f64,
    /// Conversation queued when the roll succeeds.
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Consequence {
    pub money: i64,
    pub team_morale: Vec<MoraleEffect>,
    pub player_burnout: f64,
    pub player_hours: f64,
    pub project_progress: Option<ProgressEffect>,
    pub client_satisfaction: Option<SatisfactionEffect>,
    pub scope_change: Option<ScopeChange>,
    pub spawn_events: Vec<String>,
    pub new_project: Option<NewProject>,
    pub remove_member: Option<String>,
    pub member_hours: Option<MemberHours>,
    pub portfolio_bonus: Option<CashRoll>,
    pub delayed_payment: Option<CashRoll>,
    pub relationship_damage: Option<RelationshipDamage>,
    pub project_cancellation: Option<Cancellation>,
    pub future_opportunity: Option<Opportunity>,
}

impl Consequence {
    /// Whether any string in the consequence uses a placeholder.
    pub fn has_placeholders(&self) -> bool {
        serde_json::to_string(self)
            .map(|s| s.contains(MEMBER_PLACEHOLDER) || s.contains(LINKED_PLACEHOLDER))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_morale_targets() {
        let c: Consequence = serde_json::from_str(
            r#"{
                "money": -500,
                "team_morale": [
                    { "target": "all", "delta": 2 },
                    { "target": { "member": "{{MEMBER}}" }, "delta": 5 },
                    { "target": { "members": ["sarah", "leo"] }, "delta": -1 }
                ],
                "player_burnout": -10
            }"#,
        )
        .unwrap();
        assert_eq!(c.money, -500);
        assert_eq!(c.team_morale.len(), 3);
        assert_eq!(c.team_morale[0].target, MoraleTarget::All);
        assert_eq!(c.player_burnout, -10.0);
        assert!(c.has_placeholders());
    }

    #[test]
    fn test_empty_consequence() {
        let c: Consequence = serde_json::from_str("{}").unwrap();
        assert_eq!(c, Consequence::default());
        assert!(!c.has_placeholders());
    }
}
