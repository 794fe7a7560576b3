//! Team members and the team roster.
//!
//! Burnout and hours are private fields. Burnout only changes through
//! [`Team::adjust_burnout`]; hours only change through
//! [`Team::consume_hours`], [`Team::grant_hours`] and the daily reset.

use std::collections::{BTreeMap, BTreeSet};

use agency_logic::efficiency::{PhaseKind, Role};
use agency_logic::wellbeing::{burnout_crossings, BurnoutThreshold, MoraleCrossing, MoraleLatch};
use serde::{Deserialize, Serialize};

/// Behavioural traits from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    /// Exempt from passive morale decay.
    NeverDemoralized,
    /// Falls ill more often.
    OftenIll,
    /// Works above their nominal skill.
    QuickStudy,
}

/// Personality archetype. Gates which conversations a member can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    #[default]
    Steady,
    Perfectionist,
    Pragmatist,
    Mentor,
    Maverick,
}

/// One project-phase reference. A member may hold several.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub project_id: String,
    pub phase: PhaseKind,
}

impl Assignment {
    pub fn new(project_id: impl Into<String>, phase: PhaseKind) -> Self {
        Self {
            project_id: project_id.into(),
            phase,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// 1..=5
    pub skill: u8,
    pub personality: Personality,
    pub traits: Vec<Trait>,
    pub morale: f64,
    pub morale_min: f64,
    pub morale_max: f64,
    /// Multipliers on morale deltas keyed by source (e.g. "scope_creep").
    pub morale_modifiers: BTreeMap<String, f64>,
    burnout: f64,
    hours: f64,
    pub is_ill: bool,
    /// Hours taken by the current illness, returned on recovery.
    pub sick_hours: f64,
    pub has_quit: bool,
    pub is_player: bool,
    pub assignments: BTreeSet<Assignment>,
    /// Consecutive workdays spent on at least one assignment.
    pub days_on_assignment: u32,
    pub morale_latch: MoraleLatch,
    pub weekly_salary: i64,
}

impl Default for TeamMember {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            role: Role::Junior,
            skill: 1,
            personality: Personality::default(),
            traits: Vec::new(),
            morale: 70.0,
            morale_min: 0.0,
            morale_max: 100.0,
            morale_modifiers: BTreeMap::new(),
            burnout: 0.0,
            hours: 40.0,
            is_ill: false,
            sick_hours: 0.0,
            has_quit: false,
            is_player: false,
            assignments: BTreeSet::new(),
            days_on_assignment: 0,
            morale_latch: MoraleLatch::default(),
            weekly_salary: 0,
        }
    }
}

impl TeamMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role, skill: u8, hours: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            skill: skill.clamp(1, 5),
            is_player: role == Role::Lead,
            hours,
            ..Default::default()
        }
    }

    pub fn burnout(&self) -> f64 {
        self.burnout
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(&t)
    }

    pub fn skill_multiplier(&self) -> f64 {
        if self.has_trait(Trait::QuickStudy) {
            1.1
        } else {
            1.0
        }
    }

    /// Skill after multipliers, normalized to [0, 1].
    pub fn effective_skill(&self) -> f64 {
        (self.skill as f64 / 5.0 * self.skill_multiplier()).min(1.0)
    }

    pub fn is_active(&self) -> bool {
        !self.has_quit
    }

    pub fn is_assigned(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Available for new work: active, healthy and not the lead.
    pub fn is_available_staff(&self) -> bool {
        !self.has_quit && !self.is_ill && !self.is_player
    }

    pub fn is_assigned_to(&self, project_id: &str, phase: PhaseKind) -> bool {
        self.assignments
            .iter()
            .any(|a| a.project_id == project_id && a.phase == phase)
    }

    pub fn assigned_project_ids(&self) -> BTreeSet<&str> {
        self.assignments.iter().map(|a| a.project_id.as_str()).collect()
    }

    fn morale_modifier(&self, source: &str) -> f64 {
        self.morale_modifiers.get(source).copied().unwrap_or(1.0)
    }
}

/// Record of one applied burnout change.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnoutChange {
    pub before: f64,
    pub after: f64,
    pub applied: f64,
    pub crossings: Vec<BurnoutThreshold>,
}

/// One entry in the burnout audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnoutAudit {
    pub member_id: String,
    pub requested: f64,
    pub applied: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoraleChange {
    pub applied: f64,
    pub crossing: Option<MoraleCrossing>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub members: Vec<TeamMember>,
    #[serde(skip)]
    burnout_audit: Vec<BurnoutAudit>,
}

impl Team {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self {
            members,
            burnout_audit: Vec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TeamMember> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    pub fn player(&self) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.is_player)
    }

    pub fn player_id(&self) -> Option<String> {
        self.player().map(|m| m.id.clone())
    }

    /// Non-player members who have not quit.
    pub fn staff(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|m| !m.is_player && !m.has_quit)
    }

    /// Mean morale of non-player members still on the team. Zero when
    /// nobody is left.
    pub fn team_morale(&self) -> f64 {
        let (sum, n) = self
            .staff()
            .fold((0.0, 0usize), |(s, n), m| (s + m.morale, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    pub fn burnout_audit(&self) -> &[BurnoutAudit] {
        &self.burnout_audit
    }

    /// The only way burnout changes. Clamps to [0, 100] and reports the
    /// delta that actually landed plus any rising threshold crossings.
    pub fn adjust_burnout(&mut self, member_id: &str, delta: f64, reason: &str) -> Option<BurnoutChange> {
        let member = self.members.iter_mut().find(|m| m.id == member_id)?;
        let before = member.burnout;
        let after = (before + delta).clamp(0.0, 100.0);
        member.burnout = after;
        let applied = after - before;
        self.burnout_audit.push(BurnoutAudit {
            member_id: member_id.to_string(),
            requested: delta,
            applied,
            reason: reason.to_string(),
        });
        Some(BurnoutChange {
            before,
            after,
            applied,
            crossings: burnout_crossings(before, after),
        })
    }

    pub fn adjust_morale(&mut self, member_id: &str, delta: f64) -> Option<MoraleChange> {
        self.adjust_morale_from(member_id, delta, "")
    }

    /// Morale change scaled by the member's modifier for `source`.
    pub fn adjust_morale_from(&mut self, member_id: &str, delta: f64, source: &str) -> Option<MoraleChange> {
        let member = self.members.iter_mut().find(|m| m.id == member_id)?;
        if member.has_quit {
            return None;
        }
        let scaled = delta * member.morale_modifier(source);
        let before = member.morale;
        let after = (before + scaled).clamp(member.morale_min, member.morale_max);
        member.morale = after;
        let crossing = member.morale_latch.update(before, after);
        Some(MoraleChange {
            applied: after - before,
            crossing,
        })
    }

    /// Applies `delta` to every non-player member still on the team.
    pub fn adjust_team_morale(&mut self, delta: f64, source: &str) -> Vec<(String, MoraleChange)> {
        let ids: Vec<String> = self.staff().map(|m| m.id.clone()).collect();
        ids.into_iter()
            .filter_map(|id| self.adjust_morale_from(&id, delta, source).map(|c| (id, c)))
            .collect()
    }

    /// Spends worked hours. Only the lead may go into debt.
    pub fn consume_hours(&mut self, member_id: &str, hours: f64) {
        if let Some(m) = self.get_mut(member_id) {
            m.hours -= hours;
            if !m.is_player && m.hours < 0.0 {
                m.hours = 0.0;
            }
        }
    }

    /// Adds or removes hours outside of work. Never pushes anyone below
    /// zero and never above `max_hours`.
    pub fn grant_hours(&mut self, member_id: &str, delta: f64, max_hours: f64) -> Option<f64> {
        let m = self.get_mut(member_id)?;
        let before = m.hours;
        m.hours = if delta >= 0.0 {
            (before + delta).min(max_hours.max(before))
        } else {
            (before + delta).max(before.min(0.0))
        };
        Some(m.hours - before)
    }

    /// Hands every remaining member a fresh day's allotment. Clears any
    /// hour debt the lead ran up yesterday.
    pub fn reset_day_hours(&mut self, daily_hours: f64) {
        for m in self.members.iter_mut().filter(|m| !m.has_quit) {
            m.hours = daily_hours;
        }
    }

    /// Marks a member ill and takes a day's hours from them.
    pub fn fall_ill(&mut self, member_id: &str, day_hours: f64) {
        if let Some(m) = self.get_mut(member_id) {
            if m.is_ill || m.has_quit {
                return;
            }
            let taken = if m.is_player { 0.0 } else { day_hours.min(m.hours.max(0.0)) };
            m.is_ill = true;
            m.sick_hours = taken;
            m.hours -= taken;
        }
    }

    /// Clears every illness and returns the hours it took. Returns the
    /// ids of members who recovered.
    pub fn recover_all(&mut self) -> Vec<String> {
        let mut recovered = Vec::new();
        for m in self.members.iter_mut().filter(|m| m.is_ill) {
            m.is_ill = false;
            m.hours += m.sick_hours;
            m.sick_hours = 0.0;
            recovered.push(m.id.clone());
        }
        recovered
    }

    /// Flags a member as quit and drops every assignment. Returns false if
    /// they were already gone or do not exist.
    pub fn mark_quit(&mut self, member_id: &str) -> bool {
        match self.get_mut(member_id) {
            Some(m) if !m.has_quit => {
                m.has_quit = true;
                m.is_ill = false;
                m.assignments.clear();
                m.days_on_assignment = 0;
                true
            }
            _ => false,
        }
    }

    pub fn assign(&mut self, member_id: &str, assignment: Assignment) -> bool {
        match self.get_mut(member_id) {
            Some(m) if !m.has_quit => m.assignments.insert(assignment),
            _ => false,
        }
    }

    /// Removes a member from one phase, or from every phase of the project
    /// when `phase` is `None`. Returns how many assignments were dropped.
    pub fn unassign(&mut self, member_id: &str, project_id: &str, phase: Option<PhaseKind>) -> usize {
        let Some(m) = self.get_mut(member_id) else {
            return 0;
        };
        let before = m.assignments.len();
        m.assignments
            .retain(|a| !(a.project_id == project_id && phase.map_or(true, |p| a.phase == p)));
        if m.assignments.is_empty() {
            m.days_on_assignment = 0;
        }
        before - m.assignments.len()
    }

    /// Drops every assignment to `project_id`. Returns the released members.
    pub fn release_project(&mut self, project_id: &str) -> Vec<String> {
        let mut released = Vec::new();
        for m in self.members.iter_mut() {
            let before = m.assignments.len();
            m.assignments.retain(|a| a.project_id != project_id);
            if m.assignments.len() != before {
                if m.assignments.is_empty() {
                    m.days_on_assignment = 0;
                }
                released.push(m.id.clone());
            }
        }
        released
    }

    pub fn assigned_to(&self, project_id: &str, phase: PhaseKind) -> impl Iterator<Item = &TeamMember> + '_ {
        let project_id = project_id.to_string();
        self.members
            .iter()
            .filter(move |m| !m.has_quit && m.is_assigned_to(&project_id, phase))
    }

    pub fn assigned_to_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a TeamMember> + 'a {
        self.members
            .iter()
            .filter(move |m| !m.has_quit && m.assignments.iter().any(|a| a.project_id == project_id))
    }
}
