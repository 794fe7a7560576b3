//! Team generation from the roster catalog.

use agency_logic::config::SimConfig;

use crate::catalog::MemberTemplate;
use crate::components::{Team, TeamMember};

pub fn create_member(template: &MemberTemplate, config: &SimConfig) -> TeamMember {
    let mut m = TeamMember::new(
        template.id.clone(),
        template.name.clone(),
        template.role,
        template.skill,
        config.daily_hours,
    );
    m.personality = template.personality;
    m.traits = template.traits.clone();
    m.morale_min = template.morale_min.unwrap_or(0.0);
    m.morale_max = template.morale_max.unwrap_or(100.0).max(m.morale_min);
    m.morale = template.morale.clamp(m.morale_min, m.morale_max);
    m.morale_modifiers = template.morale_modifiers.clone();
    m.weekly_salary = template.weekly_salary;
    m
}

pub fn create_team(roster: &[MemberTemplate], config: &SimConfig) -> Team {
    Team::new(roster.iter().map(|t| create_member(t, config)).collect())
}
