//! Staffing: manual assignment commands and auto-assign.

use agency_logic::assignment::{plan_assignments, Candidate, ProjectNeed};

use crate::components::{Assignment, GameState};
use crate::context::SimContext;

/// Builds planner input from open projects.
pub fn project_needs(state: &GameState) -> (Vec<String>, Vec<ProjectNeed>) {
    let mut ids = Vec::new();
    let mut needs = Vec::new();
    for p in state.active_projects() {
        let unstaffed_phases = p
            .phases
            .iter()
            .filter(|ph| ph.status.is_workable() && ph.freelancer.is_none())
            .filter(|ph| state.team.assigned_to(&p.id, ph.kind).next().is_none())
            .count();
        ids.push(p.id.clone());
        needs.push(ProjectNeed {
            status: p.status,
            current_phase: p.current_phase(),
            unstaffed_phases,
            total_weeks: p.total_weeks,
            weeks_remaining: p.weeks_remaining,
            progress: p.progress(),
        });
    }
    (ids, needs)
}

/// Staff who are free to take work: healthy, still here, and idle.
pub fn idle_candidates(state: &GameState) -> (Vec<String>, Vec<Candidate>) {
    state
        .team
        .staff()
        .filter(|m| !m.is_ill && !m.is_assigned())
        .map(|m| {
            (
                m.id.clone(),
                Candidate {
                    role: m.role,
                    skill: m.skill,
                    skill_multiplier: m.skill_multiplier(),
                    morale: m.morale,
                },
            )
        })
        .unzip()
}

/// Assigns every idle staff member using the greedy planner. Returns
/// the assignments made as `(member, project, phase)` triples.
pub fn auto_assign(ctx: &mut SimContext) -> Vec<(String, Assignment)> {
    let (project_ids, needs) = project_needs(ctx.state);
    let (member_ids, candidates) = idle_candidates(ctx.state);
    let plan = plan_assignments(&needs, &candidates);

    let mut made = Vec::new();
    for step in plan {
        let member = &member_ids[step.candidate];
        let assignment = Assignment::new(project_ids[step.project].clone(), step.phase);
        if ctx.state.team.assign(member, assignment.clone()) {
            log::info!("auto-assigned {} to {} {}", member, assignment.project_id, step.phase.name());
            made.push((member.clone(), assignment));
        }
    }
    if !made.is_empty() {
        ctx.ui.notify_success(&format!("Auto-assigned {} team member(s).", made.len()));
    }
    made
}
