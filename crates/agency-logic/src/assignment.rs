//! Greedy auto-assignment heuristic.
//!
//! Two passes, neither globally optimal:
//! 1. Projects in descending urgency each get the best available worker
//!    for their current phase.
//! 2. Leftover idle workers go, one at a time, to whichever project is
//!    most in need of help given what has been planned so far.
//!
//! Inputs are index-based so the engine can map results back onto its
//! own project and member collections.

use crate::calendar::elapsed_fraction;
use crate::efficiency::{role_efficiency, PhaseKind, Role};
use crate::satisfaction::ProjectStatus;

const CRISIS_URGENCY: f64 = 100.0;
const WARNING_URGENCY: f64 = 40.0;
const UNSTAFFED_PHASE_URGENCY: f64 = 25.0;
const NEAR_DEADLINE_URGENCY: f64 = 30.0;
const NEAR_DEADLINE_WEEKS: f64 = 1.5;
const BEHIND_SCHEDULE_WEIGHT: f64 = 50.0;
const ROLE_MATCH_BONUS: f64 = 2.0;

/// One open project as seen by the planner.
#[derive(Debug, Clone)]
pub struct ProjectNeed {
    pub status: ProjectStatus,
    /// The phase new workers should join. `None` skips the project.
    pub current_phase: Option<PhaseKind>,
    /// Workable phases with nobody on them.
    pub unstaffed_phases: usize,
    pub total_weeks: f64,
    pub weeks_remaining: f64,
    pub progress: f64,
}

/// One idle worker as seen by the planner.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub role: Role,
    pub skill: u8,
    pub skill_multiplier: f64,
    pub morale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAssignment {
    pub project: usize,
    pub candidate: usize,
    pub phase: PhaseKind,
}

pub fn urgency(need: &ProjectNeed) -> f64 {
    let mut score = 0.0;
    match need.status {
        ProjectStatus::Crisis => score += CRISIS_URGENCY,
        ProjectStatus::Warning => score += WARNING_URGENCY,
        _ => {}
    }
    score += UNSTAFFED_PHASE_URGENCY * need.unstaffed_phases as f64;
    if need.weeks_remaining < NEAR_DEADLINE_WEEKS {
        score += NEAR_DEADLINE_URGENCY;
    }
    let behind = elapsed_fraction(need.total_weeks, need.weeks_remaining) - need.progress;
    if behind > 0.0 {
        score += behind * BEHIND_SCHEDULE_WEIGHT;
    }
    score
}

pub fn candidate_score(c: &Candidate, phase: PhaseKind) -> f64 {
    let skill = c.skill as f64 * c.skill_multiplier;
    let mut score = role_efficiency(c.role, phase) * skill * (c.morale / 100.0);
    if c.role.home_phase() == Some(phase) || (c.role == Role::Manager && phase == PhaseKind::Review) {
        score += ROLE_MATCH_BONUS;
    }
    score
}

fn best_candidate(candidates: &[Candidate], used: &[bool], phase: PhaseKind) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        if used[i] {
            continue;
        }
        let s = candidate_score(c, phase);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

/// Plans assignments for idle workers.
pub fn plan_assignments(needs: &[ProjectNeed], candidates: &[Candidate]) -> Vec<PlannedAssignment> {
    let mut plan = Vec::new();
    let mut used = vec![false; candidates.len()];
    let mut planned_per_project = vec![0usize; needs.len()];

    let mut order: Vec<usize> = (0..needs.len())
        .filter(|&i| needs[i].current_phase.is_some() && !needs[i].status.is_terminal())
        .collect();
    // Stable sort keeps catalog order among equally urgent projects.
    order.sort_by(|&a, &b| urgency(&needs[b]).total_cmp(&urgency(&needs[a])));

    // Pass 1: one worker per project, most urgent first.
    for &p in &order {
        let Some(phase) = needs[p].current_phase else { continue };
        if let Some(c) = best_candidate(candidates, &used, phase) {
            used[c] = true;
            planned_per_project[p] += 1;
            plan.push(PlannedAssignment { project: p, candidate: c, phase });
        }
    }

    // Pass 2: spread whoever is left by remaining need.
    while used.iter().any(|u| !u) && !order.is_empty() {
        let Some(&p) = order.iter().max_by(|&&a, &&b| {
            let na = urgency(&needs[a]) / (1 + planned_per_project[a]) as f64;
            let nb = urgency(&needs[b]) / (1 + planned_per_project[b]) as f64;
            na.total_cmp(&nb).then(b.cmp(&a))
        }) else {
            break;
        };
        let Some(phase) = needs[p].current_phase else { break };
        let Some(c) = best_candidate(candidates, &used, phase) else { break };
        used[c] = true;
        planned_per_project[p] += 1;
        plan.push(PlannedAssignment { project: p, candidate: c, phase });
    }

    plan
}
