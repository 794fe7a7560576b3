//! Work accrual: turns assigned hours into phase progress.

use std::collections::{BTreeMap, BTreeSet};

use agency_logic::efficiency::{
    can_contribute, freelancer_efficiency, phase_progress_delta, worker_efficiency, PhaseKind,
    WorkerInput,
};
use agency_logic::satisfaction::ProjectStatus;
use agency_logic::wellbeing::{burnout_accrual, StressInputs};

use crate::components::{GameState, TeamMember};
use crate::context::SimContext;
use crate::systems::team::change_player_burnout;

type PhaseKey = (String, PhaseKind);

/// Phases of open projects that can take progress right now.
pub fn workable_phases(state: &GameState) -> BTreeSet<PhaseKey> {
    state
        .active_projects()
        .flat_map(|p| {
            p.phases
                .iter()
                .filter(|ph| ph.status.is_workable())
                .map(move |ph| (p.id.clone(), ph.kind))
        })
        .collect()
}

fn worker_input(m: &TeamMember, concurrent: usize) -> WorkerInput {
    WorkerInput {
        role: m.role,
        skill: m.skill,
        skill_multiplier: m.skill_multiplier(),
        morale: m.morale,
        hours_remaining: m.hours(),
        is_ill: m.is_ill,
        is_player: m.is_player,
        concurrent_assignments: concurrent,
    }
}

/// Share of a `hours` step a member can actually cover. The lead may
/// always work on into debt; staff stop when their allotment runs out.
fn available_share(m: &TeamMember, hours: f64) -> f64 {
    if m.is_player || hours <= 0.0 {
        1.0
    } else {
        (m.hours() / hours).clamp(0.0, 1.0)
    }
}

/// Summed efficiency per workable phase over a step of `hours`, and the
/// members who contributed.
pub fn phase_efficiencies(state: &GameState, hours: f64) -> (BTreeMap<PhaseKey, f64>, Vec<String>) {
    let workable = workable_phases(state);
    let mut totals: BTreeMap<PhaseKey, f64> = BTreeMap::new();
    let mut contributors = Vec::new();

    for m in state.team.members.iter().filter(|m| !m.has_quit) {
        let open: Vec<PhaseKey> = m
            .assignments
            .iter()
            .map(|a| (a.project_id.clone(), a.phase))
            .filter(|k| workable.contains(k))
            .collect();
        if open.is_empty() {
            continue;
        }
        let input = worker_input(m, open.len());
        if !can_contribute(&input) {
            continue;
        }
        let share = available_share(m, hours);
        for key in open {
            let eff = worker_efficiency(&input, key.1) * share;
            *totals.entry(key).or_insert(0.0) += eff;
        }
        contributors.push(m.id.clone());
    }

    for p in state.active_projects() {
        for ph in p.phases.iter().filter(|ph| ph.status.is_workable()) {
            if let Some(skill) = ph.freelancer {
                *totals.entry((p.id.clone(), ph.kind)).or_insert(0.0) += freelancer_efficiency(skill);
            }
        }
    }
    (totals, contributors)
}

/// Simulates `hours` of work. Each contributing member spends `hours`
/// once no matter how many phases they are split across, and staff with
/// less left than that contribute pro rata. Returns the phases that
/// received progress.
pub fn work_step(ctx: &mut SimContext, hours: f64) -> Vec<PhaseKey> {
    if hours <= 0.0 {
        return Vec::new();
    }
    let (totals, contributors) = phase_efficiencies(ctx.state, hours);
    let day_fraction = hours / ctx.config.workday_hours();

    let mut worked = Vec::new();
    for ((project_id, kind), eff) in totals {
        let delta = phase_progress_delta(eff, kind, day_fraction);
        if delta <= 0.0 {
            continue;
        }
        let Some(project) = ctx.state.project_mut(&project_id) else { continue };
        let phase = project.phases.get_mut(kind);
        phase.progress = (phase.progress + delta).min(1.0);
        worked.push((project_id, kind));
    }

    for id in contributors {
        ctx.state.team.consume_hours(&id, hours);
    }
    worked
}

/// Accrues the lead's background stress over `ticks` ticks.
pub fn accrue_stress(ctx: &mut SimContext, ticks: f64) {
    let Some(player) = ctx.state.team.player() else { return };
    let mut assigned = 0;
    let mut crisis = 0;
    for id in player.assigned_project_ids() {
        if let Some(p) = ctx.state.project(id).filter(|p| !p.is_terminal()) {
            assigned += 1;
            if p.status == ProjectStatus::Crisis {
                crisis += 1;
            }
        }
    }
    let inputs = StressInputs {
        assigned_projects: assigned,
        crisis_projects: crisis,
        hours_remaining: player.hours(),
        team_morale: ctx.state.team.team_morale(),
    };
    let delta = burnout_accrual(&inputs) * ticks;
    if delta > 0.0 {
        change_player_burnout(ctx, delta, "stress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Assignment, PhaseMap, Project, Team};
    use agency_logic::efficiency::Role;

    fn state() -> GameState {
        let mut team = Team::new(vec![
            TeamMember::new("you", "You", Role::Lead, 3, 40.0),
            TeamMember::new("sarah", "Sarah", Role::Designer, 4, 40.0),
        ]);
        team.assign("sarah", Assignment::new("p1", PhaseKind::Management));
        team.assign("sarah", Assignment::new("p1", PhaseKind::Design));
        GameState {
            projects: vec![Project {
                id: "p1".into(),
                phases: PhaseMap::from_hours(|k| k.hours_multiplier()),
                ..Default::default()
            }],
            team,
            ..Default::default()
        }
    }

    #[test]
    fn test_waiting_phase_not_counted() {
        let s = state();
        let (totals, contributors) = phase_efficiencies(&s, 0.1);
        assert_eq!(totals.len(), 1);
        assert!(totals.contains_key(&("p1".to_string(), PhaseKind::Management)));
        assert_eq!(contributors, vec!["sarah".to_string()]);
        // Only one workable assignment, so no time split.
        let eff = totals[&("p1".to_string(), PhaseKind::Management)];
        assert!((eff - 0.6 * 0.8 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_freelancer_adds_flat_efficiency() {
        let mut s = state();
        s.projects[0].phases.management.freelancer = Some(5);
        let (totals, _) = phase_efficiencies(&s, 0.1);
        let eff = totals[&("p1".to_string(), PhaseKind::Management)];
        assert!((eff - (0.6 * 0.8 * 0.7 + 1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_ill_member_contributes_nothing() {
        let mut s = state();
        s.team.fall_ill("sarah", 9.0);
        let (totals, contributors) = phase_efficiencies(&s, 0.1);
        assert!(totals.is_empty());
        assert!(contributors.is_empty());
    }

    #[test]
    fn test_short_allotment_contributes_pro_rata() {
        let mut s = state();
        s.team.grant_hours("sarah", -38.0, 40.0);
        let (full, _) = phase_efficiencies(&s, 1.0);
        let (half, _) = phase_efficiencies(&s, 4.0);
        let key = ("p1".to_string(), PhaseKind::Management);
        assert!((full[&key] - 0.6 * 0.8 * 0.7).abs() < 1e-9);
        assert!((half[&key] - 0.6 * 0.8 * 0.7 * 0.5).abs() < 1e-9);
    }
}
