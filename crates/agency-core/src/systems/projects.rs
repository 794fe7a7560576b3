//! Project and phase engine: status, satisfaction, deadlines, completion
//! and scope changes.

use agency_logic::calendar::elapsed_fraction;
use agency_logic::constants::{deadlines, morale, satisfaction, scope};
use agency_logic::efficiency::{derive_phase_status, PhaseKind, PhaseStatus};
use agency_logic::satisfaction::{
    assess_risk, derive_project_status, satisfaction_score, ProjectStatus, QualityContributor,
    SatisfactionInputs,
};
use agency_logic::scoring::completion_payment;

use crate::catalog::ScopeChange;
use crate::components::{GameState, KeyMomentKind, Project, Team};
use crate::context::SimContext;
use crate::ports::SoundCue;
use crate::systems::team::{change_morale, change_team_morale};

/// A phase lifecycle change worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Ready(PhaseKind),
    Started { phase: PhaseKind, risky: bool },
    Completed(PhaseKind),
}

/// Steps every phase's status forward once, in phase order. `worked`
/// lists phases that received progress this step.
pub fn advance_phase_statuses(project: &mut Project, worked: &[PhaseKind]) -> Vec<PhaseEvent> {
    let mut events = Vec::new();
    for kind in PhaseKind::ALL {
        let predecessor = kind.predecessor().map(|p| project.phases.get(p).progress);
        let phase = project.phases.get_mut(kind);
        let before = phase.status;
        let after = derive_phase_status(before, kind, phase.progress, predecessor, worked.contains(&kind));
        if after == before {
            continue;
        }
        phase.status = after;
        match after {
            PhaseStatus::Ready => events.push(PhaseEvent::Ready(kind)),
            PhaseStatus::Active => {
                let risky = predecessor.map_or(false, |p| p < 1.0);
                phase.risky_overlap = risky;
                events.push(PhaseEvent::Started { phase: kind, risky });
            }
            PhaseStatus::Complete => {
                phase.progress = 1.0;
                events.push(PhaseEvent::Completed(kind));
            }
            PhaseStatus::Waiting => {}
        }
    }
    events
}

/// Recomputes satisfaction, status and risk from current state.
/// Terminal projects are left alone.
pub fn refresh_project(project: &mut Project, team: &Team) {
    if project.is_terminal() {
        return;
    }
    let contributors: Vec<QualityContributor> = team
        .assigned_to_project(&project.id)
        .map(|m| QualityContributor {
            effective_skill: m.effective_skill(),
            morale: m.morale,
        })
        .collect();
    let inputs = SatisfactionInputs {
        contributors,
        actual_progress: project.progress(),
        expected_progress: elapsed_fraction(project.total_weeks, project.weeks_remaining),
        response_latency_hours: project.response_latency_hours,
        budget_health: project.budget_health,
    };
    let base = satisfaction_score(&project.client_profile, &inputs);
    project.satisfaction = (base + project.satisfaction_offset).clamp(0.0, 100.0);

    let status = derive_project_status(
        project.hours_completed(),
        project.estimated_hours(),
        project.weeks_remaining,
        project.satisfaction,
        project.progress(),
    );
    // Completion is a transition of its own; see complete_project.
    if status != ProjectStatus::Complete {
        project.status = status;
    }
    project.risk = assess_risk(
        project.estimated_hours(),
        project.original_estimated_hours,
        project.weeks_remaining,
        project.satisfaction,
        project.scope_creep_count,
    );
}

/// Refreshes one project by id.
pub fn refresh_by_id(state: &mut GameState, project_id: &str) {
    let GameState { projects, team, .. } = state;
    if let Some(p) = projects.iter_mut().find(|p| p.id == project_id) {
        refresh_project(p, team);
    }
}

/// Refreshes every open project, reports phase changes and completes
/// anything that has finished.
pub fn refresh_projects(ctx: &mut SimContext, worked: &[(String, PhaseKind)]) {
    let mut finished = Vec::new();
    for i in 0..ctx.state.projects.len() {
        if ctx.state.projects[i].is_terminal() {
            continue;
        }
        let id = ctx.state.projects[i].id.clone();
        let worked_here: Vec<PhaseKind> = worked
            .iter()
            .filter(|(p, _)| *p == id)
            .map(|(_, k)| *k)
            .collect();
        let before = ctx.state.projects[i].status;
        let events = advance_phase_statuses(&mut ctx.state.projects[i], &worked_here);
        refresh_project(&mut ctx.state.projects[i], &ctx.state.team);
        for e in events {
            report_phase_event(ctx, &id, e);
        }
        if before != ProjectStatus::Crisis && ctx.state.projects[i].status == ProjectStatus::Crisis {
            let name = ctx.state.projects[i].name.clone();
            log::warn!("{} entered crisis", id);
            ctx.ui.notify_warning(&format!("{} is in crisis.", name));
            ctx.ui.play_sound(SoundCue::Warning);
        }
        if ctx.state.projects[i].all_phases_complete() {
            finished.push(id);
        }
    }
    for id in finished {
        complete_project(ctx, &id);
    }
}

fn report_phase_event(ctx: &mut SimContext, project_id: &str, event: PhaseEvent) {
    let name = ctx
        .state
        .project(project_id)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    match event {
        PhaseEvent::Ready(kind) => {
            log::debug!("{} {} ready", project_id, kind.name());
        }
        PhaseEvent::Started { phase, risky } => {
            log::debug!("{} {} started (risky overlap: {})", project_id, phase.name(), risky);
            if risky {
                ctx.ui.notify_warning(&format!(
                    "{}: {} started before the previous phase finished.",
                    name,
                    phase.name()
                ));
            }
        }
        PhaseEvent::Completed(kind) => {
            log::info!("{} {} complete", project_id, kind.name());
            ctx.ui.notify_success(&format!("{}: {} phase complete.", name, kind.name()));
        }
    }
}

/// Delivers a finished project. Only valid once every phase is done, and
/// a no-op on a project that is already terminal. Returns the payment.
pub fn complete_project(ctx: &mut SimContext, project_id: &str) -> Option<i64> {
    let Some(project) = ctx.state.project_mut(project_id) else {
        log::warn!("complete_project: unknown project {}", project_id);
        return None;
    };
    if project.is_terminal() || !project.all_phases_complete() {
        log::debug!("complete_project: {} not eligible", project_id);
        return None;
    }
    for kind in PhaseKind::ALL {
        let phase = project.phases.get_mut(kind);
        phase.progress = 1.0;
        phase.status = PhaseStatus::Complete;
    }
    let weeks_late = project.weeks_late();
    let on_time = weeks_late <= 0.0;
    let payment = completion_payment(project.budget, project.satisfaction, weeks_late);
    let score = project.satisfaction;
    let name = project.name.clone();
    project.status = ProjectStatus::Complete;
    project.payment = Some(payment);

    let today = ctx.state.clock.today();
    if let Some(p) = ctx.state.project_mut(project_id) {
        p.completed_on = Some(today);
    }
    ctx.state.money += payment;

    let stats = &mut ctx.state.stats;
    stats.projects_completed += 1;
    stats.completed_satisfaction_total += score;
    stats.total_earned += payment;
    if on_time {
        stats.on_time_deliveries += 1;
        if score >= satisfaction::PERFECT_DELIVERY {
            stats.perfect_deliveries += 1;
        }
    }

    for member_id in ctx.state.team.release_project(project_id) {
        change_morale(ctx, &member_id, morale::COMPLETION_BOOST, "completion");
    }

    log::info!("{} delivered for {} (satisfaction {:.0})", project_id, payment, score);
    ctx.ui.celebrate(&format!("{} delivered! Client paid ${}.", name, payment));
    ctx.ui.play_sound(SoundCue::Celebration);
    ctx.key_moment(KeyMomentKind::ProjectCompleted, format!("Delivered {}", name));
    Some(payment)
}

/// Ends a project without delivery. `failed` marks it as an agency
/// failure rather than a client decision.
pub fn cancel_project(ctx: &mut SimContext, project_id: &str, failed: bool) -> bool {
    let Some(project) = ctx.state.project_mut(project_id) else {
        log::warn!("cancel_project: unknown project {}", project_id);
        return false;
    };
    if project.is_terminal() {
        return false;
    }
    project.status = ProjectStatus::Cancelled;
    project.failed = failed;
    let name = project.name.clone();
    ctx.state.team.release_project(project_id);
    if failed {
        ctx.state.stats.projects_failed += 1;
        ctx.key_moment(KeyMomentKind::ProjectFailed, format!("{} failed", name));
        ctx.ui.notify_warning(&format!("{} has been pulled. The client walked.", name));
    } else {
        ctx.state.stats.projects_cancelled += 1;
        ctx.key_moment(KeyMomentKind::ProjectCancelled, format!("{} cancelled", name));
        ctx.ui.notify_warning(&format!("{} was cancelled by the client.", name));
    }
    log::info!("{} cancelled (failed: {})", project_id, failed);
    true
}

/// Adds (or removes) required hours across incomplete phases in
/// proportion to their size. Completed hours are kept, so progress is
/// re-based against the new requirement.
pub fn rescale_open_hours(project: &mut Project, extra_hours: f64) {
    let open: f64 = project
        .phases
        .iter()
        .filter(|p| !p.is_complete())
        .map(|p| p.hours_required)
        .sum();
    if open <= 0.0 || extra_hours == 0.0 {
        return;
    }
    for kind in PhaseKind::ALL {
        let phase = project.phases.get_mut(kind);
        if phase.is_complete() {
            continue;
        }
        let done = phase.hours_completed();
        let share = extra_hours * phase.hours_required / open;
        let required = (phase.hours_required + share).max(done).max(0.0);
        phase.hours_required = required;
        phase.progress = if required > 0.0 { (done / required).min(1.0) } else { 1.0 };
    }
}

/// Applies a scope change. From the second one onward everyone on the
/// project takes an escalating morale hit on top of any explicit delta.
pub fn handle_scope_creep(ctx: &mut SimContext, project_id: &str, change: &ScopeChange) -> bool {
    let Some(project) = ctx.state.project_mut(project_id) else {
        log::warn!("scope change for unknown project {}", project_id);
        return false;
    };
    if project.is_terminal() {
        log::debug!("scope change ignored for closed project {}", project_id);
        return false;
    }
    rescale_open_hours(project, change.hours);
    project.total_weeks += change.weeks;
    project.weeks_remaining += change.weeks;
    project.budget += change.budget;
    project.scope_creep_count += 1;
    let count = project.scope_creep_count;
    let name = project.name.clone();
    ctx.state.stats.scope_creep_handled += 1;

    let mut penalty = 0.0;
    if count >= 2 {
        penalty = (scope::PENALTY_PER_REPEAT * (count - 1) as f64).min(scope::PENALTY_CAP);
    }
    let staff: Vec<String> = ctx
        .state
        .team
        .assigned_to_project(project_id)
        .filter(|m| !m.is_player)
        .map(|m| m.id.clone())
        .collect();
    for id in staff {
        let delta = change.morale - penalty;
        if delta != 0.0 {
            change_morale(ctx, &id, delta, "scope_creep");
        }
    }
    log::info!("{} scope change #{}: {:+.1}h {:+.1}w", project_id, count, change.hours, change.weeks);
    ctx.ui.notify_warning(&format!("Scope change on {} (#{}).", name, count));
    refresh_by_id(ctx.state, project_id);
    true
}

/// Adds progress to a phase. Negative deltas are ignored; progress only
/// moves forward. A named phase that cannot be worked yet passes the
/// progress on to the current phase instead.
pub fn add_phase_progress(project: &mut Project, phase: Option<PhaseKind>, delta: f64) -> bool {
    if delta <= 0.0 {
        log::debug!("ignoring non-positive progress delta {} on {}", delta, project.id);
        return false;
    }
    let named = phase.filter(|&k| project.phases.get(k).status.is_workable());
    if let (Some(k), None) = (phase, named) {
        log::debug!("{} {:?} is not workable, redirecting progress", project.id, k);
    }
    let Some(kind) = named.or_else(|| project.current_phase()) else {
        return false;
    };
    let p = project.phases.get_mut(kind);
    if p.is_complete() {
        return false;
    }
    p.progress = (p.progress + delta).min(1.0);
    true
}

/// Daily schedule bookkeeping: weeks-remaining decrement and overdue
/// penalties.
pub fn daily_deadlines(ctx: &mut SimContext) {
    let today = ctx.state.clock.today().ordinal();
    let ids: Vec<String> = ctx.state.active_projects().map(|p| p.id.clone()).collect();
    for id in ids {
        let Some(project) = ctx.state.project_mut(&id) else { continue };
        if project.last_decrement_day != Some(today) {
            project.weeks_remaining -= 1.0 / 7.0;
            project.last_decrement_day = Some(today);
        }
        if !project.is_overdue() {
            continue;
        }
        project.satisfaction_offset -= satisfaction::OVERDUE_DAILY_PENALTY;
        let first_miss = !project.deadline_missed;
        project.deadline_missed = true;
        let name = project.name.clone();
        refresh_by_id(ctx.state, &id);

        let project = match ctx.state.project(&id) {
            Some(p) => p.clone(),
            None => continue,
        };
        if first_miss {
            ctx.state.stats.deadlines_missed += 1;
            log::warn!("{} missed its deadline", id);
            ctx.ui.notify_warning(&format!("{} is past its deadline.", name));
        }
        if project.status == ProjectStatus::Crisis && !project.crisis_penalty_applied {
            if let Some(p) = ctx.state.project_mut(&id) {
                p.crisis_penalty_applied = true;
            }
            change_team_morale(ctx, -morale::CRISIS_HIT, "crisis");
        }
        let late = project.weeks_late();
        if late > deadlines::CUT_AFTER_WEEKS && !project.deadline_cut_applied {
            apply_deadline_cut(ctx, &id);
        }
        if late > deadlines::FAIL_AFTER_WEEKS {
            cancel_project(ctx, &id, true);
        }
    }
}

/// One-time budget and scope cut for badly overdue projects.
fn apply_deadline_cut(ctx: &mut SimContext, project_id: &str) {
    let Some(project) = ctx.state.project_mut(project_id) else { return };
    project.deadline_cut_applied = true;
    project.budget = (project.budget as f64 * (1.0 - deadlines::BUDGET_CUT)).round() as i64;
    let open: f64 = project
        .phases
        .iter()
        .filter(|p| !p.is_complete())
        .map(|p| p.hours_required - p.hours_completed())
        .sum();
    rescale_open_hours(project, -open * deadlines::SCOPE_CUT);
    let name = project.name.clone();
    log::warn!("{} cut by client after overrun", project_id);
    ctx.ui.notify_warning(&format!(
        "{}'s client cut the budget by 30% and trimmed the scope.",
        name
    ));
}
