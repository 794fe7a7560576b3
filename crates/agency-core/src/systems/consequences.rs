//! Choice resolution and consequence application.
//!
//! Each consequence field is independent. A field that names a member or
//! project that no longer exists is logged and skipped; the rest of the
//! batch still applies.

use agency_logic::constants::{burnout, burnout_fallout};
use agency_logic::scoring::reputation_budget_factor;
use agency_logic::wellbeing::damp_burnout_delta;
use rand::Rng;
use serde_json::Value;

use crate::catalog::{
    Consequence, MoraleTarget, ProjectTarget, LINKED_PLACEHOLDER, MEMBER_PLACEHOLDER,
};
use crate::context::SimContext;
use crate::generation::{create_from_template, ProjectOverrides};
use crate::ports::SoundCue;
use crate::systems::events::{lookup, push_event};
use crate::systems::projects::{
    add_phase_progress, cancel_project, handle_scope_creep, refresh_by_id,
};
use crate::systems::team::{change_morale, change_player_burnout, change_team_morale, quit_member};

/// One probability roll made while applying a consequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ChanceRoll {
    pub effect: &'static str,
    pub chance: f64,
    pub success: bool,
}

/// What a resolved choice did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolutionOutcome {
    pub event_id: String,
    pub choice: usize,
    /// Player-facing outcome lines.
    pub messages: Vec<String>,
    pub rolls: Vec<ChanceRoll>,
}

impl ResolutionOutcome {
    fn roll(&mut self, ctx: &mut SimContext, effect: &'static str, chance: Option<f64>) -> bool {
        let success = ctx.roll(chance);
        if let Some(chance) = chance {
            self.rolls.push(ChanceRoll { effect, chance, success });
        }
        success
    }
}

/// Resolves a choice on the displayed conversation. Returns `None` when
/// the conversation is not the one on screen, the choice does not exist
/// or a resolution is already running.
pub fn resolve_choice(ctx: &mut SimContext, event_id: &str, choice: usize) -> Option<ResolutionOutcome> {
    if ctx.state.events.resolving {
        log::debug!("resolve_choice re-entered for {}", event_id);
        return None;
    }
    if ctx.state.events.current.as_deref() != Some(event_id) {
        log::debug!("resolve_choice: {} is not displayed", event_id);
        return None;
    }
    let conv = lookup(ctx.state, ctx.catalog, event_id)?.clone();
    let Some(picked) = conv.choices.get(choice) else {
        log::debug!("resolve_choice: {} has no choice {}", event_id, choice);
        return None;
    };

    ctx.state.events.resolving = true;
    let member = bind_member(ctx, event_id);
    let linked = bind_linked(ctx, event_id, conv.linked_project.as_deref());
    let consequence = substitute(&picked.consequence, member.as_deref(), linked.as_deref());

    let mut outcome = ResolutionOutcome {
        event_id: event_id.to_string(),
        choice,
        ..Default::default()
    };
    extreme_burnout_penalty(ctx, &mut outcome);
    apply(ctx, &consequence, &mut outcome);

    let latency = ctx.state.clock.absolute_hours() - ctx.state.events.displayed_at;
    if let Some(project) = linked.as_deref().and_then(|id| ctx.state.project_mut(id)) {
        project.response_latency_hours = latency.max(0.0);
    }

    let events = &mut ctx.state.events;
    events.resolved.insert(event_id.to_string());
    events.queue.retain(|q| q != event_id);
    events.current = None;
    events.resolving = false;
    ctx.state.stats.events_resolved += 1;
    log::info!("resolved {} with choice {} ({})", event_id, choice, picked.label);
    Some(outcome)
}

/// Member bound to the conversation, or the first available staff member.
fn bind_member(ctx: &SimContext, event_id: &str) -> Option<String> {
    let team = &ctx.state.team;
    ctx.state
        .events
        .member_map
        .get(event_id)
        .filter(|id| team.get(id).map_or(false, |m| m.is_active()))
        .cloned()
        .or_else(|| team.staff().find(|m| m.is_available_staff()).map(|m| m.id.clone()))
        .or_else(|| team.staff().next().map(|m| m.id.clone()))
}

/// Project bound to the conversation, the conversation's own link, or
/// the first open project.
fn bind_linked(ctx: &SimContext, event_id: &str, declared: Option<&str>) -> Option<String> {
    let state = &*ctx.state;
    state
        .events
        .linked_map
        .get(event_id)
        .filter(|id| state.project(id).map_or(false, |p| !p.is_terminal()))
        .cloned()
        .or_else(|| declared.and_then(|d| state.resolve_project_id(d)))
        .or_else(|| state.active_projects().next().map(|p| p.id.clone()))
}

/// Replaces placeholders in every string of the consequence. Unbound
/// placeholders are left in place and fail lookup later.
pub fn substitute(consequence: &Consequence, member: Option<&str>, linked: Option<&str>) -> Consequence {
    if !consequence.has_placeholders() {
        return consequence.clone();
    }
    let mut value = match serde_json::to_value(consequence) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("placeholder substitution failed: {}", e);
            return consequence.clone();
        }
    };
    replace_strings(&mut value, member, linked);
    serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("placeholder substitution failed: {}", e);
        consequence.clone()
    })
}

fn replace_strings(value: &mut Value, member: Option<&str>, linked: Option<&str>) {
    match value {
        Value::String(s) => {
            if let Some(m) = member {
                *s = s.replace(MEMBER_PLACEHOLDER, m);
            }
            if let Some(l) = linked {
                *s = s.replace(LINKED_PLACEHOLDER, l);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| replace_strings(v, member, linked)),
        Value::Object(map) => map.values_mut().for_each(|v| replace_strings(v, member, linked)),
        _ => {}
    }
}

/// Applies every present field of `c`, in declaration order.
pub fn apply(ctx: &mut SimContext, c: &Consequence, out: &mut ResolutionOutcome) {
    if c.money != 0 {
        ctx.state.money += c.money;
        log::debug!("money {:+}", c.money);
    }

    for effect in &c.team_morale {
        match &effect.target {
            MoraleTarget::All => change_team_morale(ctx, effect.delta, "event"),
            MoraleTarget::Member(id) => member_morale(ctx, id, effect.delta),
            MoraleTarget::Members(ids) => {
                for id in ids {
                    member_morale(ctx, id, effect.delta);
                }
            }
        }
    }

    if c.player_burnout != 0.0 {
        change_player_burnout(ctx, damp_burnout_delta(c.player_burnout), "event");
    }

    if c.player_hours != 0.0 {
        if let Some(id) = ctx.state.team.player_id() {
            ctx.state.team.grant_hours(&id, c.player_hours, ctx.config.weekly_hours);
        }
    }

    if let Some(p) = &c.project_progress {
        match ctx.state.resolve_project_id(&p.project) {
            Some(id) => {
                if out.roll(ctx, "project_progress", p.chance) {
                    if let Some(project) = ctx.state.project_mut(&id).filter(|x| !x.is_terminal()) {
                        add_phase_progress(project, p.phase, p.delta);
                    }
                } else {
                    out.messages.push("The push didn't pay off this time.".to_string());
                }
            }
            None => log::warn!("project_progress: unknown project {}", p.project),
        }
    }

    if let Some(s) = &c.client_satisfaction {
        let targets: Vec<String> = match &s.target {
            ProjectTarget::All => ctx.state.active_projects().map(|p| p.id.clone()).collect(),
            ProjectTarget::Project(reference) => match ctx.state.resolve_project_id(reference) {
                Some(id) => vec![id],
                None => {
                    log::warn!("client_satisfaction: unknown project {}", reference);
                    Vec::new()
                }
            },
        };
        if !targets.is_empty() && out.roll(ctx, "client_satisfaction", s.chance) {
            for id in targets {
                shift_satisfaction(ctx, &id, s.delta);
            }
        }
    }

    if let Some(scope) = &c.scope_change {
        match ctx.state.resolve_project_id(&scope.project) {
            Some(id) => {
                handle_scope_creep(ctx, &id, scope);
            }
            None => log::warn!("scope_change: unknown project {}", scope.project),
        }
    }

    for id in &c.spawn_events {
        push_event(ctx, id);
    }

    if let Some(np) = &c.new_project {
        add_project(ctx, &np.template, np.budget, np.weeks, out);
    }

    if let Some(id) = &c.remove_member {
        if ctx.state.team.get(id).map_or(false, |m| !m.is_player) {
            quit_member(ctx, id, "let go");
        } else {
            log::warn!("remove_member: no removable member {}", id);
        }
    }

    if let Some(mh) = &c.member_hours {
        if ctx.state.team.get(&mh.member).is_none() {
            log::warn!("member_hours: unknown member {}", mh.member);
        } else if out.roll(ctx, "member_hours", mh.chance) {
            ctx.state.team.grant_hours(&mh.member, mh.delta, ctx.config.weekly_hours);
        }
    }

    if let Some(bonus) = &c.portfolio_bonus {
        if out.roll(ctx, "portfolio_bonus", Some(bonus.chance)) {
            ctx.state.money += bonus.amount;
            let msg = format!("The work got featured. Portfolio bonus: ${}.", bonus.amount);
            ctx.ui.notify_success(&msg);
            ctx.ui.play_sound(SoundCue::Payday);
            out.messages.push(msg);
        }
    }

    if let Some(payment) = &c.delayed_payment {
        if out.roll(ctx, "delayed_payment", Some(payment.chance)) {
            ctx.state.money += payment.amount;
            let msg = format!("A late invoice finally cleared: ${}.", payment.amount);
            ctx.ui.notify_success(&msg);
            ctx.ui.play_sound(SoundCue::Payday);
            out.messages.push(msg);
        }
    }

    if let Some(damage) = &c.relationship_damage {
        match ctx.state.resolve_project_id(&damage.project) {
            Some(id) => {
                if out.roll(ctx, "relationship_damage", Some(damage.chance)) {
                    shift_satisfaction(ctx, &id, -damage.satisfaction.abs());
                    let msg = "The client took it badly. The relationship has cooled.".to_string();
                    ctx.ui.notify_warning(&msg);
                    out.messages.push(msg);
                }
            }
            None => log::warn!("relationship_damage: unknown project {}", damage.project),
        }
    }

    if let Some(cancel) = &c.project_cancellation {
        match ctx.state.resolve_project_id(&cancel.project) {
            Some(id) => {
                if out.roll(ctx, "project_cancellation", Some(cancel.chance)) && cancel_project(ctx, &id, false) {
                    out.messages.push("The client pulled the project.".to_string());
                }
            }
            None => log::warn!("project_cancellation: unknown project {}", cancel.project),
        }
    }

    if let Some(opp) = &c.future_opportunity {
        if out.roll(ctx, "future_opportunity", Some(opp.chance)) && push_event(ctx, &opp.event) {
            let msg = "Word travels. A new opportunity is on its way.".to_string();
            ctx.ui.notify_success(&msg);
            out.messages.push(msg);
        }
    }
}

fn member_morale(ctx: &mut SimContext, id: &str, delta: f64) {
    if ctx.state.team.get(id).map_or(false, |m| m.is_active()) {
        change_morale(ctx, id, delta, "event");
    } else {
        log::warn!("team_morale: unknown or departed member {}", id);
    }
}

fn shift_satisfaction(ctx: &mut SimContext, project_id: &str, delta: f64) {
    if let Some(p) = ctx.state.project_mut(project_id).filter(|p| !p.is_terminal()) {
        p.satisfaction_offset += delta;
        refresh_by_id(ctx.state, project_id);
    }
}

/// Adds a project from a template with the reputation budget penalty.
pub fn add_project(
    ctx: &mut SimContext,
    template_id: &str,
    budget: Option<i64>,
    weeks: Option<f64>,
    out: &mut ResolutionOutcome,
) -> Option<String> {
    let Some(template) = ctx.catalog.project_template(template_id) else {
        log::warn!("new_project: unknown template {}", template_id);
        return None;
    };
    ctx.state.project_seq += 1;
    let id = format!("{}-{}", template_id, ctx.state.project_seq);
    let factor = reputation_budget_factor(ctx.state.stats.deadlines_missed, ctx.state.stats.on_time_deliveries);
    let project = create_from_template(
        template,
        &ProjectOverrides {
            id: Some(id.clone()),
            budget,
            weeks,
            budget_factor: factor,
        },
    );
    let msg = if factor < 1.0 {
        format!("New project: {}. Your track record cost you on the budget (${}).", project.name, project.budget)
    } else {
        format!("New project: {} (${}).", project.name, project.budget)
    };
    log::info!("added project {} (budget factor {})", id, factor);
    ctx.state.projects.push(project);
    ctx.ui.notify_success(&msg);
    out.messages.push(msg);
    Some(id)
}

/// Independent penalty roll while the lead is at extreme burnout.
fn extreme_burnout_penalty(ctx: &mut SimContext, out: &mut ResolutionOutcome) {
    let level = ctx.state.team.player().map_or(0.0, |p| p.burnout());
    if level < burnout::EXTREME {
        return;
    }
    let chance = ctx.config.extreme_burnout_penalty_chance;
    if !out.roll(ctx, "extreme_burnout", Some(chance)) {
        return;
    }
    let msg = match ctx.rng.gen_range(0..3) {
        0 => {
            change_team_morale(ctx, -burnout_fallout::TEAM_MORALE_HIT, "burnout_fallout");
            "You snapped at the team. Everyone noticed."
        }
        1 => {
            ctx.state.money -= burnout_fallout::MISTAKE_COST;
            "An exhausted mistake cost the agency money."
        }
        _ => {
            change_player_burnout(ctx, burnout_fallout::SPIRAL_BURNOUT, "burnout_spiral");
            "You can't switch off. Burnout climbs further."
        }
    };
    log::info!("extreme burnout penalty: {}", msg);
    ctx.ui.notify_warning(msg);
    out.messages.push(msg.to_string());
}
