//! Team wellbeing: morale, burnout hooks, illness and quitting.

use agency_logic::constants::morale;
use agency_logic::wellbeing::{illness_chance, morale_drift, BurnoutThreshold, DriftInputs};
use rand::Rng;

use crate::components::{EventSignal, KeyMomentKind, Trait};
use crate::context::SimContext;
use crate::ports::SoundCue;

/// Changes one member's morale and queues any latch crossing for the
/// next event scan. Returns the applied delta.
pub fn change_morale(ctx: &mut SimContext, member_id: &str, delta: f64, source: &str) -> Option<f64> {
    let change = ctx.state.team.adjust_morale_from(member_id, delta, source)?;
    if let Some(crossing) = change.crossing {
        ctx.state.events.signals.push(EventSignal::Morale {
            member_id: member_id.to_string(),
            crossing,
        });
    }
    Some(change.applied)
}

/// Changes morale for every non-player member still on the team.
pub fn change_team_morale(ctx: &mut SimContext, delta: f64, source: &str) {
    let changes = ctx.state.team.adjust_team_morale(delta, source);
    for (member_id, change) in changes {
        if let Some(crossing) = change.crossing {
            ctx.state.events.signals.push(EventSignal::Morale { member_id, crossing });
        }
    }
}

/// Routes a burnout change through the team's single writer and reacts
/// to threshold crossings.
pub fn change_burnout(ctx: &mut SimContext, member_id: &str, delta: f64, reason: &str) -> Option<f64> {
    let change = ctx.state.team.adjust_burnout(member_id, delta, reason)?;
    for threshold in &change.crossings {
        let message = match threshold {
            BurnoutThreshold::Warning => "You're running on fumes. Burnout passed 60%.",
            BurnoutThreshold::Critical => "Burnout passed 80%. Something has to give.",
        };
        log::warn!("{} burnout crossed {:?} ({:.1})", member_id, threshold, change.after);
        ctx.ui.notify_warning(message);
        ctx.ui.play_sound(SoundCue::Warning);
        ctx.state.events.signals.push(EventSignal::Burnout { threshold: *threshold });
    }
    Some(change.applied)
}

/// Changes the lead's burnout. Missing lead is a no-op.
pub fn change_player_burnout(ctx: &mut SimContext, delta: f64, reason: &str) -> Option<f64> {
    let id = ctx.state.team.player_id()?;
    change_burnout(ctx, &id, delta, reason)
}

/// Removes a member for good.
pub fn quit_member(ctx: &mut SimContext, member_id: &str, reason: &str) -> bool {
    let Some(name) = ctx.state.team.get(member_id).map(|m| m.name.clone()) else {
        log::warn!("cannot remove unknown member {}", member_id);
        return false;
    };
    if !ctx.state.team.mark_quit(member_id) {
        return false;
    }
    ctx.state.stats.team_quits += 1;
    log::info!("{} left the agency: {}", member_id, reason);
    ctx.ui.notify_warning(&format!("{} has left the agency.", name));
    ctx.key_moment(KeyMomentKind::Quit, format!("{} quit ({})", name, reason));
    true
}

/// Staff at the catastrophic morale floor walk out.
pub fn check_quits(ctx: &mut SimContext) {
    let leaving: Vec<String> = ctx
        .state
        .team
        .staff()
        .filter(|m| m.morale <= morale::QUIT_FLOOR)
        .map(|m| m.id.clone())
        .collect();
    for id in leaving {
        quit_member(ctx, &id, "morale collapse");
    }
}

/// Once-a-day team processing: recoveries, the fresh hour allotment,
/// illness, morale drift and quits. Illness and drift only happen on
/// workdays.
pub fn daily_team_update(ctx: &mut SimContext, workday: bool) {
    for id in ctx.state.team.recover_all() {
        log::debug!("{} recovered", id);
    }
    ctx.state.team.reset_day_hours(ctx.config.daily_hours);
    if !workday {
        return;
    }
    roll_illness(ctx);
    apply_morale_drift(ctx);
    check_quits(ctx);
}

fn roll_illness(ctx: &mut SimContext) {
    let day_hours = ctx.config.daily_hours;
    let rolls: Vec<(String, String, f64)> = ctx
        .state
        .team
        .staff()
        .filter(|m| !m.is_ill)
        .map(|m| {
            let chance = illness_chance(m.has_trait(Trait::OftenIll), m.morale, m.days_on_assignment);
            (m.id.clone(), m.name.clone(), chance)
        })
        .collect();
    for (id, name, chance) in rolls {
        if ctx.rng.gen_bool(chance) {
            ctx.state.team.fall_ill(&id, day_hours);
            log::info!("{} called in sick", id);
            ctx.ui.notify_warning(&format!("{} is out sick today.", name));
        }
    }
}

fn apply_morale_drift(ctx: &mut SimContext) {
    let team_morale = ctx.state.team.team_morale();
    let lead_burnout = ctx.state.team.player().map(|p| p.burnout()).unwrap_or(0.0);
    let ids: Vec<String> = ctx.state.team.staff().map(|m| m.id.clone()).collect();
    for id in ids {
        let Some(m) = ctx.state.team.get_mut(&id) else { continue };
        let assigned = m.is_assigned();
        m.days_on_assignment = if assigned { m.days_on_assignment + 1 } else { 0 };
        let inputs = DriftInputs {
            never_demoralized: m.has_trait(Trait::NeverDemoralized),
            days_on_assignment: m.days_on_assignment,
            assigned,
            team_morale,
            lead_burnout,
        };
        let delta = morale_drift(&inputs);
        if delta != 0.0 {
            change_morale(ctx, &id, delta, "drift");
        }
    }
}
