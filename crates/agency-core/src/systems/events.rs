//! Conversation scheduling: eligibility scans, the display queue,
//! deferrals and display-time text substitution.
//!
//! A conversation moves `eligible -> queued -> displayed -> resolved`.
//! Deferral takes it out of the queue until a given day, after which it
//! is queued again. Only one conversation is displayed at a time.

use agency_logic::calendar::CalendarDay;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{Catalog, Conversation, Schedule, Trigger};
use crate::components::{EventSignal, GameState};
use crate::context::SimContext;
use crate::ports::SoundCue;

/// Character ids the bundled conversation text was written against.
pub const LEGACY_SPEAKERS: [&str; 5] = ["sarah", "marcus", "priya", "leo", "ines"];

const WORKER_TOKEN: &str = "{Worker}";
const WORKER_ROLE_TOKEN: &str = "{WorkerRole}";

/// Finds a conversation in the generated set first, then the catalog.
pub fn lookup<'a>(state: &'a GameState, catalog: &'a Catalog, id: &str) -> Option<&'a Conversation> {
    state.events.dynamic.get(id).or_else(|| catalog.conversation(id))
}

/// A conversation ready for display, with names filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEvent {
    pub id: String,
    pub title: String,
    pub body: String,
    pub speaker: Option<String>,
    pub choices: Vec<RenderedChoice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChoice {
    pub label: String,
    pub summary: String,
}

/// Runs an eligibility scan and shows the next conversation if nothing
/// is on screen. Candidate gathering happens at most once per game hour
/// unless `force` is set. Returns the id that was displayed, if any.
pub fn scan(ctx: &mut SimContext, force: bool) -> Option<String> {
    if ctx.state.is_over() {
        return None;
    }
    let key = ctx.state.clock.hour_key();
    if force || ctx.state.events.last_scan_key != Some(key) {
        ctx.state.events.last_scan_key = Some(key);
        let candidates = gather_candidates(ctx);
        if !candidates.is_empty() {
            log::debug!("{} eligible: {:?}", ctx.state.clock, candidates);
        }
        if let Some(shown) = enqueue(ctx, candidates) {
            return Some(shown);
        }
    }
    if ctx.state.events.current.is_some() {
        return None;
    }
    show_next(ctx)
}

/// Shows one candidate at random if the screen and queue are both empty,
/// and queues the rest in order.
fn enqueue(ctx: &mut SimContext, mut candidates: Vec<String>) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    let mut shown = None;
    let events = &ctx.state.events;
    if events.current.is_none() && events.queue.is_empty() {
        let pick = ctx.rng.gen_range(0..candidates.len());
        let first = candidates.remove(pick);
        display(ctx, &first);
        shown = Some(first);
    }
    for id in candidates {
        if !ctx.state.events.is_pending(&id) {
            ctx.state.events.queue.push_back(id);
        }
    }
    shown
}

/// Puts a conversation on screen.
pub fn display(ctx: &mut SimContext, id: &str) {
    let events = &mut ctx.state.events;
    events.queue.retain(|q| q != id);
    events.current = Some(id.to_string());
    events.displayed_at = ctx.state.clock.absolute_hours();
    events.shown_today.insert(id.to_string());
    log::info!("{} showing {}", ctx.state.clock, id);
    ctx.ui.event_displayed(id);
    ctx.ui.play_sound(SoundCue::EventAlert);
}

/// Pops the queue until something displayable turns up.
pub fn show_next(ctx: &mut SimContext) -> Option<String> {
    if ctx.state.events.current.is_some() {
        return None;
    }
    while let Some(id) = ctx.state.events.queue.pop_front() {
        let Some(conv) = lookup(ctx.state, ctx.catalog, &id) else {
            log::warn!("dropping unknown conversation {} from queue", id);
            continue;
        };
        if !conv.repeatable && ctx.state.events.resolved.contains(&id) {
            log::debug!("skipping already resolved {}", id);
            continue;
        }
        if ctx.state.events.deferred.contains_key(&id) {
            continue;
        }
        display(ctx, &id);
        return Some(id);
    }
    None
}

/// Adds a conversation to the back of the queue.
pub fn push_event(ctx: &mut SimContext, id: &str) -> bool {
    if lookup(ctx.state, ctx.catalog, id).is_none() {
        log::warn!("cannot queue unknown conversation {}", id);
        return false;
    }
    if ctx.state.events.is_pending(id) {
        return false;
    }
    ctx.state.events.queue.push_back(id.to_string());
    true
}

/// Takes a conversation off screen (or out of the queue) until tomorrow.
/// A later deferral of the same id replaces the earlier one.
pub fn defer(ctx: &mut SimContext, id: &str) -> bool {
    let target = ctx.state.clock.today().next_day();
    if !take_pending(ctx.state, id) {
        log::debug!("defer: {} is not pending", id);
        return false;
    }
    ctx.state.events.deferred.insert(id.to_string(), target);
    log::info!("deferred {} to {}", id, target);
    show_next(ctx);
    true
}

/// Moves the displayed conversation and the whole queue to the next
/// workday.
pub fn defer_all_to_next_workday(ctx: &mut SimContext) -> usize {
    let target = ctx.state.clock.today().next_workday(ctx.config.last_workday);
    let events = &mut ctx.state.events;
    let mut moved: Vec<String> = events.current.take().into_iter().collect();
    moved.extend(events.queue.drain(..));
    for id in &moved {
        events.deferred.insert(id.clone(), target);
    }
    if !moved.is_empty() {
        log::info!("deferred {} conversations to {}", moved.len(), target);
    }
    moved.len()
}

fn take_pending(state: &mut GameState, id: &str) -> bool {
    let events = &mut state.events;
    let mut found = false;
    if events.current.as_deref() == Some(id) {
        events.current = None;
        found = true;
    }
    let before = events.queue.len();
    events.queue.retain(|q| q != id);
    found || events.queue.len() != before
}

/// Moves deferrals that have come due back onto the queue.
pub fn restore_due_deferrals(ctx: &mut SimContext) {
    let today = ctx.state.clock.today();
    let due: Vec<String> = ctx
        .state
        .events
        .deferred
        .iter()
        .filter(|(_, day)| **day <= today)
        .map(|(id, _)| id.clone())
        .collect();
    for id in due {
        ctx.state.events.deferred.remove(&id);
        let repeatable = lookup(ctx.state, ctx.catalog, &id).map_or(false, |c| c.repeatable);
        if ctx.state.events.resolved.contains(&id) && !repeatable {
            continue;
        }
        if !ctx.state.events.is_pending(&id) {
            log::debug!("restoring deferred {}", id);
            ctx.state.events.queue.push_back(id);
        }
    }
}

fn gather_candidates(ctx: &mut SimContext) -> Vec<String> {
    let signals = std::mem::take(&mut ctx.state.events.signals);
    let today = ctx.state.clock.today();
    let catalog = ctx.catalog;
    let mut out = Vec::new();

    for conv in &catalog.conversations.conversations {
        if !is_open(ctx.state, conv) {
            continue;
        }
        let eligible = match conv.schedule {
            Schedule::Fixed { week, day } => today == CalendarDay::new(week, day),
            Schedule::Conditional => match &conv.trigger {
                Some(trigger) => check_trigger(ctx, conv, trigger, &signals),
                None => false,
            },
        };
        if eligible {
            out.push(conv.id.clone());
        }
    }
    out
}

/// Filters that apply regardless of schedule.
fn is_open(state: &GameState, conv: &Conversation) -> bool {
    let events = &state.events;
    conv.allowed_in(state.phase)
        && (conv.repeatable || !events.resolved.contains(&conv.id))
        && !events.shown_today.contains(&conv.id)
        && !events.deferred.contains_key(&conv.id)
        && !events.is_pending(&conv.id)
}

fn check_trigger(ctx: &mut SimContext, conv: &Conversation, trigger: &Trigger, signals: &[EventSignal]) -> bool {
    let state = &*ctx.state;
    let mut member: Option<String> = None;
    let mut linked: Option<String> = None;

    let holds = match trigger {
        Trigger::PlayerBurnoutAbove { threshold } => {
            state.team.player().map_or(false, |p| p.burnout() > *threshold)
        }
        Trigger::TeamMoraleBelow { threshold } => {
            state.team.staff().next().is_some() && state.team.team_morale() < *threshold
        }
        Trigger::BurnoutCrossed { threshold } => signals
            .iter()
            .any(|s| matches!(s, EventSignal::Burnout { threshold: t } if t == threshold)),
        Trigger::MoraleCrossed { crossing, personality } => {
            member = signals.iter().find_map(|s| match s {
                EventSignal::Morale { member_id, crossing: c } if c == crossing => state
                    .team
                    .get(member_id)
                    .filter(|m| m.is_active())
                    .filter(|m| personality.map_or(true, |p| m.personality == p))
                    .map(|m| m.id.clone()),
                _ => None,
            });
            member.is_some()
        }
        Trigger::ProjectStatusIs { status } => {
            linked = state
                .active_projects()
                .find(|p| p.status == *status)
                .map(|p| p.id.clone());
            linked.is_some()
        }
        Trigger::ProjectProgressBetween { min, max } => {
            linked = state
                .active_projects()
                .find(|p| {
                    let progress = p.progress();
                    progress >= *min && progress < *max
                })
                .map(|p| p.id.clone());
            linked.is_some()
        }
        Trigger::RoleCheckIn { role, personality } => {
            let pool: Vec<String> = state
                .team
                .staff()
                .filter(|m| m.role == *role && !m.is_ill)
                .filter(|m| personality.map_or(true, |p| m.personality == p))
                .map(|m| m.id.clone())
                .collect();
            member = pool.choose(ctx.rng).cloned();
            member.is_some()
        }
        Trigger::HourOfDay { hour } => {
            state.clock.today().is_workday(ctx.config.last_workday) && state.clock.hour == *hour
        }
        Trigger::IdleCapacity { min_idle } => {
            let idle = state
                .team
                .staff()
                .filter(|m| !m.is_ill && !m.is_assigned())
                .count();
            idle >= *min_idle && state.active_projects().next().is_some()
        }
        Trigger::OfferWindow { from_week, to_week } => {
            (*from_week..=*to_week).contains(&state.clock.week)
        }
    };

    if !holds || !ctx.roll(Some(conv.chance)) {
        return false;
    }
    if let Some(m) = member {
        ctx.state.events.member_map.insert(conv.id.clone(), m);
    }
    if let Some(p) = linked {
        ctx.state.events.linked_map.insert(conv.id.clone(), p);
    }
    true
}

/// The displayed conversation with member names substituted.
pub fn render_event(state: &GameState, catalog: &Catalog, id: &str) -> Option<RenderedEvent> {
    let conv = lookup(state, catalog, id)?;
    let member = state
        .events
        .member_map
        .get(id)
        .and_then(|m| state.team.get(m))
        .or_else(|| {
            conv.speaker
                .as_deref()
                .filter(|s| LEGACY_SPEAKERS.contains(s))
                .and_then(|s| state.team.get(s))
        });

    let render = |text: &str| -> String {
        let Some(m) = member else { return text.to_string() };
        let mut out = text
            .replace(WORKER_ROLE_TOKEN, m.role.label())
            .replace(WORKER_TOKEN, &m.name);
        if let Some(legacy) = conv.speaker.as_deref() {
            if legacy != m.id {
                out = out.replace(&capitalize(legacy), &m.name);
            }
        }
        out
    };

    Some(RenderedEvent {
        id: conv.id.clone(),
        title: render(&conv.title),
        body: render(&conv.body),
        speaker: member.map(|m| m.name.clone()),
        choices: conv
            .choices
            .iter()
            .map(|c| RenderedChoice {
                label: render(&c.label),
                summary: render(&c.summary),
            })
            .collect(),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
