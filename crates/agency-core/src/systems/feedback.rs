//! End-of-week digests, client check-ins, the team pulse and tips.

use agency_logic::efficiency::PhaseStatus;
use agency_logic::satisfaction::{feedback_band, FeedbackBand};

use crate::catalog::{
    Choice, Consequence, Conversation, MoraleEffect, MoraleTarget, Schedule, Urgency,
    MEMBER_PLACEHOLDER,
};
use crate::context::SimContext;
use crate::ports::WeekSummary;
use crate::systems::events::push_event;

const TIP_BURNOUT: f64 = 70.0;
const TIP_CASH_WEEKS: i64 = 2;

pub fn team_pulse_id(week: u32) -> String {
    format!("team_pulse_w{}", week)
}

/// Builds this week's team pulse conversation around the least happy
/// member and queues it. Skipped when nobody is left to ask.
pub fn team_pulse(ctx: &mut SimContext) -> Option<String> {
    let week = ctx.state.clock.week;
    let id = team_pulse_id(week);
    if ctx.state.events.dynamic.contains_key(&id) {
        return None;
    }
    let lowest = ctx
        .state
        .team
        .staff()
        .min_by(|a, b| a.morale.total_cmp(&b.morale))
        .map(|m| (m.id.clone(), m.name.clone(), m.morale))?;
    let (member_id, name, member_morale) = lowest;
    let team_morale = ctx.state.team.team_morale();

    let conv = Conversation {
        id: id.clone(),
        title: format!("Team pulse, week {}", week),
        body: format!(
            "Team morale is sitting at {:.0}%. {} seems the most worn down ({:.0}%). How do you want to close out the week?",
            team_morale, name, member_morale
        ),
        speaker: None,
        schedule: Schedule::Conditional,
        trigger: None,
        chance: 1.0,
        urgency: Urgency::Low,
        response_deadline_hours: None,
        linked_project: None,
        phases: Vec::new(),
        repeatable: false,
        choices: vec![
            Choice {
                label: "Take everyone out for lunch".into(),
                summary: "-$300, team morale +4".into(),
                consequence: Consequence {
                    money: -300,
                    team_morale: vec![MoraleEffect {
                        target: MoraleTarget::All,
                        delta: 4.0,
                    }],
                    ..Default::default()
                },
            },
            Choice {
                label: "Book a one-on-one with {Worker}".into(),
                summary: "{Worker} +10 morale, costs you an hour".into(),
                consequence: Consequence {
                    team_morale: vec![MoraleEffect {
                        target: MoraleTarget::Member(MEMBER_PLACEHOLDER.into()),
                        delta: 10.0,
                    }],
                    player_hours: -1.0,
                    ..Default::default()
                },
            },
            Choice {
                label: "Keep heads down".into(),
                summary: "Team morale -1".into(),
                consequence: Consequence {
                    team_morale: vec![MoraleEffect {
                        target: MoraleTarget::All,
                        delta: -1.0,
                    }],
                    ..Default::default()
                },
            },
        ],
    };
    ctx.state.events.dynamic.insert(id.clone(), conv);
    ctx.state.events.member_map.insert(id.clone(), member_id);
    push_event(ctx, &id);
    log::debug!("queued {}", id);
    Some(id)
}

/// One check-in notice per open project, toned by satisfaction.
pub fn client_feedback(ctx: &mut SimContext) {
    let notes: Vec<(String, FeedbackBand)> = ctx
        .state
        .active_projects()
        .map(|p| (p.client.clone(), feedback_band(p.satisfaction)))
        .collect();
    for (client, band) in notes {
        let client = if client.is_empty() { "The client".to_string() } else { client };
        match band {
            FeedbackBand::Delighted => ctx.ui.notify_success(&format!("{} is delighted with progress.", client)),
            FeedbackBand::Content => ctx.ui.notify_success(&format!("{} is happy enough.", client)),
            FeedbackBand::Uneasy => ctx.ui.notify_warning(&format!("{} is getting uneasy.", client)),
            FeedbackBand::Unhappy => ctx.ui.notify_warning(&format!("{} is unhappy and says so.", client)),
        }
    }
}

pub fn build_week_summary(ctx: &SimContext) -> WeekSummary {
    let state = &*ctx.state;
    let week = state.clock.week;
    WeekSummary {
        week,
        money: state.money,
        team_morale: state.team.team_morale(),
        player_burnout: state.team.player().map_or(0.0, |p| p.burnout()),
        completed_this_week: state
            .projects
            .iter()
            .filter(|p| p.completed_on.map_or(false, |d| d.week == week))
            .count() as u32,
        projects: state
            .active_projects()
            .map(|p| (p.name.clone(), p.status))
            .collect(),
    }
}

pub fn week_summary(ctx: &mut SimContext) {
    let summary = build_week_summary(ctx);
    log::info!(
        "week {} summary: ${} morale {:.0} burnout {:.0}",
        summary.week,
        summary.money,
        summary.team_morale,
        summary.player_burnout
    );
    ctx.ui.week_summary(&summary);
}

/// Shows at most one contextual tip per day.
pub fn tips(ctx: &mut SimContext) -> Option<&'static str> {
    let today = ctx.state.clock.today().ordinal();
    if ctx.state.last_tip_day == Some(today) {
        return None;
    }
    let state = &*ctx.state;
    let idle = state
        .team
        .staff()
        .any(|m| !m.is_ill && !m.is_assigned());
    let unstaffed = state.active_projects().any(|p| {
        p.phases.iter().any(|ph| {
            matches!(ph.status, PhaseStatus::Ready | PhaseStatus::Active)
                && state.team.assigned_to(&p.id, ph.kind).next().is_none()
                && ph.freelancer.is_none()
        })
    });
    let burnout = state.team.player().map_or(0.0, |p| p.burnout());
    let payroll = state.weekly_payroll();

    let tip = if idle && unstaffed {
        "Someone is sitting idle while a phase has nobody on it. Try auto-assign."
    } else if burnout >= TIP_BURNOUT {
        "Your burnout is high. Resting over the weekend or calling in sick will help."
    } else if payroll > 0 && state.money < payroll * TIP_CASH_WEEKS {
        "Cash is under two weeks of payroll. Deliver something soon."
    } else {
        return None;
    };
    ctx.state.last_tip_day = Some(today);
    ctx.ui.notify_success(tip);
    Some(tip)
}
