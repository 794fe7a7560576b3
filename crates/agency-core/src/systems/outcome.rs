//! Failure checks, victory evaluation and the final report.

use agency_logic::config::SimConfig;
use agency_logic::constants::morale;
use agency_logic::scoring::{classify_victory, final_score, CareerSummary, VictoryTier};
use serde::{Deserialize, Serialize};

use crate::components::{GameOutcome, GameState, KeyMomentKind};
use crate::context::SimContext;
use crate::ports::SoundCue;

/// End-of-game report for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub outcome: Option<GameOutcome>,
    pub tier: Option<VictoryTier>,
    pub score: i64,
    pub summary: CareerSummary,
}

/// Which defeat condition, if any, currently holds.
pub fn failure_condition(state: &GameState, config: &SimConfig) -> Option<GameOutcome> {
    if state.money < config.bankruptcy_floor {
        return Some(GameOutcome::Bankrupt);
    }
    let staff: Vec<f64> = state.team.staff().map(|m| m.morale).collect();
    if state.team.members.len() > 1 && !staff.iter().any(|&m| m >= morale::COLLAPSE_FLOOR) {
        return Some(GameOutcome::MassQuit);
    }
    let broken = staff.iter().filter(|&&m| m < morale::COLLAPSE_FLOOR).count();
    if !staff.is_empty() && broken * 2 > staff.len() {
        return Some(GameOutcome::BurnoutCollapse);
    }
    None
}

/// Ends the game if a defeat condition holds.
pub fn check_failure(ctx: &mut SimContext) -> Option<GameOutcome> {
    if ctx.state.is_over() {
        return ctx.state.game_over;
    }
    let outcome = failure_condition(ctx.state, ctx.config)?;
    finish(ctx, outcome);
    Some(outcome)
}

/// Terminal transition. Ignored once the game is already over.
pub fn finish(ctx: &mut SimContext, outcome: GameOutcome) {
    if ctx.state.is_over() {
        return;
    }
    ctx.state.game_over = Some(outcome);
    let text = match outcome {
        GameOutcome::Victory(tier) => format!("Campaign finished: {:?}", tier),
        GameOutcome::Bankrupt => "The agency went bankrupt".to_string(),
        GameOutcome::MassQuit => "The team walked out".to_string(),
        GameOutcome::BurnoutCollapse => "The team burned out".to_string(),
    };
    log::info!("game over at {}: {}", ctx.state.clock, text);
    ctx.key_moment(KeyMomentKind::GameOver, text.clone());
    if outcome.is_victory() {
        ctx.ui.celebrate(&text);
        ctx.ui.play_sound(SoundCue::Celebration);
    } else {
        ctx.ui.notify_warning(&text);
        ctx.ui.play_sound(SoundCue::Warning);
    }
}

/// Classifies the campaign and ends the game in victory.
pub fn evaluate_victory(ctx: &mut SimContext) -> VictoryTier {
    let summary = career_summary(ctx.state, ctx.config);
    let tier = classify_victory(&summary);
    finish(ctx, GameOutcome::Victory(tier));
    tier
}

pub fn career_summary(state: &GameState, config: &SimConfig) -> CareerSummary {
    let stats = &state.stats;
    CareerSummary {
        projects_completed: stats.projects_completed,
        money: state.money,
        average_satisfaction: stats.average_completed_satisfaction(),
        team_morale: state.team.team_morale(),
        perfect_deliveries: stats.perfect_deliveries,
        scope_creep_handled: stats.scope_creep_handled,
        projects_failed: stats.projects_failed,
        deadlines_missed: stats.deadlines_missed,
        team_quits: stats.team_quits,
        weeks_remaining: (config.campaign_weeks + 1).saturating_sub(state.clock.week),
    }
}

pub fn final_report(state: &GameState, config: &SimConfig) -> FinalReport {
    let summary = career_summary(state, config);
    let tier = match state.game_over {
        Some(GameOutcome::Victory(tier)) => Some(tier),
        _ => None,
    };
    FinalReport {
        outcome: state.game_over,
        tier,
        score: final_score(&summary),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Team, TeamMember};
    use agency_logic::efficiency::Role;

    fn state(morale: &[f64]) -> GameState {
        let mut members = vec![TeamMember::new("you", "You", Role::Lead, 3, 40.0)];
        for (i, m) in morale.iter().enumerate() {
            let mut member = TeamMember::new(format!("m{}", i), "M", Role::Designer, 3, 40.0);
            member.morale = *m;
            members.push(member);
        }
        GameState {
            team: Team::new(members),
            money: 1_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_bankruptcy() {
        let mut s = state(&[70.0]);
        s.money = -10_001;
        assert_eq!(failure_condition(&s, &SimConfig::default()), Some(GameOutcome::Bankrupt));
    }

    #[test]
    fn test_mass_quit_when_nobody_above_floor() {
        let s = state(&[9.0, 8.0]);
        assert_eq!(failure_condition(&s, &SimConfig::default()), Some(GameOutcome::MassQuit));
    }

    #[test]
    fn test_collapse_needs_majority() {
        let config = SimConfig::default();
        assert_eq!(failure_condition(&state(&[9.0, 8.0, 60.0]), &config), Some(GameOutcome::BurnoutCollapse));
        assert_eq!(failure_condition(&state(&[9.0, 60.0]), &config), None);
    }

    #[test]
    fn test_lone_lead_is_not_mass_quit() {
        let s = state(&[]);
        assert_eq!(failure_condition(&s, &SimConfig::default()), None);
    }
}
