//! Simulation engine - main entry point for running a campaign

use agency_logic::calendar::{GamePhase, DAYS_PER_WEEK};
use agency_logic::config::SimConfig;
use agency_logic::constants::{efficiency, weekend};
use agency_logic::efficiency::PhaseKind;
use agency_logic::wellbeing::damp_burnout_delta;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::components::*;
use crate::context::SimContext;
use crate::generation::{create_from_template, create_team, ProjectOverrides};
use crate::persistence::{self, PersistenceError};
use crate::ports::{Headless, NullStore, Presentation, SnapshotStore, SoundCue};
use crate::systems::assignment::auto_assign;
use crate::systems::consequences::{resolve_choice, ResolutionOutcome};
use crate::systems::events::{defer, defer_all_to_next_workday, render_event, restore_due_deferrals, scan, RenderedEvent};
use crate::systems::feedback::{client_feedback, team_pulse, tips, week_summary};
use crate::systems::outcome::{check_failure, evaluate_victory, final_report, FinalReport};
use crate::systems::projects::{daily_deadlines, refresh_projects};
use crate::systems::team::{change_player_burnout, change_team_morale, daily_team_update};
use crate::systems::work::{accrue_stress, work_step};

/// Why the clock did not move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    GameOver,
    AwaitingResponse,
    WeekendChoice,
    Paused,
}

/// What one tick or day advance crossed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub day_ended: bool,
    pub week_rolled: bool,
    /// Conversation put on screen during this step.
    pub displayed: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Held(HoldReason),
    Advanced(TickReport),
}

impl TickOutcome {
    pub fn advanced(&self) -> bool {
        matches!(self, TickOutcome::Advanced(_))
    }
}

/// How the player spends the weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekendChoice {
    Rest,
    CatchUp,
    Crunch,
}

/// Player commands the engine refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("the game is over")]
    GameOver,
    #[error("unknown team member {0}")]
    UnknownMember(String),
    #[error("{0} is not available")]
    MemberUnavailable(String),
    #[error("unknown project {0}")]
    UnknownProject(String),
    #[error("project {0} is closed")]
    ProjectClosed(String),
    #[error("{phase} on {project} is already complete")]
    PhaseComplete { project: String, phase: &'static str },
    #[error("a freelancer is already on {phase} for {project}")]
    FreelancerAlreadyHired { project: String, phase: &'static str },
    #[error("not enough money: need {needed}, have {available}")]
    InsufficientFunds { needed: i64, available: i64 },
    #[error("no weekend choice is pending")]
    NoWeekendPending,
    #[error("the weekend choice has to be made first")]
    WeekendPending,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// The whole mutable game state
    pub state: GameState,
    /// Read-only catalog data
    pub catalog: Catalog,
    /// Tunable settings
    pub config: SimConfig,
    rng: ChaCha8Rng,
    ui: Box<dyn Presentation>,
    store: Box<dyn SnapshotStore>,
}

impl SimulationEngine {
    /// Create an engine with a fresh game, headless and unpersisted
    pub fn new(catalog: Catalog, config: SimConfig) -> Self {
        let mut engine = Self {
            state: GameState::default(),
            catalog,
            config,
            rng: ChaCha8Rng::from_entropy(),
            ui: Box::new(Headless),
            store: Box::new(NullStore),
        };
        engine.new_game();
        engine
    }

    /// Fixes the random stream. Scenario tests use this for determinism.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn with_presentation(mut self, ui: impl Presentation + 'static) -> Self {
        self.ui = Box::new(ui);
        self
    }

    pub fn with_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            state: &mut self.state,
            catalog: &self.catalog,
            config: &self.config,
            rng: &mut self.rng,
            ui: &mut *self.ui,
        }
    }

    /// Replaces the state with a new campaign built from the catalog.
    pub fn new_game(&mut self) {
        let mut state = GameState {
            clock: GameClock::new(self.config.workday_start_hour),
            money: self.config.starting_money,
            phase: GamePhase::for_week(1),
            team: create_team(&self.catalog.roster.members, &self.config),
            ..Default::default()
        };
        for template_id in &self.catalog.projects.starting {
            match self.catalog.project_template(template_id) {
                Some(template) => state
                    .projects
                    .push(create_from_template(template, &ProjectOverrides::default())),
                None => log::warn!("starting project {} not in catalog", template_id),
            }
        }
        log::info!(
            "new game: {} members, {} projects, ${}",
            state.team.members.len(),
            state.projects.len(),
            state.money
        );
        self.state = state;
    }

    /// Loads the stored snapshot, or starts fresh when there is none or
    /// it cannot be read.
    pub fn restore(&mut self) -> bool {
        match self.store.load() {
            Ok(Some(state)) => {
                log::info!("restored game at {}", state.clock);
                self.state = state;
                true
            }
            Ok(None) => {
                self.new_game();
                false
            }
            Err(e) => {
                log::warn!("could not restore snapshot, starting fresh: {}", e);
                self.new_game();
                false
            }
        }
    }

    /// Writes the current state to the store. Failures are logged.
    pub fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            log::warn!("failed to save snapshot: {}", e);
        }
    }

    pub fn snapshot(&self) -> Result<String, PersistenceError> {
        persistence::to_json(&self.state)
    }

    pub fn load_snapshot(&mut self, raw: &str) -> Result<(), PersistenceError> {
        self.state = persistence::from_json(raw)?;
        Ok(())
    }

    /// Why the clock is not running, if it isn't.
    pub fn hold_reason(&self) -> Option<HoldReason> {
        if self.state.is_over() {
            Some(HoldReason::GameOver)
        } else if self.state.awaiting_response() {
            Some(HoldReason::AwaitingResponse)
        } else if self.state.clock.weekend_pending {
            Some(HoldReason::WeekendChoice)
        } else if self.state.clock.paused {
            Some(HoldReason::Paused)
        } else {
            None
        }
    }

    /// Advances the simulation by one tick. Nothing changes while held.
    pub fn tick(&mut self) -> TickOutcome {
        if let Some(reason) = self.hold_reason() {
            return TickOutcome::Held(reason);
        }
        let mut report = TickReport::default();
        if !self.is_workday() {
            report.day_ended = true;
            report.week_rolled = self.day_boundary();
        } else {
            let hours = self.config.tick_hours;
            let minutes = (hours * 60.0).round() as u32;
            let end_hour = self.config.workday_end_hour;
            let mut ctx = self.ctx();
            let worked = work_step(&mut ctx, hours);
            accrue_stress(&mut ctx, 1.0);
            refresh_projects(&mut ctx, &worked);
            match ctx.state.clock.advance_minutes(minutes, end_hour) {
                ClockStep::Within => {
                    report.displayed = scan(&mut ctx, false);
                    check_failure(&mut ctx);
                }
                ClockStep::EndOfDay { .. } => {
                    report.day_ended = true;
                    report.week_rolled = self.end_of_workday();
                }
            }
        }
        if report.day_ended && report.displayed.is_none() {
            report.displayed = self.state.events.current.clone();
        }
        self.persist();
        TickOutcome::Advanced(report)
    }

    /// Runs the rest of the current day in one step.
    pub fn advance_day(&mut self) -> TickOutcome {
        match self.hold_reason() {
            Some(HoldReason::Paused) | None => {}
            Some(reason) => return TickOutcome::Held(reason),
        }
        let mut report = TickReport {
            day_ended: true,
            ..Default::default()
        };
        if self.is_workday() {
            let end_hour = self.config.workday_end_hour;
            let tick_hours = self.config.tick_hours;
            let mut ctx = self.ctx();
            let minutes = ctx.state.clock.minutes_until(end_hour);
            let hours = minutes as f64 / 60.0;
            let worked = work_step(&mut ctx, hours);
            accrue_stress(&mut ctx, hours / tick_hours);
            refresh_projects(&mut ctx, &worked);
            ctx.state.clock.advance_minutes(minutes, end_hour);
            report.week_rolled = self.end_of_workday();
        } else {
            report.week_rolled = self.day_boundary();
        }
        report.displayed = self.state.events.current.clone();
        self.persist();
        TickOutcome::Advanced(report)
    }

    /// Spends `hours` of the player's time, as when answering a
    /// conversation. Only the player's hours move and they may go
    /// negative. Returns true if the workday ran out.
    pub fn advance_by_hours(&mut self, hours: f64) -> bool {
        if hours <= 0.0 || self.state.is_over() {
            return false;
        }
        let end_hour = self.config.workday_end_hour;
        let tick_hours = self.config.tick_hours;
        let minutes = (hours * 60.0).round() as u32;
        let mut ctx = self.ctx();
        if let Some(id) = ctx.state.team.player_id() {
            ctx.state.team.consume_hours(&id, hours);
        }
        accrue_stress(&mut ctx, hours / tick_hours);
        matches!(
            ctx.state.clock.advance_minutes(minutes, end_hour),
            ClockStep::EndOfDay { .. }
        )
    }

    fn is_workday(&self) -> bool {
        self.state.clock.today().is_workday(self.config.last_workday)
    }

    /// End of a workday: hold for the weekend choice after the last one,
    /// otherwise roll into tomorrow.
    fn end_of_workday(&mut self) -> bool {
        if self.state.clock.day == self.config.last_workday {
            self.state.clock.weekend_pending = true;
            log::info!("{} weekend choice pending", self.state.clock);
            return false;
        }
        self.day_boundary()
    }

    /// Rolls into the next day and runs all daily processing. Returns
    /// true on a week rollover.
    fn day_boundary(&mut self) -> bool {
        let start_hour = self.config.workday_start_hour;
        let last_workday = self.config.last_workday;
        let mut ctx = self.ctx();

        let week_rolled = ctx.state.clock.roll_day(start_hour);
        ctx.state.events.shown_today.clear();
        let today = ctx.state.clock.today();
        log::debug!("day boundary -> {}", today);

        if week_rolled {
            weekly_rollover(&mut ctx);
            if ctx.state.is_over() {
                drop(ctx);
                self.persist();
                return true;
            }
        }

        restore_due_deferrals(&mut ctx);
        daily_team_update(&mut ctx, today.is_workday(last_workday));
        refresh_projects(&mut ctx, &[]);
        check_failure(&mut ctx);
        if !ctx.state.is_over() {
            scan(&mut ctx, false);
            tips(&mut ctx);
            if today.day == DAYS_PER_WEEK {
                team_pulse(&mut ctx);
                client_feedback(&mut ctx);
                week_summary(&mut ctx);
                scan(&mut ctx, false);
            }
            daily_deadlines(&mut ctx);
            check_failure(&mut ctx);
        }
        let morale = ctx.state.team.team_morale();
        ctx.state.stats.record_team_morale(morale);
        drop(ctx);
        self.persist();
        week_rolled
    }

    /// Resolves the pending weekend and runs the days off.
    pub fn resolve_weekend(&mut self, choice: WeekendChoice) -> Result<TickReport, CommandError> {
        if self.state.is_over() {
            return Err(CommandError::GameOver);
        }
        if !self.state.clock.weekend_pending {
            return Err(CommandError::NoWeekendPending);
        }
        let daily_hours = self.config.daily_hours;
        let mut ctx = self.ctx();
        match choice {
            WeekendChoice::Rest => {
                change_player_burnout(&mut ctx, damp_burnout_delta(-weekend::REST_RELIEF), "weekend_rest");
                change_team_morale(&mut ctx, weekend::REST_MORALE, "weekend");
            }
            WeekendChoice::CatchUp | WeekendChoice::Crunch => {
                let (days, burnout, morale) = if choice == WeekendChoice::Crunch {
                    (weekend::CRUNCH_DAYS, weekend::CRUNCH_BURNOUT, weekend::CRUNCH_MORALE)
                } else {
                    (weekend::CATCH_UP_DAYS, weekend::CATCH_UP_BURNOUT, weekend::CATCH_UP_MORALE)
                };
                // Each extra day is a full allotment of work.
                for _ in 0..days {
                    ctx.state.team.reset_day_hours(daily_hours);
                    let worked = work_step(&mut ctx, daily_hours);
                    refresh_projects(&mut ctx, &worked);
                }
                change_player_burnout(&mut ctx, burnout, "weekend_work");
                change_team_morale(&mut ctx, morale, "weekend");
            }
        }
        ctx.state.clock.weekend_pending = false;
        log::info!("weekend resolved: {:?}", choice);

        let mut report = TickReport {
            day_ended: true,
            ..Default::default()
        };
        loop {
            report.week_rolled |= self.day_boundary();
            if self.state.is_over() || self.state.awaiting_response() || self.is_workday() {
                break;
            }
        }
        report.displayed = self.state.events.current.clone();
        Ok(report)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state.clock.paused = !self.state.clock.paused;
        self.persist();
        self.state.clock.paused
    }

    /// Puts a member on a project phase.
    pub fn assign_member(&mut self, member_id: &str, project_id: &str, phase: PhaseKind) -> Result<(), CommandError> {
        self.check_open_phase(project_id, phase)?;
        match self.state.team.get(member_id) {
            None => return Err(CommandError::UnknownMember(member_id.to_string())),
            Some(m) if m.has_quit => return Err(CommandError::MemberUnavailable(member_id.to_string())),
            Some(_) => {}
        }
        if self.state.team.assign(member_id, Assignment::new(project_id, phase)) {
            log::info!("assigned {} to {} {}", member_id, project_id, phase.name());
            self.persist();
        }
        Ok(())
    }

    /// Takes a member off one phase, or the whole project with `None`.
    pub fn unassign_member(&mut self, member_id: &str, project_id: &str, phase: Option<PhaseKind>) -> Result<usize, CommandError> {
        if self.state.is_over() {
            return Err(CommandError::GameOver);
        }
        if self.state.team.get(member_id).is_none() {
            return Err(CommandError::UnknownMember(member_id.to_string()));
        }
        let removed = self.state.team.unassign(member_id, project_id, phase);
        if removed > 0 {
            log::info!("unassigned {} from {}", member_id, project_id);
            self.persist();
        }
        Ok(removed)
    }

    /// Hires a freelancer onto one phase. Returns the rolled skill.
    pub fn hire_freelancer(&mut self, project_id: &str, phase: PhaseKind) -> Result<u8, CommandError> {
        self.check_open_phase(project_id, phase)?;
        let cost = self.config.freelancer_cost;
        let hired = self
            .state
            .project(project_id)
            .map_or(false, |p| p.phases.get(phase).freelancer.is_some());
        if hired {
            return Err(CommandError::FreelancerAlreadyHired {
                project: project_id.to_string(),
                phase: phase.name(),
            });
        }
        if self.state.money < cost {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: self.state.money,
            });
        }
        let skill = self
            .rng
            .gen_range(efficiency::FREELANCER_MIN_SKILL..=efficiency::FREELANCER_MAX_SKILL);
        self.state.money -= cost;
        if let Some(p) = self.state.project_mut(project_id) {
            p.phases.get_mut(phase).freelancer = Some(skill);
        }
        log::info!("hired freelancer (skill {}) for {} {}", skill, project_id, phase.name());
        self.ui.notify_success(&format!("Freelancer hired for {} (skill {}).", phase.name(), skill));
        self.ui.play_sound(SoundCue::Success);
        self.persist();
        Ok(skill)
    }

    fn check_open_phase(&self, project_id: &str, phase: PhaseKind) -> Result<(), CommandError> {
        if self.state.is_over() {
            return Err(CommandError::GameOver);
        }
        let project = self
            .state
            .project(project_id)
            .ok_or_else(|| CommandError::UnknownProject(project_id.to_string()))?;
        if project.is_terminal() {
            return Err(CommandError::ProjectClosed(project_id.to_string()));
        }
        if project.phases.get(phase).is_complete() {
            return Err(CommandError::PhaseComplete {
                project: project_id.to_string(),
                phase: phase.name(),
            });
        }
        Ok(())
    }

    /// Takes the rest of the day off: everything pending moves to the
    /// next workday, burnout gets some relief and the day ends.
    pub fn call_in_sick(&mut self) -> Result<TickOutcome, CommandError> {
        if self.state.is_over() {
            return Err(CommandError::GameOver);
        }
        if self.state.clock.weekend_pending {
            return Err(CommandError::WeekendPending);
        }
        let relief = self.config.sick_day_relief;
        let day_hours = self.config.daily_hours;
        let mut ctx = self.ctx();
        defer_all_to_next_workday(&mut ctx);
        change_player_burnout(&mut ctx, damp_burnout_delta(-relief), "sick_day");
        if let Some(id) = ctx.state.team.player_id() {
            ctx.state.team.fall_ill(&id, day_hours);
        }
        ctx.state.stats.sick_days += 1;
        log::info!("player called in sick on {}", ctx.state.clock.today());
        Ok(self.advance_day())
    }

    /// Answers the displayed conversation. The player spends the response
    /// time first; any day boundary it crosses runs after the choice is
    /// applied. The next conversation is looked for straight away.
    pub fn submit_event_choice(&mut self, event_id: &str, choice: usize) -> Option<ResolutionOutcome> {
        if self.state.is_over() || self.state.events.resolving {
            return None;
        }
        if self.state.events.current.as_deref() != Some(event_id) {
            log::debug!("submit ignored: {} is not displayed", event_id);
            return None;
        }
        let valid = crate::systems::events::lookup(&self.state, &self.catalog, event_id)
            .map_or(false, |c| choice < c.choices.len());
        if !valid {
            return None;
        }
        let day_ended = self.advance_by_hours(self.config.event_response_hours);
        let mut ctx = self.ctx();
        let outcome = resolve_choice(&mut ctx, event_id, choice);
        refresh_projects(&mut ctx, &[]);
        check_failure(&mut ctx);
        if day_ended && !self.state.is_over() {
            self.end_of_workday();
        }
        if !self.state.is_over() && !self.state.clock.weekend_pending {
            let mut ctx = self.ctx();
            scan(&mut ctx, true);
        }
        self.persist();
        outcome
    }

    pub fn defer_event(&mut self, event_id: &str) -> bool {
        let mut ctx = self.ctx();
        let deferred = defer(&mut ctx, event_id);
        if deferred {
            self.persist();
        }
        deferred
    }

    pub fn auto_assign(&mut self) -> Vec<(String, Assignment)> {
        if self.state.is_over() {
            return Vec::new();
        }
        let mut ctx = self.ctx();
        let made = auto_assign(&mut ctx);
        if !made.is_empty() {
            self.persist();
        }
        made
    }

    /// The displayed conversation, names filled in.
    pub fn current_event(&self) -> Option<RenderedEvent> {
        let id = self.state.events.current.as_deref()?;
        render_event(&self.state, &self.catalog, id)
    }

    pub fn final_report(&self) -> FinalReport {
        final_report(&self.state, &self.config)
    }

    /// Ticks until the clock holds or `max_ticks` run out. Returns the
    /// number of ticks that advanced.
    pub fn run_until_hold(&mut self, max_ticks: usize) -> usize {
        let mut n = 0;
        while n < max_ticks && self.tick().advanced() {
            n += 1;
        }
        n
    }
}

/// Week rollover: payroll, pacing and milestones, and the end of the
/// campaign.
fn weekly_rollover(ctx: &mut SimContext) {
    let payroll = ctx.state.weekly_payroll() + ctx.config.weekly_overhead;
    ctx.state.money -= payroll;
    let week = ctx.state.clock.week;
    ctx.state.phase = GamePhase::for_week(week);
    log::info!("week {} begins: payroll ${}, balance ${}", week, payroll, ctx.state.money);
    ctx.ui.notify_warning(&format!("Payroll and overhead: ${}.", payroll));

    let finished = week - 1;
    if finished > 0 && finished % 4 == 0 && finished <= ctx.config.campaign_weeks {
        ctx.key_moment(KeyMomentKind::Milestone, format!("Made it through week {}", finished));
    }
    if week > ctx.config.campaign_weeks {
        evaluate_victory(ctx);
    }
}
