//! End-to-end behaviour of the engine and its systems.

use agency_core::catalog::{
    Catalog, Choice, Consequence, Conversation, ConversationCatalog, ProjectTemplate, Schedule, ScopeChange, Urgency,
};
use agency_core::components::{Assignment, GameState, PhaseMap, Project, Team, TeamMember};
use agency_core::context::SimContext;
use agency_core::engine::{CommandError, HoldReason, SimulationEngine, TickOutcome, WeekendChoice};
use agency_core::generation::{create_from_template, ProjectOverrides};
use agency_core::ports::{Headless, MemoryStore};
use agency_core::systems::consequences::{add_project, resolve_choice, ResolutionOutcome};
use agency_core::systems::events::{defer, display, restore_due_deferrals, scan};
use agency_core::systems::projects::{complete_project, daily_deadlines, handle_scope_creep};
use agency_core::systems::work::{phase_efficiencies, work_step};
use agency_logic::config::SimConfig;
use agency_logic::efficiency::{PhaseKind, PhaseStatus, Role};
use agency_logic::satisfaction::{derive_project_status, ClientProfile, ProjectStatus};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// State, data and randomness for driving systems directly.
struct Harness {
    state: GameState,
    catalog: Catalog,
    config: SimConfig,
    rng: ChaCha8Rng,
    ui: Headless,
}

impl Harness {
    fn new(state: GameState, catalog: Catalog) -> Self {
        Self {
            state,
            catalog,
            config: SimConfig::default(),
            rng: ChaCha8Rng::seed_from_u64(42),
            ui: Headless,
        }
    }

    fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            state: &mut self.state,
            catalog: &self.catalog,
            config: &self.config,
            rng: &mut self.rng,
            ui: &mut self.ui,
        }
    }
}

fn conversation(id: &str, schedule: Schedule, consequence: Consequence) -> Conversation {
    Conversation {
        id: id.into(),
        title: id.into(),
        body: String::new(),
        speaker: None,
        schedule,
        trigger: None,
        chance: 1.0,
        urgency: Urgency::Normal,
        response_deadline_hours: None,
        linked_project: None,
        phases: Vec::new(),
        repeatable: false,
        choices: vec![Choice {
            label: "ok".into(),
            summary: String::new(),
            consequence,
        }],
    }
}

fn catalog_with(conversations: Vec<Conversation>) -> Catalog {
    Catalog {
        conversations: ConversationCatalog {
            schema_version: 1,
            conversations,
        },
        ..Default::default()
    }
}

/// Builtin roster and projects, no conversations.
fn quiet_catalog() -> Catalog {
    let mut catalog = Catalog::builtin();
    catalog.conversations.conversations.clear();
    catalog
}

fn small_team() -> Team {
    Team::new(vec![
        TeamMember::new("you", "You", Role::Lead, 3, 40.0),
        TeamMember::new("sarah", "Sarah", Role::Designer, 5, 40.0),
    ])
}

/// A project whose management phase is done and whose design phase is
/// ready for work.
fn design_ready(id: &str) -> Project {
    let mut p = Project {
        id: id.into(),
        phases: PhaseMap::from_hours(|k| k.hours_multiplier()),
        ..Default::default()
    };
    p.phases.management.progress = 1.0;
    p.phases.management.status = PhaseStatus::Complete;
    p.phases.design.status = PhaseStatus::Ready;
    p
}

/// Plays with a fixed policy: first choice, rest on weekends, auto-assign
/// after each day. Calls `check` after every step.
fn play(engine: &mut SimulationEngine, max_steps: usize, mut check: impl FnMut(&SimulationEngine)) {
    for _ in 0..max_steps {
        match engine.advance_day() {
            TickOutcome::Held(HoldReason::GameOver) => return,
            TickOutcome::Held(HoldReason::AwaitingResponse) => {
                let id = engine.state.events.current.clone().unwrap();
                assert!(engine.submit_event_choice(&id, 0).is_some(), "choice on {} rejected", id);
            }
            TickOutcome::Held(HoldReason::WeekendChoice) => {
                engine.resolve_weekend(WeekendChoice::Rest).unwrap();
            }
            TickOutcome::Held(HoldReason::Paused) => unreachable!("advance_day ignores pause"),
            TickOutcome::Advanced(_) => {
                engine.auto_assign();
            }
        }
        check(engine);
    }
}

#[test]
fn test_complexity_one_project_hours_and_schedule() {
    let template = ProjectTemplate {
        id: "tiny".into(),
        name: "Tiny".into(),
        client: "Client".into(),
        complexity: 1,
        budget: 5_000,
        weeks: None,
        client_profile: ClientProfile::default(),
    };
    let p = create_from_template(&template, &ProjectOverrides::default());
    let hours: Vec<f64> = p.phases.iter().map(|ph| ph.hours_required).collect();
    assert_eq!(hours, vec![3.0, 4.0, 5.0, 3.0]);
    assert_eq!(p.estimated_hours(), 15.0);
    assert_eq!(p.total_weeks, 2.0);
    assert_eq!(p.phases.management.status, PhaseStatus::Ready);
    assert_eq!(p.phases.design.status, PhaseStatus::Waiting);
}

#[test]
fn test_one_hour_of_design_work_is_reproducible() {
    let mut team = small_team();
    team.get_mut("sarah").unwrap().morale = 100.0;
    team.assign("sarah", Assignment::new("p1", PhaseKind::Design));
    let state = GameState {
        projects: vec![design_ready("p1")],
        team,
        ..Default::default()
    };
    let mut h = Harness::new(state, Catalog::default());
    let tick = h.config.tick_hours;
    let ticks = (1.0 / tick).round() as usize;
    for _ in 0..ticks {
        work_step(&mut h.ctx(), tick);
    }
    // match 1.0 × skill 5/5 × morale 1.0 × split 1.0 × design 0.20/day over 1h of a 9h day
    let expected = 0.20 / h.config.workday_hours();
    let got = h.state.project("p1").unwrap().phases.design.progress;
    assert!((got - expected).abs() < 1e-9, "got {}, expected {}", got, expected);
    assert!((h.state.team.get("sarah").unwrap().hours() - 39.0).abs() < 1e-9);
}

#[test]
fn test_overdue_unhappy_project_is_in_crisis() {
    assert_eq!(derive_project_status(2.0, 15.0, -0.5, 25.0, 0.13), ProjectStatus::Crisis);
}

#[test]
fn test_burnout_relief_is_damped() {
    let mut state = GameState {
        team: small_team(),
        ..Default::default()
    };
    state.team.adjust_burnout("you", 50.0, "setup");
    state.events.current = Some("rest".into());
    let rest = conversation(
        "rest",
        Schedule::Conditional,
        Consequence {
            player_burnout: -10.0,
            ..Default::default()
        },
    );
    let mut h = Harness::new(state, catalog_with(vec![rest]));
    let outcome = resolve_choice(&mut h.ctx(), "rest", 0);
    assert!(outcome.is_some());
    let burnout = h.state.team.player().unwrap().burnout();
    assert!((burnout - 44.0).abs() < 1e-9, "burnout {}", burnout);
    assert!(h.state.events.current.is_none());
    assert!(h.state.events.resolved.contains("rest"));

    // A second submit of the same choice is a no-op.
    assert!(resolve_choice(&mut h.ctx(), "rest", 0).is_none());
    assert!((h.state.team.player().unwrap().burnout() - 44.0).abs() < 1e-9);
}

#[test]
fn test_simultaneous_events_display_one_and_queue_the_other() {
    let today = Schedule::Fixed { week: 1, day: 1 };
    let catalog = catalog_with(vec![
        conversation("first", today, Consequence::default()),
        conversation("second", today, Consequence::default()),
    ]);
    let state = GameState {
        team: small_team(),
        ..Default::default()
    };
    let mut h = Harness::new(state, catalog);

    let shown = scan(&mut h.ctx(), false).expect("one conversation shown");
    assert_eq!(h.state.events.current.as_deref(), Some(shown.as_str()));
    assert_eq!(h.state.events.queue.len(), 1);
    let other = h.state.events.queue[0].clone();
    assert_ne!(other, shown);

    resolve_choice(&mut h.ctx(), &shown, 0).unwrap();
    let next = scan(&mut h.ctx(), false);
    assert_eq!(next.as_deref(), Some(other.as_str()));
    assert!(h.state.events.queue.is_empty());
}

#[test]
fn test_split_member_contributes_half_to_each_phase() {
    let mut team = small_team();
    team.assign("sarah", Assignment::new("p1", PhaseKind::Design));
    let single = GameState {
        projects: vec![design_ready("p1"), design_ready("p2")],
        team: team.clone(),
        ..Default::default()
    };
    let (alone, _) = phase_efficiencies(&single, 0.1);
    let full = alone[&("p1".to_string(), PhaseKind::Design)];

    team.assign("sarah", Assignment::new("p2", PhaseKind::Design));
    let split = GameState {
        projects: vec![design_ready("p1"), design_ready("p2")],
        team,
        ..Default::default()
    };
    let (shared, _) = phase_efficiencies(&split, 0.1);
    for id in ["p1", "p2"] {
        let eff = shared[&(id.to_string(), PhaseKind::Design)];
        assert!((eff - full * 0.5).abs() < 1e-12);
    }

    let mut h = Harness::new(split, Catalog::default());
    let before = h.state.team.get("sarah").unwrap().hours();
    let tick = h.config.tick_hours;
    work_step(&mut h.ctx(), tick);
    let spent = before - h.state.team.get("sarah").unwrap().hours();
    assert!((spent - tick).abs() < 1e-12);
}

#[test]
fn test_complete_project_is_idempotent() {
    let mut team = small_team();
    team.assign("sarah", Assignment::new("p1", PhaseKind::Review));
    let mut project = design_ready("p1");
    project.budget = 10_000;
    for kind in PhaseKind::ALL {
        let ph = project.phases.get_mut(kind);
        ph.progress = 1.0;
        ph.status = PhaseStatus::Complete;
    }
    let state = GameState {
        projects: vec![project],
        team,
        money: 1_000,
        ..Default::default()
    };
    let mut h = Harness::new(state, Catalog::default());

    let paid = complete_project(&mut h.ctx(), "p1").expect("first completion pays");
    assert!(paid > 0);
    let money = h.state.money;
    let completed = h.state.stats.projects_completed;
    assert_eq!(completed, 1);
    assert!(!h.state.team.get("sarah").unwrap().is_assigned());

    assert_eq!(complete_project(&mut h.ctx(), "p1"), None);
    assert_eq!(h.state.money, money);
    assert_eq!(h.state.stats.projects_completed, completed);
}

#[test]
fn test_unfinished_project_cannot_complete() {
    let state = GameState {
        projects: vec![design_ready("p1")],
        team: small_team(),
        ..Default::default()
    };
    let mut h = Harness::new(state, Catalog::default());
    assert_eq!(complete_project(&mut h.ctx(), "p1"), None);
    assert_eq!(h.state.stats.projects_completed, 0);
}

#[test]
fn test_new_game_from_builtin_catalog() {
    let engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(1);
    let s = &engine.state;
    assert_eq!((s.clock.week, s.clock.day, s.clock.hour), (1, 1, 9));
    assert_eq!(s.money, SimConfig::default().starting_money);
    assert_eq!(s.projects.len(), 2);
    assert!(s.team.player().is_some());
    assert!(s.team.staff().count() >= 4);
}

#[test]
fn test_tick_holds_while_a_conversation_waits() {
    let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(3);
    let shown = match engine.tick() {
        TickOutcome::Advanced(report) => report.displayed,
        other => panic!("unexpected {:?}", other),
    };
    let id = shown.expect("a week 1 conversation is eligible on the first tick");
    assert!(engine.current_event().is_some());

    let clock = engine.state.clock.clone();
    assert_eq!(engine.tick(), TickOutcome::Held(HoldReason::AwaitingResponse));
    assert_eq!(engine.state.clock, clock);

    assert!(engine.submit_event_choice(&id, 99).is_none());
    assert!(engine.submit_event_choice(&id, 0).is_some());
    assert!(engine.state.events.resolved.contains(&id));
}

#[test]
fn test_pause_holds_ticks() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(3);
    assert!(engine.toggle_pause());
    assert_eq!(engine.tick(), TickOutcome::Held(HoldReason::Paused));
    assert!(!engine.toggle_pause());
    assert!(engine.tick().advanced());
}

#[test]
fn test_weekend_choice_gates_the_week() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(5);
    assert_eq!(engine.resolve_weekend(WeekendChoice::Rest), Err(CommandError::NoWeekendPending));

    let mut steps = 0;
    while !engine.state.clock.weekend_pending && steps < 50 {
        if let Some(id) = engine.state.events.current.clone() {
            engine.submit_event_choice(&id, 0);
        } else {
            engine.advance_day();
        }
        steps += 1;
    }
    assert!(engine.state.clock.weekend_pending);
    assert_eq!(engine.state.clock.day, engine.config.last_workday);
    assert_eq!(engine.advance_day(), TickOutcome::Held(HoldReason::WeekendChoice));
    assert_eq!(engine.call_in_sick().unwrap_err(), CommandError::WeekendPending);

    engine.resolve_weekend(WeekendChoice::Crunch).unwrap();
    assert!(!engine.state.clock.weekend_pending);
    let mut steps = 0;
    while engine.state.clock.week < 2 && steps < 20 {
        if let Some(id) = engine.state.events.current.clone() {
            engine.submit_event_choice(&id, 0);
        } else {
            engine.advance_day();
        }
        steps += 1;
    }
    assert_eq!(engine.state.clock.week, 2);
    assert!(engine.state.events.dynamic.contains_key("team_pulse_w1"));
}

#[test]
fn test_freelancer_rules() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(9);
    let project = engine.state.projects[0].id.clone();
    let money = engine.state.money;

    let skill = engine.hire_freelancer(&project, PhaseKind::Management).unwrap();
    assert!((3..=5).contains(&skill));
    assert_eq!(engine.state.money, money - engine.config.freelancer_cost);
    assert!(matches!(
        engine.hire_freelancer(&project, PhaseKind::Management),
        Err(CommandError::FreelancerAlreadyHired { .. })
    ));
    assert_eq!(
        engine.hire_freelancer("nope", PhaseKind::Design),
        Err(CommandError::UnknownProject("nope".into()))
    );

    engine.state.money = 10;
    assert!(matches!(
        engine.hire_freelancer(&project, PhaseKind::Design),
        Err(CommandError::InsufficientFunds { available: 10, .. })
    ));
}

#[test]
fn test_assignment_commands() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(9);
    let project = engine.state.projects[0].id.clone();
    let member = engine.state.team.staff().next().unwrap().id.clone();

    engine.assign_member(&member, &project, PhaseKind::Management).unwrap();
    assert!(engine.state.team.get(&member).unwrap().is_assigned_to(&project, PhaseKind::Management));
    assert_eq!(
        engine.assign_member("ghost", &project, PhaseKind::Management),
        Err(CommandError::UnknownMember("ghost".into()))
    );

    engine.state.project_mut(&project).unwrap().phases.design.status = PhaseStatus::Complete;
    assert!(matches!(
        engine.assign_member(&member, &project, PhaseKind::Design),
        Err(CommandError::PhaseComplete { .. })
    ));

    assert_eq!(engine.unassign_member(&member, &project, None), Ok(1));
    assert!(!engine.state.team.get(&member).unwrap().is_assigned());
}

#[test]
fn test_call_in_sick_moves_conversations_and_ends_the_day() {
    let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(3);
    engine.tick();
    let id = engine.state.events.current.clone().expect("conversation on screen");

    engine.call_in_sick().unwrap();
    assert_eq!(engine.state.stats.sick_days, 1);
    assert_eq!(engine.state.clock.day, 2);
    // Tomorrow is the next workday, so the conversation is back already.
    assert!(engine.state.events.is_pending(&id) || engine.state.events.resolved.contains(&id));
}

#[test]
fn test_defer_unknown_event_is_a_no_op() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(3);
    assert!(!engine.defer_event("nothing"));
    assert!(engine.state.events.deferred.is_empty());
}

#[test]
fn test_snapshot_round_trip_continues_identically() {
    let mut original = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(11);
    play(&mut original, 12, |_| {});

    let json = original.snapshot().unwrap();
    let mut restored = SimulationEngine::new(Catalog::builtin(), SimConfig::default());
    restored.load_snapshot(&json).unwrap();

    let a = &original.state;
    let b = &restored.state;
    assert_eq!(a.money, b.money);
    assert_eq!((a.clock.week, a.clock.day), (b.clock.week, b.clock.day));
    for (pa, pb) in a.projects.iter().zip(&b.projects) {
        assert!((pa.progress() - pb.progress()).abs() < 1e-9);
    }
    for (ma, mb) in a.team.members.iter().zip(&b.team.members) {
        assert!((ma.morale - mb.morale).abs() < 1e-9);
        assert!((ma.burnout() - mb.burnout()).abs() < 1e-9);
    }

    original.reseed(99);
    restored.reseed(99);
    play(&mut original, 8, |_| {});
    play(&mut restored, 8, |_| {});
    assert_eq!(original.state.money, restored.state.money);
    assert_eq!(original.state.clock, restored.state.clock);
    assert_eq!(original.state.events.resolved, restored.state.events.resolved);
    for (pa, pb) in original.state.projects.iter().zip(&restored.state.projects) {
        assert_eq!(pa.id, pb.id);
        assert!((pa.progress() - pb.progress()).abs() < 1e-6);
    }
}

#[test]
fn test_restore_from_store() {
    let store = MemoryStore::new();
    let mut first = SimulationEngine::new(Catalog::builtin(), SimConfig::default())
        .with_seed(2)
        .with_store(store.clone());
    play(&mut first, 5, |_| {});
    assert!(store.writes() > 0);

    let mut second = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_store(store.clone());
    assert!(second.restore());
    assert_eq!(second.state.money, first.state.money);
    assert_eq!(second.state.clock, first.state.clock);
}

#[test]
fn test_unreadable_snapshot_starts_fresh() {
    let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default())
        .with_store(MemoryStore::with_json("{ not json"));
    engine.state.money = 1;
    assert!(!engine.restore());
    assert_eq!(engine.state.money, engine.config.starting_money);
}

#[test]
fn test_full_campaign_keeps_invariants() {
    let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(2024);
    play(&mut engine, 2_000, |e| {
        for m in e.state.team.members.iter().filter(|m| !m.is_player) {
            assert!(m.hours() >= 0.0, "{} has {} hours", m.id, m.hours());
        }
        for p in &e.state.projects {
            let weighted: f64 = p.phases.iter().map(|ph| ph.progress * ph.hours_required).sum();
            let total: f64 = p.phases.iter().map(|ph| ph.hours_required).sum();
            if total > 0.0 {
                assert!((p.progress() - weighted / total).abs() < 1e-9);
            }
            for ph in p.phases.iter() {
                assert!((0.0..=1.0).contains(&ph.progress));
            }
        }
    });
    assert!(engine.state.is_over(), "campaign did not finish");
    let report = engine.final_report();
    assert_eq!(report.outcome, engine.state.game_over);

    // Every burnout change went through the audited operation.
    for m in &engine.state.team.members {
        let applied: f64 = engine
            .state
            .team
            .burnout_audit()
            .iter()
            .filter(|a| a.member_id == m.id)
            .map(|a| a.applied)
            .sum();
        assert!((applied - m.burnout()).abs() < 1e-6, "{}: audit {} vs {}", m.id, applied, m.burnout());
    }
}

#[test]
fn test_phases_open_in_order() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(8);
    engine.auto_assign();
    for _ in 0..6_000 {
        match engine.tick() {
            TickOutcome::Held(HoldReason::GameOver) => break,
            TickOutcome::Held(HoldReason::AwaitingResponse) => {
                let id = engine.state.events.current.clone().unwrap();
                engine.submit_event_choice(&id, 0);
            }
            TickOutcome::Held(HoldReason::WeekendChoice) => {
                engine.resolve_weekend(WeekendChoice::Rest).unwrap();
                engine.auto_assign();
            }
            TickOutcome::Held(HoldReason::Paused) => unreachable!(),
            TickOutcome::Advanced(_) => {}
        }
        for p in &engine.state.projects {
            for kind in [PhaseKind::Design, PhaseKind::Development, PhaseKind::Review] {
                let phase = p.phases.get(kind);
                if phase.status == PhaseStatus::Waiting {
                    assert_eq!(phase.progress, 0.0, "{} {} worked while waiting", p.id, kind.name());
                    continue;
                }
                let pred = p.phases.get(kind.predecessor().unwrap());
                assert!(
                    pred.progress + 1e-9 >= kind.activation_threshold(),
                    "{} {} opened with predecessor at {}",
                    p.id,
                    kind.name(),
                    pred.progress
                );
            }
        }
    }
}

#[test]
fn test_waiting_phases_stay_untouched_with_conversations() {
    let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(8);
    engine.auto_assign();
    play(&mut engine, 60, |e| {
        for p in &e.state.projects {
            for ph in p.phases.iter().filter(|ph| ph.status == PhaseStatus::Waiting) {
                assert_eq!(ph.progress, 0.0, "{} {} worked while waiting", p.id, ph.kind.name());
            }
        }
    });
}

#[test]
fn test_progress_bonus_for_a_waiting_phase_lands_on_the_current_one() {
    let catalog = Catalog::builtin();
    let template = catalog.project_template("fintech-landing").unwrap();
    let project = create_from_template(template, &ProjectOverrides::default());
    let state = GameState {
        projects: vec![project],
        team: small_team(),
        ..Default::default()
    };
    let mut h = Harness::new(state, catalog);
    display(&mut h.ctx(), "tool_budget");
    resolve_choice(&mut h.ctx(), "tool_budget", 0).unwrap();

    let p = h.state.project("fintech-landing").unwrap();
    assert_eq!(p.phases.development.status, PhaseStatus::Waiting);
    assert_eq!(p.phases.development.progress, 0.0);
    assert!((p.phases.management.progress - 0.05).abs() < 1e-9);
}

#[test]
fn test_catch_up_weekend_moves_projects_forward() {
    let mut engine = SimulationEngine::new(quiet_catalog(), SimConfig::default()).with_seed(5);
    engine.auto_assign();
    let mut steps = 0;
    while !engine.state.clock.weekend_pending && steps < 20 {
        if let Some(id) = engine.state.events.current.clone() {
            engine.submit_event_choice(&id, 0);
        } else {
            engine.advance_day();
            engine.auto_assign();
        }
        steps += 1;
    }
    assert!(engine.state.clock.weekend_pending);
    let done = |e: &SimulationEngine| e.state.projects.iter().map(|p| p.hours_completed()).sum::<f64>();
    let before = done(&engine);

    engine.resolve_weekend(WeekendChoice::CatchUp).unwrap();
    let after = done(&engine);
    assert!(after > before + 1e-6, "catch-up did no work: {} -> {}", before, after);
}

#[test]
fn test_extreme_burnout_rolls_a_penalty() {
    let mut state = GameState {
        team: small_team(),
        money: 10_000,
        ..Default::default()
    };
    state.team.adjust_burnout("you", 92.0, "setup");
    state.events.current = Some("late".into());
    let mut h = Harness::new(state, catalog_with(vec![conversation("late", Schedule::Conditional, Consequence::default())]));
    h.config.extreme_burnout_penalty_chance = 1.0;

    let outcome = resolve_choice(&mut h.ctx(), "late", 0).unwrap();
    let roll = outcome.rolls.iter().find(|r| r.effect == "extreme_burnout").unwrap();
    assert!(roll.success);
    assert_eq!(roll.chance, 1.0);
    // Exactly one of the three fallouts landed.
    let snapped = h.state.team.get("sarah").unwrap().morale < 70.0;
    let mistake = h.state.money < 10_000;
    let spiral = h.state.team.player().unwrap().burnout() > 92.0;
    assert_eq!([snapped, mistake, spiral].iter().filter(|b| **b).count(), 1);
}

#[test]
fn test_extreme_burnout_needs_the_threshold() {
    let mut state = GameState {
        team: small_team(),
        ..Default::default()
    };
    state.team.adjust_burnout("you", 85.0, "setup");
    state.events.current = Some("late".into());
    let mut h = Harness::new(state, catalog_with(vec![conversation("late", Schedule::Conditional, Consequence::default())]));
    h.config.extreme_burnout_penalty_chance = 1.0;

    let outcome = resolve_choice(&mut h.ctx(), "late", 0).unwrap();
    assert!(outcome.rolls.iter().all(|r| r.effect != "extreme_burnout"));
}

#[test]
fn test_repeated_scope_creep_hurts_morale_more_up_to_a_cap() {
    let mut team = small_team();
    team.assign("sarah", Assignment::new("p1", PhaseKind::Design));
    let state = GameState {
        projects: vec![design_ready("p1")],
        team,
        ..Default::default()
    };
    let mut h = Harness::new(state, Catalog::default());
    let change = ScopeChange {
        project: "p1".into(),
        hours: 1.0,
        ..Default::default()
    };
    let mut drops = Vec::new();
    for _ in 0..7 {
        let before = h.state.team.get("sarah").unwrap().morale;
        assert!(handle_scope_creep(&mut h.ctx(), "p1", &change));
        drops.push(before - h.state.team.get("sarah").unwrap().morale);
    }
    let expected = [0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 15.0];
    for (got, want) in drops.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "drops {:?}", drops);
    }
    // The lead is never docked.
    assert_eq!(h.state.team.player().unwrap().morale, 70.0);
    assert_eq!(h.state.project("p1").unwrap().scope_creep_count, 7);
}

#[test]
fn test_overdue_project_is_hit_once_then_cut_then_failed() {
    let mut team = small_team();
    team.assign("sarah", Assignment::new("p1", PhaseKind::Design));
    let mut project = design_ready("p1");
    project.budget = 10_000;
    project.total_weeks = 2.0;
    project.weeks_remaining = 0.0;
    let state = GameState {
        projects: vec![project],
        team,
        ..Default::default()
    };
    let mut h = Harness::new(state, Catalog::default());
    let start_hour = h.config.workday_start_hour;
    let day = |h: &mut Harness| {
        daily_deadlines(&mut h.ctx());
        h.state.clock.roll_day(start_hour);
    };

    day(&mut h);
    let p = h.state.project("p1").unwrap();
    assert_eq!(p.status, ProjectStatus::Crisis);
    assert!(p.crisis_penalty_applied);
    assert_eq!(h.state.stats.deadlines_missed, 1);
    assert_eq!(h.state.team.get("sarah").unwrap().morale, 65.0);

    // Ten days late: still in crisis, no second hit, no cut yet.
    for _ in 0..9 {
        day(&mut h);
    }
    assert_eq!(h.state.team.get("sarah").unwrap().morale, 65.0);
    assert_eq!(h.state.project("p1").unwrap().budget, 10_000);

    // Past two weeks late the client cuts budget and scope once.
    let hours_before = h.state.project("p1").unwrap().estimated_hours();
    for _ in 0..7 {
        day(&mut h);
    }
    let p = h.state.project("p1").unwrap();
    assert!(p.weeks_late() > 2.0);
    assert!(p.deadline_cut_applied);
    assert_eq!(p.budget, 7_000);
    assert!(p.estimated_hours() < hours_before);
    assert_eq!(p.status, ProjectStatus::Crisis);

    // Past four weeks late the project fails.
    for _ in 0..14 {
        day(&mut h);
    }
    let p = h.state.project("p1").unwrap();
    assert_eq!(p.status, ProjectStatus::Cancelled);
    assert!(p.failed);
    assert_eq!(p.budget, 7_000);
    assert_eq!(h.state.stats.projects_failed, 1);
    assert_eq!(h.state.stats.deadlines_missed, 1);
    assert!(!h.state.team.get("sarah").unwrap().is_assigned());
}

#[test]
fn test_deferred_conversation_returns_the_next_day() {
    let catalog = catalog_with(vec![conversation("later", Schedule::Conditional, Consequence::default())]);
    let state = GameState {
        team: small_team(),
        ..Default::default()
    };
    let mut h = Harness::new(state, catalog);
    display(&mut h.ctx(), "later");

    assert!(defer(&mut h.ctx(), "later"));
    assert!(h.state.events.current.is_none());
    assert!(h.state.events.deferred.contains_key("later"));

    // Not due yet.
    restore_due_deferrals(&mut h.ctx());
    assert!(!h.state.events.is_pending("later"));

    let start_hour = h.config.workday_start_hour;
    h.state.clock.roll_day(start_hour);
    restore_due_deferrals(&mut h.ctx());
    assert!(h.state.events.deferred.is_empty());
    assert_eq!(h.state.events.queue.front().map(String::as_str), Some("later"));
}

#[test]
fn test_poor_track_record_cuts_new_project_budgets() {
    let catalog = Catalog::builtin();
    let full = catalog.project_template("fintech-landing").unwrap().budget;
    let mut h = Harness::new(GameState::default(), catalog);

    let mut out = ResolutionOutcome::default();
    let id = add_project(&mut h.ctx(), "fintech-landing", None, None, &mut out).unwrap();
    assert_eq!(h.state.project(&id).unwrap().budget, full);

    h.state.stats.deadlines_missed = 3;
    h.state.stats.on_time_deliveries = 1;
    let id = add_project(&mut h.ctx(), "fintech-landing", None, None, &mut out).unwrap();
    let p = h.state.project(&id).unwrap();
    assert_eq!(p.budget, (full as f64 * 0.5).round() as i64);
    assert_eq!(out.messages.len(), 2);
    assert!(out.messages[1].contains("track record"));
}
