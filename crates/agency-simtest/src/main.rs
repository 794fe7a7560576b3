//! Agency Headless Simulation Harness
//!
//! Validates the bundled catalogs and the pure balance math, then plays
//! complete campaigns under scripted policies and checks the engine's
//! invariants along the way. No rendering, no storage.
//!
//! Usage:
//!   cargo run -p agency-simtest
//!   cargo run -p agency-simtest -- --verbose

use std::collections::BTreeMap;

use agency_core::catalog::{Catalog, Schedule, Trigger, LINKED_PLACEHOLDER, MEMBER_PLACEHOLDER};
use agency_core::components::GameOutcome;
use agency_core::engine::{HoldReason, SimulationEngine, TickOutcome, WeekendChoice};
use agency_core::persistence;
use agency_logic::config::SimConfig;
use agency_logic::efficiency::{can_activate, role_efficiency, PhaseKind, Role};
use agency_logic::satisfaction::{derive_project_status, feedback_band, FeedbackBand, ProjectStatus};
use agency_logic::scoring::{classify_victory, completion_payment, CareerSummary, VictoryTier};
use agency_logic::wellbeing::damp_burnout_delta;
use log::LevelFilter;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    if verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Info)
            .format_timestamp(None)
            .parse_default_env()
            .init();
    }
    println!("=== Agency Simulation Harness ===\n");

    let catalog = Catalog::builtin();
    let mut results = Vec::new();

    // 1. Catalog validation
    results.extend(validate_catalogs(&catalog));

    // 2. Balance math
    results.extend(validate_balance_math());

    // 3. Full campaigns
    results.extend(validate_campaigns(&catalog, verbose));

    // 4. Snapshots
    results.extend(validate_snapshots(&catalog));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalogs ─────────────────────────────────────────────────────────

fn validate_catalogs(catalog: &Catalog) -> Vec<TestResult> {
    println!("--- Catalogs ---");
    let mut results = Vec::new();
    let conversations = &catalog.conversations.conversations;

    results.push(TestResult::new(
        "catalog_sections_loaded",
        !conversations.is_empty() && !catalog.roster.members.is_empty() && !catalog.projects.templates.is_empty(),
        format!(
            "{} conversations, {} members, {} templates",
            conversations.len(),
            catalog.roster.members.len(),
            catalog.projects.templates.len()
        ),
    ));

    let leads = catalog.roster.members.iter().filter(|m| m.role == Role::Lead).count();
    results.push(TestResult::new("roster_single_lead", leads == 1, format!("{} lead(s)", leads)));

    // Every template reference in a consequence must resolve.
    let mut dangling = Vec::new();
    for conv in conversations {
        for choice in &conv.choices {
            let c = &choice.consequence;
            if let Some(np) = &c.new_project {
                if catalog.project_template(&np.template).is_none() {
                    dangling.push(format!("{} -> template {}", conv.id, np.template));
                }
            }
            let follow_ups = c
                .spawn_events
                .iter()
                .chain(c.future_opportunity.as_ref().map(|o| &o.event));
            for id in follow_ups {
                if catalog.conversation(id).is_none() {
                    dangling.push(format!("{} -> conversation {}", conv.id, id));
                }
            }
        }
    }
    results.push(TestResult::new(
        "consequence_references_resolve",
        dangling.is_empty(),
        if dangling.is_empty() {
            "all template and follow-up ids exist".to_string()
        } else {
            dangling.join(", ")
        },
    ));

    // Conditional conversations either have a trigger or are reachable
    // as a follow-up.
    let follow_up_ids: Vec<&str> = conversations
        .iter()
        .flat_map(|c| c.choices.iter())
        .flat_map(|ch| {
            ch.consequence
                .spawn_events
                .iter()
                .map(String::as_str)
                .chain(ch.consequence.future_opportunity.as_ref().map(|o| o.event.as_str()))
        })
        .collect();
    let unreachable: Vec<&str> = conversations
        .iter()
        .filter(|c| c.schedule == Schedule::Conditional && c.trigger.is_none())
        .map(|c| c.id.as_str())
        .filter(|id| !follow_up_ids.contains(id))
        .collect();
    results.push(TestResult::new(
        "conditional_conversations_reachable",
        unreachable.is_empty(),
        format!("{} unreachable {:?}", unreachable.len(), unreachable),
    ));

    // {{MEMBER}} is only meaningful when something can bind a member.
    let unbound: Vec<&str> = conversations
        .iter()
        .filter(|c| c.choices.iter().any(|ch| ch.consequence.has_placeholders()))
        .filter(|c| {
            let json = serde_json::to_string(&c.choices).unwrap_or_default();
            json.contains(MEMBER_PLACEHOLDER)
                && !matches!(
                    c.trigger,
                    Some(Trigger::MoraleCrossed { .. }) | Some(Trigger::RoleCheckIn { .. })
                )
        })
        .map(|c| c.id.as_str())
        .collect();
    results.push(TestResult::new(
        "member_placeholders_bound",
        unbound.is_empty(),
        format!("{} conversations rely on the fallback member {:?}", unbound.len(), unbound),
    ));

    let linked = conversations
        .iter()
        .filter(|c| serde_json::to_string(&c.choices).map_or(false, |s| s.contains(LINKED_PLACEHOLDER)))
        .count();
    results.push(TestResult::new(
        "linked_placeholders_counted",
        true,
        format!("{} conversations use {}", linked, LINKED_PLACEHOLDER),
    ));

    let mut per_week: BTreeMap<u32, usize> = BTreeMap::new();
    for conv in conversations {
        if let Schedule::Fixed { week, .. } = conv.schedule {
            *per_week.entry(week).or_insert(0) += 1;
        }
    }
    let crowded: Vec<_> = per_week.iter().filter(|(_, n)| **n > 3).collect();
    results.push(TestResult::new(
        "fixed_schedule_spread",
        crowded.is_empty(),
        format!("fixed conversations per week: {:?}", per_week),
    ));

    results
}

// ── 2. Balance math ─────────────────────────────────────────────────────

fn validate_balance_math() -> Vec<TestResult> {
    println!("--- Balance Math ---");
    let mut results = Vec::new();

    let matches = [
        (Role::Designer, PhaseKind::Design),
        (Role::Developer, PhaseKind::Development),
        (Role::Manager, PhaseKind::Management),
        (Role::Manager, PhaseKind::Review),
    ];
    let all_match = matches.iter().all(|(r, p)| role_efficiency(*r, *p) == 1.0);
    results.push(TestResult::new("role_matches_full_efficiency", all_match, "home phases at 1.0"));

    let gates = [
        (PhaseKind::Design, 0.59, false),
        (PhaseKind::Design, 0.6, true),
        (PhaseKind::Development, 0.79, false),
        (PhaseKind::Development, 0.8, true),
        (PhaseKind::Review, 0.99, false),
        (PhaseKind::Review, 1.0, true),
    ];
    let bad_gates: Vec<_> = gates
        .iter()
        .filter(|(kind, pred, expect)| can_activate(*kind, Some(*pred)) != *expect)
        .collect();
    results.push(TestResult::new(
        "phase_activation_gates",
        bad_gates.is_empty(),
        format!("{} gate mismatches", bad_gates.len()),
    ));

    results.push(TestResult::new(
        "burnout_relief_damping",
        (damp_burnout_delta(-10.0) + 6.0).abs() < 1e-12 && damp_burnout_delta(5.0) == 5.0,
        "-10 lands as -6, increases unchanged",
    ));

    results.push(TestResult::new(
        "overdue_unhappy_is_crisis",
        derive_project_status(1.0, 15.0, -0.5, 25.0, 0.1) == ProjectStatus::Crisis,
        "weeks -0.5, satisfaction 25",
    ));

    let bands = [
        (95.0, FeedbackBand::Delighted),
        (65.0, FeedbackBand::Content),
        (45.0, FeedbackBand::Uneasy),
        (10.0, FeedbackBand::Unhappy),
    ];
    results.push(TestResult::new(
        "feedback_bands",
        bands.iter().all(|(s, b)| feedback_band(*s) == *b),
        "80/60/40 cut-offs",
    ));

    let on_time = completion_payment(10_000, 100.0, 0.0);
    let late = completion_payment(10_000, 100.0, 2.0);
    results.push(TestResult::new(
        "late_delivery_pays_less",
        on_time == 10_000 && late < on_time,
        format!("on time ${}, two weeks late ${}", on_time, late),
    ));

    let rockstar = CareerSummary {
        projects_completed: 6,
        money: 60_000,
        average_satisfaction: 90.0,
        team_morale: 80.0,
        ..Default::default()
    };
    let struggled = CareerSummary::default();
    results.push(TestResult::new(
        "victory_tiers",
        classify_victory(&rockstar) == VictoryTier::Rockstar && classify_victory(&struggled) == VictoryTier::Struggled,
        "top and bottom tiers classify",
    ));

    results
}

// ── 3. Campaigns ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Policy {
    /// First choice, rest every weekend, auto-assign daily.
    Careful,
    /// Last choice, crunch every weekend, never re-staff.
    Reckless,
}

struct CampaignRun {
    outcome: Option<GameOutcome>,
    week: u32,
    score: i64,
    violations: Vec<String>,
}

fn play(catalog: &Catalog, seed: u64, policy: Policy) -> CampaignRun {
    let mut engine = SimulationEngine::new(catalog.clone(), SimConfig::default()).with_seed(seed);
    let mut violations = Vec::new();
    engine.auto_assign();

    for _ in 0..5_000 {
        match engine.advance_day() {
            TickOutcome::Held(HoldReason::GameOver) => break,
            TickOutcome::Held(HoldReason::AwaitingResponse) => {
                let Some(rendered) = engine.current_event() else {
                    violations.push("awaiting a response with nothing on screen".into());
                    break;
                };
                let choice = match policy {
                    Policy::Careful => 0,
                    Policy::Reckless => rendered.choices.len().saturating_sub(1),
                };
                if engine.submit_event_choice(&rendered.id, choice).is_none() {
                    violations.push(format!("choice {} on {} rejected", choice, rendered.id));
                    break;
                }
            }
            TickOutcome::Held(HoldReason::WeekendChoice) => {
                let choice = match policy {
                    Policy::Careful => WeekendChoice::Rest,
                    Policy::Reckless => WeekendChoice::Crunch,
                };
                if let Err(e) = engine.resolve_weekend(choice) {
                    violations.push(format!("weekend: {}", e));
                    break;
                }
            }
            TickOutcome::Held(HoldReason::Paused) => {
                engine.toggle_pause();
            }
            TickOutcome::Advanced(_) => {
                if matches!(policy, Policy::Careful) {
                    engine.auto_assign();
                }
            }
        }
        check_invariants(&engine, &mut violations);
    }
    if !engine.state.is_over() {
        violations.push(format!("campaign still running at {}", engine.state.clock));
    }

    let report = engine.final_report();
    CampaignRun {
        outcome: report.outcome,
        week: engine.state.clock.week,
        score: report.score,
        violations,
    }
}

fn check_invariants(engine: &SimulationEngine, violations: &mut Vec<String>) {
    let state = &engine.state;
    for m in state.team.members.iter().filter(|m| !m.is_player) {
        if m.hours() < 0.0 {
            violations.push(format!("{} has negative hours {:.2}", m.id, m.hours()));
        }
    }
    for p in &state.projects {
        for ph in p.phases.iter() {
            if !(0.0..=1.0).contains(&ph.progress) {
                violations.push(format!("{} {} progress {}", p.id, ph.kind.name(), ph.progress));
            }
        }
    }
    if let Some(audit_gap) = state.team.members.iter().find_map(|m| {
        let applied: f64 = state
            .team
            .burnout_audit()
            .iter()
            .filter(|a| a.member_id == m.id)
            .map(|a| a.applied)
            .sum();
        ((applied - m.burnout()).abs() > 1e-6).then(|| m.id.clone())
    }) {
        violations.push(format!("burnout of {} changed outside the audited path", audit_gap));
    }
}

fn validate_campaigns(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Campaigns ---");
    let mut results = Vec::new();
    let mut outcomes: BTreeMap<String, usize> = BTreeMap::new();

    for policy in [Policy::Careful, Policy::Reckless] {
        for seed in 1..=5u64 {
            let run = play(catalog, seed, policy);
            let label = match run.outcome {
                Some(GameOutcome::Victory(tier)) => format!("victory/{:?}", tier),
                Some(other) => format!("{:?}", other),
                None => "unfinished".to_string(),
            };
            *outcomes.entry(label.clone()).or_insert(0) += 1;
            if verbose {
                println!("    {:?} seed {}: {} in week {}, score {}", policy, seed, label, run.week, run.score);
            }
            let name = format!("campaign_{:?}_{}", policy, seed).to_lowercase();
            results.push(TestResult::new(
                &name,
                run.violations.is_empty(),
                if run.violations.is_empty() {
                    format!("{} (week {}, score {})", label, run.week, run.score)
                } else {
                    run.violations.iter().take(3).cloned().collect::<Vec<_>>().join("; ")
                },
            ));
        }
    }

    results.push(TestResult::new(
        "campaign_outcomes",
        !outcomes.contains_key("unfinished"),
        format!("{:?}", outcomes),
    ));
    results
}

// ── 4. Snapshots ────────────────────────────────────────────────────────

fn validate_snapshots(catalog: &Catalog) -> Vec<TestResult> {
    println!("--- Snapshots ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new(catalog.clone(), SimConfig::default()).with_seed(17);
    engine.auto_assign();
    for _ in 0..3 {
        if let Some(id) = engine.state.events.current.clone() {
            engine.submit_event_choice(&id, 0);
        }
        engine.advance_day();
    }

    let json_ok = match engine.snapshot().and_then(|json| persistence::from_json(&json)) {
        Ok(restored) => {
            restored.money == engine.state.money
                && restored.clock == engine.state.clock
                && restored.projects.len() == engine.state.projects.len()
        }
        Err(e) => {
            results.push(TestResult::new("snapshot_json", false, e.to_string()));
            return results;
        }
    };
    results.push(TestResult::new("snapshot_json", json_ok, "JSON round trip keeps money, clock, projects"));

    let mut buf = Vec::new();
    let binary_ok = persistence::save_binary(&engine.state, &mut buf)
        .and_then(|_| persistence::load_binary(buf.as_slice()))
        .map(|s| s.money == engine.state.money && s.clock == engine.state.clock);
    results.push(TestResult::new(
        "snapshot_binary",
        matches!(binary_ok, Ok(true)),
        format!("{} bytes", buf.len()),
    ));

    let legacy = r#"{ "money": 5000, "projects": [ { "id": "old", "progress": 0.5, "estimated_hours": 15 } ] }"#;
    let migrated = persistence::from_json(legacy)
        .map(|s| s.project("old").map_or(false, |p| (p.progress() - 0.5).abs() < 1e-9))
        .unwrap_or(false);
    results.push(TestResult::new("snapshot_legacy_migration", migrated, "single progress becomes phases"));

    results
}
