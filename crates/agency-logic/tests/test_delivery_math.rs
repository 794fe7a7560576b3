//! Integration tests across the pure delivery pipeline.
//!
//! Exercises: WorkerInput → phase progress → phase status → project
//! status → satisfaction → payment → victory tier.

use agency_logic::calendar::elapsed_fraction;
use agency_logic::config::SimConfig;
use agency_logic::efficiency::{
    derive_phase_status, phase_progress_delta, worker_efficiency, PhaseKind, PhaseStatus, Role,
    WorkerInput,
};
use agency_logic::satisfaction::{
    derive_project_status, satisfaction_score, ClientProfile, ProjectStatus, QualityContributor,
    SatisfactionInputs,
};
use agency_logic::scoring::{classify_victory, completion_payment, CareerSummary, VictoryTier};

// ── Helpers ────────────────────────────────────────────────────────────

fn worker(role: Role, skill: u8) -> WorkerInput {
    WorkerInput {
        role,
        skill,
        skill_multiplier: 1.0,
        morale: 100.0,
        hours_remaining: 40.0,
        is_ill: false,
        is_player: false,
        concurrent_assignments: 1,
    }
}

/// Works one phase to completion, returning the number of ticks used.
fn ticks_to_finish(phase: PhaseKind, workers: &[WorkerInput], cfg: &SimConfig) -> u32 {
    let eff: f64 = workers.iter().map(|w| worker_efficiency(w, phase)).sum();
    let mut progress = 0.0;
    let mut ticks = 0;
    while progress < 1.0 {
        progress = (progress + phase_progress_delta(eff, phase, cfg.tick_day_fraction())).min(1.0);
        ticks += 1;
        assert!(ticks < 100_000, "phase never finished");
    }
    ticks
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_matched_designer_finishes_design_in_five_days() {
    let cfg = SimConfig::default();
    let ticks = ticks_to_finish(PhaseKind::Design, &[worker(Role::Designer, 5)], &cfg);
    let days = ticks as f64 / cfg.ticks_per_workday();
    assert!((days - 5.0).abs() < 0.05, "took {days} days");
}

#[test]
fn test_two_workers_finish_faster_than_one() {
    let cfg = SimConfig::default();
    let solo = ticks_to_finish(PhaseKind::Development, &[worker(Role::Developer, 4)], &cfg);
    let pair = ticks_to_finish(
        PhaseKind::Development,
        &[worker(Role::Developer, 4), worker(Role::Junior, 3)],
        &cfg,
    );
    assert!(pair < solo);
}

#[test]
fn test_phase_chain_walks_statuses_in_order() {
    let mut mgmt = 0.0;
    let mut design = PhaseStatus::Waiting;
    let mut seen = vec![design];
    while mgmt < 1.0 {
        mgmt = f64::min(mgmt + 0.1, 1.0);
        let next = derive_phase_status(design, PhaseKind::Design, 0.0, Some(mgmt), true);
        if next != design {
            seen.push(next);
            design = next;
        }
    }
    assert_eq!(seen, vec![PhaseStatus::Waiting, PhaseStatus::Ready, PhaseStatus::Active]);
}

#[test]
fn test_on_time_delivery_pays_well_and_wins() {
    let inputs = SatisfactionInputs {
        contributors: vec![QualityContributor { effective_skill: 1.0, morale: 90.0 }],
        actual_progress: 1.0,
        expected_progress: elapsed_fraction(4.0, 1.0),
        response_latency_hours: 1.0,
        budget_health: 1.0,
    };
    let score = satisfaction_score(&ClientProfile::default(), &inputs);
    assert!(score >= 85.0, "score {score}");
    assert_eq!(
        derive_project_status(15.0, 15.0, 1.0, score, 1.0),
        ProjectStatus::Complete
    );

    let paid = completion_payment(20_000, score, 0.0);
    assert!(paid >= 17_000);

    let summary = CareerSummary {
        projects_completed: 3,
        money: 20_000 + paid,
        average_satisfaction: score,
        team_morale: 60.0,
        ..Default::default()
    };
    assert_eq!(classify_victory(&summary), VictoryTier::Professional);
}
