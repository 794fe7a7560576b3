use agency_core::prelude::*;
use agency_logic::config::SimConfig;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Plays a whole campaign headless: first choice, rest every weekend.
fn play_campaign(seed: u64) -> i64 {
    let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(seed);
    engine.auto_assign();
    for _ in 0..5_000 {
        match engine.advance_day() {
            TickOutcome::Held(HoldReason::GameOver) => break,
            TickOutcome::Held(HoldReason::AwaitingResponse) => {
                if let Some(id) = engine.state.events.current.clone() {
                    engine.submit_event_choice(&id, 0);
                }
            }
            TickOutcome::Held(HoldReason::WeekendChoice) => {
                let _ = engine.resolve_weekend(WeekendChoice::Rest);
            }
            TickOutcome::Held(HoldReason::Paused) => {
                engine.toggle_pause();
            }
            TickOutcome::Advanced(_) => {
                engine.auto_assign();
            }
        }
    }
    engine.final_report().score
}

fn bench_campaign(c: &mut Criterion) {
    c.bench_function("campaign_12_weeks", |b| b.iter(|| play_campaign(black_box(7))));
}

fn bench_ticks(c: &mut Criterion) {
    c.bench_function("workday_ticks", |b| {
        b.iter(|| {
            let mut catalog = Catalog::builtin();
            catalog.conversations.conversations.clear();
            let mut engine = SimulationEngine::new(catalog, SimConfig::default()).with_seed(1);
            engine.auto_assign();
            black_box(engine.run_until_hold(90))
        })
    });
}

criterion_group!(benches, bench_campaign, bench_ticks);
criterion_main!(benches);
