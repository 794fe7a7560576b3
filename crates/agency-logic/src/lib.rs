//! Pure simulation logic for the agency sim.
//!
//! This crate holds every formula the engine runs, with no game state and
//! no randomness of its own. Functions take plain data and return results,
//! which keeps them unit-testable and shared between the engine and the
//! headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assignment`] | Greedy two-pass auto-assignment heuristic |
//! | [`calendar`] | Week/day arithmetic, workdays, campaign phases |
//! | [`config`] | Tunable settings (`SimConfig`) with JSON loading and validation |
//! | [`constants`] | Balance constants: thresholds, rates, bands |
//! | [`efficiency`] | Roles, phases, phase status, worker efficiency |
//! | [`satisfaction`] | Client satisfaction, project status, risk labels |
//! | [`scoring`] | Victory tiers, final score, late fees, reputation |
//! | [`wellbeing`] | Burnout accrual, morale drift, illness, morale latches |

pub mod assignment;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod efficiency;
pub mod satisfaction;
pub mod scoring;
pub mod wellbeing;
