//! Agency Core - Design Agency Simulation Engine
//!
//! A twelve-week campaign running a small design agency: a team with
//! morale and burnout, client projects moving through four phases, and
//! conversations whose choices ripple through money, people and clients.
//!
//! # Architecture
//!
//! - **Components**: Plain serializable state ([`components::GameState`] and its parts)
//! - **Catalog**: Read-only JSON data (conversations, roster, project templates)
//! - **Systems**: Functions over a [`context::SimContext`] that update the state
//! - **Ports**: Presentation and snapshot storage traits the host implements
//!
//! Pure formulas (efficiency, satisfaction, burnout, scoring) live in
//! `agency-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use agency_core::prelude::*;
//! use agency_logic::config::SimConfig;
//!
//! let mut engine = SimulationEngine::new(Catalog::builtin(), SimConfig::default()).with_seed(7);
//!
//! loop {
//!     match engine.tick() {
//!         TickOutcome::Held(HoldReason::AwaitingResponse) => {
//!             let id = engine.state.events.current.clone().unwrap();
//!             engine.submit_event_choice(&id, 0);
//!         }
//!         TickOutcome::Held(HoldReason::WeekendChoice) => {
//!             engine.resolve_weekend(WeekendChoice::Rest).unwrap();
//!         }
//!         TickOutcome::Held(_) => break,
//!         TickOutcome::Advanced(_) => {}
//!     }
//! }
//! ```

pub mod catalog;
pub mod components;
pub mod context;
pub mod engine;
pub mod generation;
pub mod persistence;
pub mod ports;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::components::*;
    pub use crate::engine::{CommandError, HoldReason, SimulationEngine, TickOutcome, TickReport, WeekendChoice};
    pub use crate::ports::{Headless, MemoryStore, NoticeLog, Presentation, SnapshotStore};
}
