//! State definitions for the simulation.
//!
//! Components are plain serializable data. Behaviour that spans more than
//! one of them lives in systems.

mod clock;
mod project;
mod state;
mod stats;
mod team;

pub use clock::*;
pub use project::*;
pub use state::*;
pub use stats::*;
pub use team::*;
