//! The context every system runs against.

use agency_logic::config::SimConfig;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalog;
use crate::components::{GameState, KeyMomentKind};
use crate::ports::Presentation;

/// Borrowed view of one simulation: state, read-only data, randomness and
/// the presentation port. Built fresh by the engine for each operation.
pub struct SimContext<'a> {
    pub state: &'a mut GameState,
    pub catalog: &'a Catalog,
    pub config: &'a SimConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub ui: &'a mut dyn Presentation,
}

impl SimContext<'_> {
    /// Rolls a probability. `None` always succeeds.
    pub fn roll(&mut self, chance: Option<f64>) -> bool {
        match chance {
            None => true,
            Some(p) if p >= 1.0 => true,
            Some(p) if p <= 0.0 => false,
            Some(p) => self.rng.gen_bool(p),
        }
    }

    pub fn key_moment(&mut self, kind: KeyMomentKind, text: impl Into<String>) {
        let cap = self.config.max_key_moments;
        self.state.push_key_moment(kind, text, cap);
    }
}
