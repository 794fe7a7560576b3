//! Building runtime state from catalog templates.

mod projects;
mod roster;

pub use projects::*;
pub use roster::*;
