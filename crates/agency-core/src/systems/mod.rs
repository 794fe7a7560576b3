//! Systems operate on [`SimContext`](crate::context::SimContext).
//!
//! Each system owns one concern and is called by the engine in a fixed
//! order. Systems never hold state of their own.

pub mod assignment;
pub mod consequences;
pub mod events;
pub mod feedback;
pub mod outcome;
pub mod projects;
pub mod team;
pub mod work;
