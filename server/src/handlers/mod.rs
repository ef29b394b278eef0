//! Request handlers for activity operations.

mod activities;

pub use activities::*;
