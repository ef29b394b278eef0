//! Database module for PostgreSQL persistence.

mod activities;
mod pool;

pub use activities::*;
pub use pool::*;
