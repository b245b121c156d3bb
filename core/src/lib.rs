//! Weekly world-tick engine for a geopolitical simulation.
//!
//! `tick_week` takes a world snapshot and a turn context and returns the
//! next snapshot plus the effect log. The snapshot passed in is never
//! modified, and identical inputs always give bit-identical outputs.

pub mod config;
pub mod debt_subsystem;
pub mod effect;
pub mod engine;
pub mod error;
pub mod ledger_subsystem;
pub mod operation;
pub mod operation_subsystem;
pub mod relation_subsystem;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod subsystem;
pub mod trajectory_subsystem;
pub mod types;

pub use engine::{tick_week, tick_week_with, TickEngine, TickOutcome, TurnContext};
