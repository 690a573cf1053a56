//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the lobby's core workflows.
//!
//! Use cases:
//! - `MatchRegistry`: Versioned snapshot store of all matches
//! - `TickEngine` / `TickScheduler`: Periodic clock and odds simulation
//! - `BetController`: Wager validation, balance debit, pending ledger

pub mod bet_controller;
pub mod match_registry;
pub mod tick_engine;

pub use bet_controller::BetController;
pub use match_registry::{MatchRegistry, MatchSnapshot, RegistryHandle};
pub use tick_engine::{TickEngine, TickScheduler, TickSubscription};
