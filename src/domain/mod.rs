//! Domain layer - Core lobby models and simulation logic.
//!
//! This module contains the pure domain logic for the live odds lobby.
//! No I/O and no async here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation.

pub mod market;
pub mod match_state;
pub mod odds;
pub mod simulation;
pub mod wager;

// Re-export core types for convenience
pub use market::{Layout, Market, MarketBook, MarketOption, MarketRef, ThreeWayOdds};
pub use match_state::{GameClock, Match, MatchId, MarketId, Period, SportType, TeamSide};
pub use odds::{OddsModel, Trend};
pub use simulation::{step_all, step_match};
pub use wager::{BetError, Receipt, Selection, Wager, WagerLimits, WagerStatus};
