//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MatchSource`: Match catalog loading per sport category
//! - `BalanceProvider`: The user's wallet balance

pub mod balance;
pub mod match_source;

pub use balance::BalanceProvider;
pub use match_source::MatchSource;
