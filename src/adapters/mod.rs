//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure, and delivers the use cases over HTTP.
//!
//! Adapter categories:
//! - `api`: Lobby HTTP API (JSON + Server-Sent Events)
//! - `catalog`: Static match catalog (bundled or JSON file)
//! - `metrics`: Prometheus metrics export and health checks
//! - `wallet`: In-memory session balance

pub mod api;
pub mod catalog;
pub mod metrics;
pub mod wallet;
