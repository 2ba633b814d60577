//! Core ledger engine.
//!
//! Implements the authorization-gated state transitions over user profiles
//! and purchase orders, on top of the pluggable storage layer. The
//! [`LedgerBuilder`] assembles an engine from configuration and storage
//! factories.

pub mod builder;
pub mod engine;
pub mod state;

pub use builder::{BuilderError, LedgerBuilder, LedgerFactories};
pub use engine::event_bus::EventBus;
pub use engine::{LedgerEngine, LedgerError};
pub use state::{OrderStateError, OrderStateMachine};
