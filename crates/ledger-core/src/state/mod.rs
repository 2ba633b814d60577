//! State management for orders within the ledger.
//!
//! Holds the transition table for the order lifecycle and the precondition
//! errors reported when a requested transition is not allowed.

pub mod order;

pub use order::{OrderStateError, OrderStateMachine};
