//! Common types for the ledger system.
//!
//! Holds the records the ledger engine persists (profiles and orders), the
//! caller identity used as both map key and authorization subject, the
//! notifications emitted on every successful transition, and the small
//! configuration-schema framework shared by pluggable storage backends.

/// Event types emitted by the ledger engine.
pub mod events;
/// Caller identity type.
pub mod identity;
/// Order record and lifecycle state.
pub mod order;
/// User profile record.
pub mod profile;
/// Storage namespaces for persisted ledger state.
pub mod storage;
/// Configuration validation types for pluggable backends.
pub mod validation;

pub use events::*;
pub use identity::{Identity, IdentityError};
pub use order::*;
pub use profile::Profile;
pub use storage::*;
pub use validation::*;
