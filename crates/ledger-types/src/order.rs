//! Order types for the ledger system.

use crate::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential order identifier. Allocated from zero and never reused.
pub type OrderId = u64;

/// Lifecycle state of an order.
///
/// Valid transitions are `Created -> Confirmed -> Delivered` and
/// `Confirmed -> Cancelled`. `Delivered` and `Cancelled` are terminal.
/// `Created` is also the value reported for ids that were never allocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
	/// Order has been placed but not yet confirmed by its customer.
	#[default]
	Created,
	/// Customer confirmed the order; it may now be delivered or cancelled.
	Confirmed,
	/// Customer confirmed receipt. Terminal.
	Delivered,
	/// Order was cancelled after confirmation. Terminal.
	Cancelled,
}

impl fmt::Display for OrderState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderState::Created => write!(f, "Created"),
			OrderState::Confirmed => write!(f, "Confirmed"),
			OrderState::Delivered => write!(f, "Delivered"),
			OrderState::Cancelled => write!(f, "Cancelled"),
		}
	}
}

/// A purchase order placed by a profile holder.
///
/// `customer` and `amount` are fixed at creation; only `state` changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Identifier, equal to the key the order is stored under.
	pub id: OrderId,
	/// Identity that placed the order.
	pub customer: Identity,
	/// Positive order amount.
	pub amount: u64,
	/// Current lifecycle state.
	pub state: OrderState,
}

impl Order {
	/// Creates a freshly placed order in the `Created` state.
	pub fn new(id: OrderId, customer: Identity, amount: u64) -> Self {
		Self {
			id,
			customer,
			amount,
			state: OrderState::Created,
		}
	}
}
