//! Notifications emitted by the ledger engine.
//!
//! Every successful transition produces exactly one event, in the order the
//! transitions occur. Events are categorized by the record they concern.

use crate::{Identity, OrderId};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all ledger events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
	/// Events concerning user profiles.
	Profile(ProfileEvent),
	/// Events concerning orders.
	Order(OrderEvent),
}

/// Events related to profile management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileEvent {
	/// A profile was registered or its display fields overwritten.
	Created {
		identity: Identity,
		name: String,
		age: String,
	},
	/// A profile record was erased.
	Deleted { identity: Identity },
}

/// Events related to the order lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
	Created {
		id: OrderId,
		customer: Identity,
		amount: u64,
	},
	Confirmed { id: OrderId, customer: Identity },
	Delivered { id: OrderId, customer: Identity },
	Cancelled { id: OrderId, customer: Identity },
}

/// An event as recorded in the persisted journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
	/// Position in the journal, starting at zero.
	pub seq: u64,
	pub event: LedgerEvent,
}
