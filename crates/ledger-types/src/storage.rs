//! Storage-related types for the ledger system.

/// Storage namespaces for the persisted ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Profiles keyed by identity hex
	Profiles,
	/// Orders keyed by decimal order id
	Orders,
	/// Event journal keyed by decimal sequence number
	Events,
	/// Singleton values such as the owner and counters
	Meta,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Profiles => "profiles",
			StorageKey::Orders => "orders",
			StorageKey::Events => "events",
			StorageKey::Meta => "meta",
		}
	}
}

/// Keys within the [`StorageKey::Meta`] namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKey {
	/// Owner identity fixed at first construction.
	Owner,
	/// Id the next created order receives.
	NextOrderId,
	/// Sequence number of the next journal entry.
	NextEventSeq,
}

impl MetaKey {
	pub fn as_str(&self) -> &'static str {
		match self {
			MetaKey::Owner => "owner",
			MetaKey::NextOrderId => "next_order_id",
			MetaKey::NextEventSeq => "next_event_seq",
		}
	}
}
