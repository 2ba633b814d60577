//! Ledger engine.
//!
//! The engine exclusively owns the persisted profiles, orders and id counter.
//! Its operations are grouped into three facets: profile management
//! ([`profile`]), the order lifecycle ([`lifecycle`]) and read-only queries
//! ([`query`]). Every public operation holds the call lock for its whole
//! body, so calls are applied one at a time even when the engine is shared
//! across tasks, and every operation validates fully before it mutates.

pub mod event_bus;
pub mod lifecycle;
pub mod profile;
pub mod query;

use crate::state::{OrderStateError, OrderStateMachine};
use event_bus::EventBus;
use ledger_config::Config;
use ledger_storage::{StorageError, StorageService};
use ledger_types::{
	EventRecord, Identity, LedgerEvent, MetaKey, Order, OrderId, OrderState, Profile, StorageKey,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, MutexGuard};

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Empty required text, zero amount or null identity.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	/// Missing profile or order.
	#[error("Not found: {0}")]
	NotFound(String),
	/// Caller is not the identity the operation requires.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),
	#[error("Order {id} is already {state}")]
	AlreadyInState { id: OrderId, state: OrderState },
	#[error("Order {0} is already cancelled")]
	AlreadyCancelled(OrderId),
	#[error("Order {0} is already delivered")]
	AlreadyDelivered(OrderId),
	#[error("Order {0} is not confirmed")]
	NotConfirmed(OrderId),
	/// Profile deletion blocked by active orders.
	#[error("Precondition failed: {0}")]
	PreconditionFailed(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<OrderStateError> for LedgerError {
	fn from(err: OrderStateError) -> Self {
		match err {
			OrderStateError::AlreadyInState { id, state } => {
				LedgerError::AlreadyInState { id, state }
			},
			OrderStateError::AlreadyCancelled(id) => LedgerError::AlreadyCancelled(id),
			OrderStateError::AlreadyDelivered(id) => LedgerError::AlreadyDelivered(id),
			OrderStateError::NotConfirmed(id) => LedgerError::NotConfirmed(id),
		}
	}
}

impl From<StorageError> for LedgerError {
	fn from(err: StorageError) -> Self {
		LedgerError::Storage(err.to_string())
	}
}

/// The profile and order state-transition engine.
pub struct LedgerEngine {
	/// Ledger configuration.
	pub(crate) config: Config,
	/// Privileged identity, fixed when the persisted ledger was first constructed.
	pub(crate) owner: Identity,
	/// Storage holding profiles, orders, counters and the event journal.
	pub(crate) storage: Arc<StorageService>,
	/// Broadcast of journaled events.
	pub(crate) event_bus: EventBus,
	pub(crate) state_machine: OrderStateMachine,
	/// Serializes public operations.
	call_lock: Mutex<()>,
}

impl LedgerEngine {
	/// Creates an engine over `storage`, recording the configured owner on first use.
	///
	/// Fails with `Unauthorized` if the storage already belongs to a different owner.
	pub async fn new(
		config: Config,
		storage: Arc<StorageService>,
		event_bus: EventBus,
	) -> Result<Self, LedgerError> {
		let owner = config.ledger.owner;
		if owner.is_null() {
			return Err(LedgerError::InvalidArgument(
				"owner cannot be the null identity".into(),
			));
		}

		let recorded: Option<Identity> = storage
			.retrieve_optional(StorageKey::Meta.as_str(), MetaKey::Owner.as_str())
			.await?;

		match recorded {
			Some(existing) if existing != owner => {
				return Err(LedgerError::Unauthorized(format!(
					"ledger is owned by {}, configured owner is {}",
					existing, owner
				)));
			},
			Some(_) => {
				tracing::debug!(ledger = %config.ledger.id, %owner, "Reopened ledger");
			},
			None => {
				storage
					.store(StorageKey::Meta.as_str(), MetaKey::Owner.as_str(), &owner)
					.await?;
				tracing::info!(ledger = %config.ledger.id, %owner, "Recorded ledger owner");
			},
		}

		Ok(Self {
			config,
			owner,
			storage,
			event_bus,
			state_machine: OrderStateMachine::new(),
			call_lock: Mutex::new(()),
		})
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns the owner identity.
	pub fn owner(&self) -> Identity {
		self.owner
	}

	/// Subscribes to events emitted after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
		self.event_bus.subscribe()
	}

	pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
		self.call_lock.lock().await
	}

	pub(crate) fn require_owner(&self, caller: Identity, action: &str) -> Result<(), LedgerError> {
		if caller != self.owner {
			return Err(LedgerError::Unauthorized(format!(
				"only the owner may {}",
				action
			)));
		}
		Ok(())
	}

	/// Loads a profile, returning an empty (non-existent) profile if absent.
	pub(crate) async fn load_profile(&self, identity: Identity) -> Result<Profile, LedgerError> {
		let profile = self
			.storage
			.retrieve_optional(StorageKey::Profiles.as_str(), &identity.to_hex())
			.await?;
		Ok(profile.unwrap_or_default())
	}

	/// Loads a profile, failing with `NotFound` unless it exists.
	pub(crate) async fn require_profile(&self, identity: Identity) -> Result<Profile, LedgerError> {
		let profile = self.load_profile(identity).await?;
		if !profile.exists() {
			return Err(LedgerError::NotFound(format!("profile {}", identity)));
		}
		Ok(profile)
	}

	pub(crate) async fn save_profile(
		&self,
		identity: Identity,
		profile: &Profile,
	) -> Result<(), LedgerError> {
		self.storage
			.store(StorageKey::Profiles.as_str(), &identity.to_hex(), profile)
			.await?;
		Ok(())
	}

	pub(crate) async fn erase_profile(&self, identity: Identity) -> Result<(), LedgerError> {
		self.storage
			.remove(StorageKey::Profiles.as_str(), &identity.to_hex())
			.await?;
		Ok(())
	}

	/// Loads an order if one was allocated under `id`.
	pub(crate) async fn load_order(&self, id: OrderId) -> Result<Option<Order>, LedgerError> {
		let order: Option<Order> = self
			.storage
			.retrieve_optional(StorageKey::Orders.as_str(), &id.to_string())
			.await?;
		// A record whose own id disagrees with its key was never allocated there
		Ok(order.filter(|order| order.id == id))
	}

	pub(crate) async fn require_order(&self, id: OrderId) -> Result<Order, LedgerError> {
		self.load_order(id)
			.await?
			.ok_or_else(|| LedgerError::NotFound(format!("order {}", id)))
	}

	pub(crate) async fn save_order(&self, order: &Order) -> Result<(), LedgerError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id.to_string(), order)
			.await?;
		Ok(())
	}

	pub(crate) async fn read_counter(&self, key: MetaKey) -> Result<u64, LedgerError> {
		let value = self
			.storage
			.retrieve_optional(StorageKey::Meta.as_str(), key.as_str())
			.await?;
		Ok(value.unwrap_or(0))
	}

	pub(crate) async fn write_counter(&self, key: MetaKey, value: u64) -> Result<(), LedgerError> {
		self.storage
			.store(StorageKey::Meta.as_str(), key.as_str(), &value)
			.await?;
		Ok(())
	}

	/// Appends an event to the journal and broadcasts it.
	pub(crate) async fn emit(&self, event: LedgerEvent) -> Result<(), LedgerError> {
		let seq = self.read_counter(MetaKey::NextEventSeq).await?;
		let record = EventRecord { seq, event };

		self.storage
			.store(StorageKey::Events.as_str(), &seq.to_string(), &record)
			.await?;
		self.write_counter(MetaKey::NextEventSeq, seq + 1).await?;

		tracing::debug!(seq, event = ?record.event, "Emitted event");
		// No subscribers is fine; the journal is the durable record
		self.event_bus.publish(record).ok();
		Ok(())
	}
}
