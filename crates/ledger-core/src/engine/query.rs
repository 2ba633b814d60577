//! Read-only queries over profiles, orders and the event journal.

use super::{LedgerEngine, LedgerError};
use ledger_types::{EventRecord, Identity, MetaKey, Order, OrderId, OrderState, StorageKey};
use tracing::instrument;

/// Largest number of journal entries returned by one [`LedgerEngine::events`] call.
pub const MAX_EVENTS_PER_QUERY: u64 = 1000;

impl LedgerEngine {
	/// Returns the state of order `id`.
	///
	/// An id that was never allocated reports `OrderState::Created`, the
	/// default state. Use [`LedgerEngine::get_order`] to tell the two apart.
	pub async fn get_order_state(&self, id: OrderId) -> Result<OrderState, LedgerError> {
		let _guard = self.lock().await;
		Ok(self
			.load_order(id)
			.await?
			.map(|order| order.state)
			.unwrap_or_default())
	}

	/// Returns the full order record, failing with `NotFound` for unallocated ids.
	pub async fn get_order(&self, id: OrderId) -> Result<Order, LedgerError> {
		let _guard = self.lock().await;
		self.require_order(id).await
	}

	/// Returns the current orders of `target`. Owner only.
	#[instrument(skip_all, fields(caller = %caller, target = %target))]
	pub async fn get_orders(
		&self,
		caller: Identity,
		target: Identity,
	) -> Result<Vec<OrderId>, LedgerError> {
		let _guard = self.lock().await;
		self.require_owner(caller, "list other profiles' orders")?;
		Ok(self.require_profile(target).await?.current_orders)
	}

	/// Returns the caller's current orders. Enumeration order is unspecified.
	pub async fn get_my_orders(&self, caller: Identity) -> Result<Vec<OrderId>, LedgerError> {
		let _guard = self.lock().await;
		Ok(self.require_profile(caller).await?.current_orders)
	}

	/// Returns the caller's delivered orders, oldest first.
	pub async fn get_my_completed_orders(
		&self,
		caller: Identity,
	) -> Result<Vec<OrderId>, LedgerError> {
		let _guard = self.lock().await;
		Ok(self.require_profile(caller).await?.completed_orders)
	}

	/// Returns the id the next created order will receive.
	pub async fn next_order_id(&self) -> Result<OrderId, LedgerError> {
		let _guard = self.lock().await;
		self.read_counter(MetaKey::NextOrderId).await
	}

	/// Returns up to `limit` journal entries starting at sequence `from`.
	pub async fn events(&self, from: u64, limit: u64) -> Result<Vec<EventRecord>, LedgerError> {
		let _guard = self.lock().await;

		let end = self.read_counter(MetaKey::NextEventSeq).await?;
		let limit = limit.min(MAX_EVENTS_PER_QUERY);
		let stop = from.saturating_add(limit).min(end);

		let mut records = Vec::new();
		for seq in from..stop {
			let record: EventRecord = self
				.storage
				.retrieve(StorageKey::Events.as_str(), &seq.to_string())
				.await?;
			records.push(record);
		}
		Ok(records)
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::*;
	use super::*;

	#[tokio::test]
	async fn test_state_of_unknown_order_is_default() {
		let engine = engine().await;
		assert_eq!(
			engine.get_order_state(12).await.unwrap(),
			OrderState::Created
		);
		assert!(matches!(
			engine.get_order(12).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_get_order_zero_before_creation() {
		let engine = engine_with_alice().await;
		assert!(matches!(
			engine.get_order(0).await,
			Err(LedgerError::NotFound(_))
		));
		engine.create_order(alice(), 1).await.unwrap();
		assert_eq!(engine.get_order(0).await.unwrap().amount, 1);
	}

	#[tokio::test]
	async fn test_get_orders_owner_only() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 5).await.unwrap();

		assert_eq!(engine.get_orders(owner(), alice()).await.unwrap(), vec![id]);
		assert!(matches!(
			engine.get_orders(alice(), alice()).await,
			Err(LedgerError::Unauthorized(_))
		));
		assert!(matches!(
			engine.get_orders(owner(), bob()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_my_orders_requires_profile() {
		let engine = engine().await;
		assert!(matches!(
			engine.get_my_orders(bob()).await,
			Err(LedgerError::NotFound(_))
		));
		assert!(matches!(
			engine.get_my_completed_orders(bob()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_events_paging() {
		let engine = engine_with_alice().await;
		for amount in 1..=4 {
			engine.create_order(alice(), amount).await.unwrap();
		}

		let page = engine.events(1, 2).await.unwrap();
		assert_eq!(
			page.iter().map(|r| r.seq).collect::<Vec<_>>(),
			vec![1, 2]
		);
		assert_eq!(engine.events(3, 100).await.unwrap().len(), 2);
		assert!(engine.events(50, 10).await.unwrap().is_empty());
		assert!(engine.events(0, 0).await.unwrap().is_empty());
	}
}
