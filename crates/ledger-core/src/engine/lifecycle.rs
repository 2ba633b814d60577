//! Order lifecycle operations.
//!
//! Creation, confirmation, delivery and cancellation of orders, keeping each
//! customer's current and completed order lists in step with order state.

use super::{LedgerEngine, LedgerError};
use ledger_types::{Identity, LedgerEvent, MetaKey, Order, OrderEvent, OrderId, OrderState, Profile};
use tracing::instrument;

impl LedgerEngine {
	/// Places a new order for `customer` and returns its id.
	///
	/// Ids are allocated sequentially from zero and never reused.
	#[instrument(skip_all, fields(customer = %customer, amount = amount))]
	pub async fn create_order(
		&self,
		customer: Identity,
		amount: u64,
	) -> Result<OrderId, LedgerError> {
		let _guard = self.lock().await;

		let mut profile = self.require_profile(customer).await?;
		if amount == 0 {
			return Err(LedgerError::InvalidArgument(
				"amount must be greater than zero".into(),
			));
		}

		let id = self.read_counter(MetaKey::NextOrderId).await?;
		let next = id
			.checked_add(1)
			.ok_or_else(|| LedgerError::PreconditionFailed("order ids exhausted".into()))?;

		let order = Order::new(id, customer, amount);
		self.save_order(&order).await?;
		self.write_counter(MetaKey::NextOrderId, next).await?;
		profile.current_orders.push(id);
		self.save_profile(customer, &profile).await?;

		tracing::info!(order_id = id, "Created order");
		self.emit(LedgerEvent::Order(OrderEvent::Created {
			id,
			customer,
			amount,
		}))
		.await?;
		Ok(id)
	}

	/// Confirms a freshly created order. Customer only.
	#[instrument(skip_all, fields(caller = %caller, order_id = id))]
	pub async fn confirm_order(&self, caller: Identity, id: OrderId) -> Result<(), LedgerError> {
		let _guard = self.lock().await;

		let mut order = self.require_order(id).await?;
		Self::require_customer(caller, &order, "confirm")?;
		self.state_machine
			.transition(&mut order, OrderState::Confirmed)?;
		self.save_order(&order).await?;

		tracing::info!("Confirmed order");
		self.emit(LedgerEvent::Order(OrderEvent::Confirmed {
			id,
			customer: order.customer,
		}))
		.await
	}

	/// Marks a confirmed order delivered and moves it to the completed history.
	/// Customer only.
	#[instrument(skip_all, fields(caller = %caller, order_id = id))]
	pub async fn confirm_delivery(&self, caller: Identity, id: OrderId) -> Result<(), LedgerError> {
		let _guard = self.lock().await;

		let mut order = self.require_order(id).await?;
		Self::require_customer(caller, &order, "confirm delivery of")?;
		self.state_machine
			.check_transition(&order, OrderState::Delivered)?;

		let mut profile = self.load_profile(order.customer).await?;
		order.state = OrderState::Delivered;
		self.save_order(&order).await?;
		if !profile.complete_order(id) {
			tracing::warn!("Delivered order was missing from current orders");
			profile.completed_orders.push(id);
		}
		self.save_profile(order.customer, &profile).await?;

		tracing::info!("Delivered order");
		self.emit(LedgerEvent::Order(OrderEvent::Delivered {
			id,
			customer: order.customer,
		}))
		.await
	}

	/// Cancels a confirmed order. Allowed for the customer and for the owner.
	#[instrument(skip_all, fields(caller = %caller, order_id = id))]
	pub async fn cancel_order(&self, caller: Identity, id: OrderId) -> Result<(), LedgerError> {
		let _guard = self.lock().await;

		let mut order = self.require_order(id).await?;
		self.check_cancel(caller, &order)?;

		let mut profile = self.load_profile(order.customer).await?;
		let event = self.apply_cancel(&mut order, &mut profile).await?;
		self.save_profile(order.customer, &profile).await?;
		self.emit(event).await
	}

	/// Applies an already validated cancellation to the order and its customer's profile.
	///
	/// Persists the order only. The caller persists or erases `profile` and then
	/// emits the returned event. The per-order cancellation log line is written
	/// here for both `cancel_order` and admin delete.
	pub(crate) async fn apply_cancel(
		&self,
		order: &mut Order,
		profile: &mut Profile,
	) -> Result<LedgerEvent, LedgerError> {
		order.state = OrderState::Cancelled;
		self.save_order(order).await?;
		if !profile.remove_current_order(order.id) {
			tracing::warn!(
				order_id = order.id,
				"Cancelled order was missing from current orders"
			);
		}

		tracing::info!(order_id = order.id, "Cancelled order");
		Ok(LedgerEvent::Order(OrderEvent::Cancelled {
			id: order.id,
			customer: order.customer,
		}))
	}

	fn require_customer(caller: Identity, order: &Order, action: &str) -> Result<(), LedgerError> {
		if caller != order.customer {
			return Err(LedgerError::Unauthorized(format!(
				"only the customer may {} order {}",
				action, order.id
			)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::*;
	use super::*;

	#[tokio::test]
	async fn test_create_requires_profile_regardless_of_amount() {
		let engine = engine().await;
		for amount in [0, 1, 100] {
			assert!(matches!(
				engine.create_order(bob(), amount).await,
				Err(LedgerError::NotFound(_))
			));
		}
		assert_eq!(engine.next_order_id().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_create_rejects_zero_amount() {
		let engine = engine_with_alice().await;
		assert!(matches!(
			engine.create_order(alice(), 0).await,
			Err(LedgerError::InvalidArgument(_))
		));
		assert!(engine.get_my_orders(alice()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_created_order_record() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 42).await.unwrap();

		let order = engine.get_order(id).await.unwrap();
		assert_eq!(order, Order::new(id, alice(), 42));
	}

	#[tokio::test]
	async fn test_confirm_order_rules() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();

		assert!(matches!(
			engine.confirm_order(bob(), id).await,
			Err(LedgerError::Unauthorized(_))
		));
		assert!(matches!(
			engine.confirm_order(owner(), id).await,
			Err(LedgerError::Unauthorized(_))
		));

		engine.confirm_order(alice(), id).await.unwrap();
		assert!(matches!(
			engine.confirm_order(alice(), id).await,
			Err(LedgerError::AlreadyInState {
				state: OrderState::Confirmed,
				..
			})
		));
		assert_eq!(
			engine.get_order_state(id).await.unwrap(),
			OrderState::Confirmed
		);
	}

	#[tokio::test]
	async fn test_confirm_unknown_order() {
		let engine = engine_with_alice().await;
		assert!(matches!(
			engine.confirm_order(alice(), 3).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_delivery_requires_confirmation() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();

		assert!(matches!(
			engine.confirm_delivery(alice(), id).await,
			Err(LedgerError::NotConfirmed(_))
		));
		assert_eq!(
			engine.get_order_state(id).await.unwrap(),
			OrderState::Created
		);

		engine.confirm_order(alice(), id).await.unwrap();
		engine.confirm_delivery(alice(), id).await.unwrap();
		assert!(matches!(
			engine.confirm_delivery(alice(), id).await,
			Err(LedgerError::AlreadyDelivered(_))
		));
		assert!(matches!(
			engine.confirm_order(alice(), id).await,
			Err(LedgerError::AlreadyInState {
				state: OrderState::Delivered,
				..
			})
		));
		assert_eq!(
			engine.get_my_completed_orders(alice()).await.unwrap(),
			vec![id]
		);
	}

	#[tokio::test]
	async fn test_delivery_of_cancelled_order() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();
		engine.confirm_order(alice(), id).await.unwrap();
		engine.cancel_order(alice(), id).await.unwrap();

		assert!(matches!(
			engine.confirm_delivery(alice(), id).await,
			Err(LedgerError::NotConfirmed(_))
		));
		assert!(matches!(
			engine.cancel_order(alice(), id).await,
			Err(LedgerError::AlreadyCancelled(_))
		));
	}

	#[tokio::test]
	async fn test_cancel_rules() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();

		assert!(matches!(
			engine.cancel_order(alice(), id).await,
			Err(LedgerError::NotConfirmed(_))
		));

		engine.confirm_order(alice(), id).await.unwrap();
		assert!(matches!(
			engine.cancel_order(bob(), id).await,
			Err(LedgerError::Unauthorized(_))
		));

		// The owner may cancel on the customer's behalf
		engine.cancel_order(owner(), id).await.unwrap();
		assert!(engine.get_my_orders(alice()).await.unwrap().is_empty());
		assert!(engine
			.get_my_completed_orders(alice())
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_owner_cancel_emits_single_event() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();
		engine.confirm_order(alice(), id).await.unwrap();
		let before = journal_len(&engine).await;

		engine.cancel_order(owner(), id).await.unwrap();

		let journal = engine.events(before, 100).await.unwrap();
		assert_eq!(journal.len(), 1);
		assert_eq!(journal[0].seq, before);
		assert_eq!(
			journal[0].event,
			LedgerEvent::Order(OrderEvent::Cancelled {
				id,
				customer: alice()
			})
		);
	}

	#[tokio::test]
	async fn test_cancel_delivered_order() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();
		engine.confirm_order(alice(), id).await.unwrap();
		engine.confirm_delivery(alice(), id).await.unwrap();

		assert!(matches!(
			engine.cancel_order(owner(), id).await,
			Err(LedgerError::AlreadyDelivered(_))
		));
	}

	#[tokio::test]
	async fn test_removal_swaps_last_into_place() {
		let engine = engine_with_alice().await;
		let ids: Vec<_> = [
			engine.create_order(alice(), 1).await.unwrap(),
			engine.create_order(alice(), 2).await.unwrap(),
			engine.create_order(alice(), 3).await.unwrap(),
		]
		.to_vec();
		engine.confirm_order(alice(), ids[0]).await.unwrap();
		engine.cancel_order(alice(), ids[0]).await.unwrap();

		assert_eq!(
			engine.get_my_orders(alice()).await.unwrap(),
			vec![ids[2], ids[1]]
		);
	}

	#[tokio::test]
	async fn test_lists_hold_each_id_once() {
		let engine = engine_with_alice().await;
		engine
			.new_user_profile(bob(), "Bob", "40")
			.await
			.unwrap();

		let delivered = engine.create_order(alice(), 1).await.unwrap();
		let cancelled = engine.create_order(alice(), 2).await.unwrap();
		let active = engine.create_order(alice(), 3).await.unwrap();
		let bobs = engine.create_order(bob(), 4).await.unwrap();
		for id in [delivered, cancelled, active] {
			engine.confirm_order(alice(), id).await.unwrap();
		}
		engine.confirm_delivery(alice(), delivered).await.unwrap();
		engine.cancel_order(alice(), cancelled).await.unwrap();

		let current = engine.get_my_orders(alice()).await.unwrap();
		let completed = engine.get_my_completed_orders(alice()).await.unwrap();
		assert_eq!(current, vec![active]);
		assert_eq!(completed, vec![delivered]);
		assert!(!current.contains(&cancelled) && !completed.contains(&cancelled));
		assert_eq!(engine.get_my_orders(bob()).await.unwrap(), vec![bobs]);
	}
}
