//! Profile management.
//!
//! Registration, self-deletion, owner-driven deletion and owner lookup of
//! user profiles.

use super::{LedgerEngine, LedgerError};
use ledger_types::{Identity, LedgerEvent, Order, OrderState, ProfileEvent};
use tracing::instrument;

impl LedgerEngine {
	/// Registers `caller`, or overwrites the name and age of an existing profile.
	///
	/// Order lists of an existing profile are kept so active orders are never orphaned.
	#[instrument(skip_all, fields(caller = %caller))]
	pub async fn new_user_profile(
		&self,
		caller: Identity,
		name: &str,
		age: &str,
	) -> Result<(), LedgerError> {
		let _guard = self.lock().await;

		if name.is_empty() {
			return Err(LedgerError::InvalidArgument("name cannot be empty".into()));
		}
		if age.is_empty() {
			return Err(LedgerError::InvalidArgument("age cannot be empty".into()));
		}

		let mut profile = self.load_profile(caller).await?;
		let existed = profile.exists();
		profile.name = name.to_string();
		profile.age = age.to_string();
		self.save_profile(caller, &profile).await?;

		tracing::info!(existed, "Registered profile");
		self.emit(LedgerEvent::Profile(ProfileEvent::Created {
			identity: caller,
			name: profile.name,
			age: profile.age,
		}))
		.await
	}

	/// Erases the caller's profile, including its completed-order history.
	///
	/// Refused while the caller has current orders.
	#[instrument(skip_all, fields(caller = %caller))]
	pub async fn delete_profile(&self, caller: Identity) -> Result<(), LedgerError> {
		let _guard = self.lock().await;

		let profile = self.require_profile(caller).await?;
		if !profile.current_orders.is_empty() {
			return Err(LedgerError::PreconditionFailed(format!(
				"profile {} has {} active orders",
				caller,
				profile.current_orders.len()
			)));
		}

		self.erase_profile(caller).await?;
		tracing::info!("Deleted profile");
		self.emit(LedgerEvent::Profile(ProfileEvent::Deleted { identity: caller }))
			.await
	}

	/// Cancels every current order of `target` on its behalf, then erases the profile.
	///
	/// All orders are validated before anything is changed: if any of them
	/// cannot be cancelled the whole operation fails and nothing is modified.
	#[instrument(skip_all, fields(admin = %admin, target = %target))]
	pub async fn admin_delete_profile_and_orders(
		&self,
		admin: Identity,
		target: Identity,
	) -> Result<(), LedgerError> {
		let _guard = self.lock().await;

		self.require_owner(admin, "delete another profile")?;
		let mut profile = self.require_profile(target).await?;

		// Snapshot first: each cancellation shrinks current_orders
		let snapshot = profile.current_orders.clone();
		let mut orders: Vec<Order> = Vec::with_capacity(snapshot.len());
		for id in snapshot {
			let order = self.require_order(id).await?;
			self.check_cancel(admin, &order)?;
			orders.push(order);
		}

		let mut events = Vec::with_capacity(orders.len());
		for mut order in orders {
			events.push(self.apply_cancel(&mut order, &mut profile).await?);
		}

		self.erase_profile(target).await?;
		tracing::info!(cancelled = events.len(), "Deleted profile and cancelled its orders");
		for event in events {
			self.emit(event).await?;
		}
		self.emit(LedgerEvent::Profile(ProfileEvent::Deleted { identity: target }))
			.await
	}

	/// Returns `(name, age)` of `target`. Owner only.
	#[instrument(skip_all, fields(caller = %caller, target = %target))]
	pub async fn get_profile(
		&self,
		caller: Identity,
		target: Identity,
	) -> Result<(String, String), LedgerError> {
		let _guard = self.lock().await;

		self.require_owner(caller, "read profiles")?;
		if target.is_null() {
			return Err(LedgerError::InvalidArgument(
				"target cannot be the null identity".into(),
			));
		}

		let profile = self.require_profile(target).await?;
		Ok((profile.name, profile.age))
	}

	/// Validates that `caller` may cancel `order` right now.
	pub(crate) fn check_cancel(&self, caller: Identity, order: &Order) -> Result<(), LedgerError> {
		if caller != order.customer && caller != self.owner {
			return Err(LedgerError::Unauthorized(format!(
				"only the customer or the owner may cancel order {}",
				order.id
			)));
		}
		self.state_machine
			.check_transition(order, OrderState::Cancelled)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::*;
	use super::*;
	use ledger_types::{OrderEvent, OrderState};

	#[tokio::test]
	async fn test_register_then_get_profile() {
		let engine = engine_with_alice().await;
		let (name, age) = engine.get_profile(owner(), alice()).await.unwrap();
		assert_eq!(name, "Alice");
		assert_eq!(age, "25");
	}

	#[tokio::test]
	async fn test_register_rejects_empty_fields() {
		let engine = engine().await;
		assert!(matches!(
			engine.new_user_profile(alice(), "", "25").await,
			Err(LedgerError::InvalidArgument(_))
		));
		assert!(matches!(
			engine.new_user_profile(alice(), "Alice", "").await,
			Err(LedgerError::InvalidArgument(_))
		));
		assert!(matches!(
			engine.get_profile(owner(), alice()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_reregistration_keeps_orders() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();

		engine
			.new_user_profile(alice(), "Alicia", "26")
			.await
			.unwrap();

		let (name, age) = engine.get_profile(owner(), alice()).await.unwrap();
		assert_eq!((name.as_str(), age.as_str()), ("Alicia", "26"));
		assert_eq!(engine.get_my_orders(alice()).await.unwrap(), vec![id]);
	}

	#[tokio::test]
	async fn test_age_is_free_text() {
		let engine = engine().await;
		engine
			.new_user_profile(alice(), "Alice", "twenty-five")
			.await
			.unwrap();
		let (_, age) = engine.get_profile(owner(), alice()).await.unwrap();
		assert_eq!(age, "twenty-five");
	}

	#[tokio::test]
	async fn test_get_profile_authorization_and_arguments() {
		let engine = engine_with_alice().await;
		assert!(matches!(
			engine.get_profile(alice(), alice()).await,
			Err(LedgerError::Unauthorized(_))
		));
		assert!(matches!(
			engine.get_profile(owner(), Identity::NULL).await,
			Err(LedgerError::InvalidArgument(_))
		));
		assert!(matches!(
			engine.get_profile(owner(), bob()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_delete_profile_missing() {
		let engine = engine().await;
		assert!(matches!(
			engine.delete_profile(alice()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_completed_orders_do_not_block_deletion() {
		let engine = engine_with_alice().await;
		let id = engine.create_order(alice(), 10).await.unwrap();
		engine.confirm_order(alice(), id).await.unwrap();
		engine.confirm_delivery(alice(), id).await.unwrap();

		engine.delete_profile(alice()).await.unwrap();

		// History is erased with the profile
		engine
			.new_user_profile(alice(), "Alice", "25")
			.await
			.unwrap();
		assert!(engine
			.get_my_completed_orders(alice())
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_admin_delete_requires_owner() {
		let engine = engine_with_alice().await;
		assert!(matches!(
			engine.admin_delete_profile_and_orders(bob(), alice()).await,
			Err(LedgerError::Unauthorized(_))
		));
		assert!(matches!(
			engine.admin_delete_profile_and_orders(owner(), bob()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_admin_delete_cancels_confirmed_orders() {
		let engine = engine_with_alice().await;
		let first = engine.create_order(alice(), 10).await.unwrap();
		let second = engine.create_order(alice(), 20).await.unwrap();
		let delivered = engine.create_order(alice(), 30).await.unwrap();
		for id in [first, second, delivered] {
			engine.confirm_order(alice(), id).await.unwrap();
		}
		engine.confirm_delivery(alice(), delivered).await.unwrap();

		engine
			.admin_delete_profile_and_orders(owner(), alice())
			.await
			.unwrap();

		assert_eq!(
			engine.get_order_state(first).await.unwrap(),
			OrderState::Cancelled
		);
		assert_eq!(
			engine.get_order_state(second).await.unwrap(),
			OrderState::Cancelled
		);
		assert_eq!(
			engine.get_order_state(delivered).await.unwrap(),
			OrderState::Delivered
		);
		// Order records persist after the profile is gone
		assert_eq!(engine.get_order(first).await.unwrap().customer, alice());
		assert!(matches!(
			engine.get_my_orders(alice()).await,
			Err(LedgerError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_admin_delete_aborts_without_changes_on_unconfirmed_order() {
		let engine = engine_with_alice().await;
		let confirmed = engine.create_order(alice(), 10).await.unwrap();
		engine.confirm_order(alice(), confirmed).await.unwrap();
		let unconfirmed = engine.create_order(alice(), 20).await.unwrap();
		let events_before = engine.events(0, 100).await.unwrap().len();

		let result = engine
			.admin_delete_profile_and_orders(owner(), alice())
			.await;
		assert!(matches!(result, Err(LedgerError::NotConfirmed(id)) if id == unconfirmed));

		assert_eq!(
			engine.get_order_state(confirmed).await.unwrap(),
			OrderState::Confirmed
		);
		let mut current = engine.get_my_orders(alice()).await.unwrap();
		current.sort_unstable();
		assert_eq!(current, vec![confirmed, unconfirmed]);
		assert_eq!(engine.events(0, 100).await.unwrap().len(), events_before);
	}

	#[tokio::test]
	async fn test_delete_profile_emits_deleted() {
		let engine = engine_with_alice().await;
		let before = journal_len(&engine).await;

		engine.delete_profile(alice()).await.unwrap();

		let journal = engine.events(before, 100).await.unwrap();
		let events: Vec<_> = journal.into_iter().map(|r| r.event).collect();
		assert_eq!(
			events,
			vec![LedgerEvent::Profile(ProfileEvent::Deleted { identity: alice() })]
		);
	}

	#[tokio::test]
	async fn test_admin_delete_event_order() {
		let engine = engine_with_alice().await;
		let first = engine.create_order(alice(), 10).await.unwrap();
		let second = engine.create_order(alice(), 20).await.unwrap();
		engine.confirm_order(alice(), first).await.unwrap();
		engine.confirm_order(alice(), second).await.unwrap();
		let before = journal_len(&engine).await;

		engine
			.admin_delete_profile_and_orders(owner(), alice())
			.await
			.unwrap();

		let journal = engine.events(before, 100).await.unwrap();
		let events: Vec<_> = journal.into_iter().map(|r| r.event).collect();
		assert_eq!(
			events,
			vec![
				LedgerEvent::Order(OrderEvent::Cancelled {
					id: first,
					customer: alice()
				}),
				LedgerEvent::Order(OrderEvent::Cancelled {
					id: second,
					customer: alice()
				}),
				LedgerEvent::Profile(ProfileEvent::Deleted { identity: alice() }),
			]
		);
	}
}
