//! Order state machine.
//!
//! Orders move `Created -> Confirmed -> Delivered`, or `Confirmed -> Cancelled`.
//! `Delivered` and `Cancelled` are terminal. The machine only validates; the
//! engine applies the new state together with the profile bookkeeping.

use ledger_types::{Order, OrderId, OrderState};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Precondition violations for a requested transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderStateError {
	#[error("Order {id} is already {state}")]
	AlreadyInState { id: OrderId, state: OrderState },
	#[error("Order {0} is already cancelled")]
	AlreadyCancelled(OrderId),
	#[error("Order {0} is already delivered")]
	AlreadyDelivered(OrderId),
	#[error("Order {0} is not confirmed")]
	NotConfirmed(OrderId),
}

/// Allowed next states for each state. Terminal states map to the empty set.
static TRANSITIONS: Lazy<HashMap<OrderState, HashSet<OrderState>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(OrderState::Created, HashSet::from([OrderState::Confirmed]));
	m.insert(
		OrderState::Confirmed,
		HashSet::from([OrderState::Delivered, OrderState::Cancelled]),
	);
	m.insert(OrderState::Delivered, HashSet::new());
	m.insert(OrderState::Cancelled, HashSet::new());
	m
});

/// Validates order state transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderStateMachine;

impl OrderStateMachine {
	pub fn new() -> Self {
		Self
	}

	/// Checks if a state transition is valid.
	pub fn is_valid_transition(from: OrderState, to: OrderState) -> bool {
		TRANSITIONS
			.get(&from)
			.is_some_and(|set| set.contains(&to))
	}

	/// Validates moving `order` to `to`, reporting why it is refused.
	pub fn check_transition(&self, order: &Order, to: OrderState) -> Result<(), OrderStateError> {
		let from = order.state;
		if Self::is_valid_transition(from, to) {
			return Ok(());
		}

		let id = order.id;
		Err(match (to, from) {
			(OrderState::Delivered | OrderState::Cancelled, OrderState::Delivered) => {
				OrderStateError::AlreadyDelivered(id)
			},
			(OrderState::Cancelled, OrderState::Cancelled) => OrderStateError::AlreadyCancelled(id),
			(OrderState::Delivered | OrderState::Cancelled, _) => OrderStateError::NotConfirmed(id),
			(OrderState::Created | OrderState::Confirmed, state) => {
				OrderStateError::AlreadyInState { id, state }
			},
		})
	}

	/// Validates and applies a transition to `order`.
	pub fn transition(&self, order: &mut Order, to: OrderState) -> Result<(), OrderStateError> {
		self.check_transition(order, to)?;
		order.state = to;
		Ok(())
	}
}
