//! User profile record.

use crate::OrderId;
use serde::{Deserialize, Serialize};

/// Per-identity display attributes plus active and completed order lists.
///
/// A profile exists iff `name` is non-empty; a missing storage entry is
/// indistinguishable from `Profile::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	pub name: String,
	/// Stored as text; no numeric validation.
	pub age: String,
	/// Ids of orders in `Created` or `Confirmed`. Order is unspecified after removals.
	#[serde(default)]
	pub current_orders: Vec<OrderId>,
	/// Append-only history of delivered order ids.
	#[serde(default)]
	pub completed_orders: Vec<OrderId>,
}

impl Profile {
	pub fn exists(&self) -> bool {
		!self.name.is_empty()
	}

	/// Removes `id` from the current orders by swapping in the last element.
	///
	/// Returns false if the id was not present.
	pub fn remove_current_order(&mut self, id: OrderId) -> bool {
		swap_remove_value(&mut self.current_orders, &id)
	}

	/// Moves `id` from the current orders to the completed history.
	pub fn complete_order(&mut self, id: OrderId) -> bool {
		if !self.remove_current_order(id) {
			return false;
		}
		self.completed_orders.push(id);
		true
	}
}

/// Finds `value` and replaces its slot with the last element, shrinking by one.
fn swap_remove_value<T: PartialEq>(items: &mut Vec<T>, value: &T) -> bool {
	match items.iter().position(|item| item == value) {
		Some(index) => {
			items.swap_remove(index);
			true
		},
		None => false,
	}
}
