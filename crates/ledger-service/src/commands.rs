//! Subcommands of the ledger host and their dispatch onto the engine.

use clap::Subcommand;
use ledger_core::{LedgerEngine, LedgerError};
use ledger_types::{Identity, OrderId};
use serde_json::{json, Value};

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Register the caller, or update its name and age
	Register {
		#[arg(long)]
		name: String,
		#[arg(long)]
		age: String,
	},
	/// Delete the caller's profile
	DeleteProfile,
	/// Cancel a profile's orders and delete it (owner only)
	AdminDelete {
		#[arg(long)]
		target: Identity,
	},
	/// Show a profile's name and age (owner only)
	Profile {
		#[arg(long)]
		target: Identity,
	},
	/// Place an order as the caller
	CreateOrder {
		#[arg(long)]
		amount: u64,
	},
	/// Confirm an order
	Confirm {
		#[arg(long)]
		id: OrderId,
	},
	/// Confirm delivery of an order
	Deliver {
		#[arg(long)]
		id: OrderId,
	},
	/// Cancel a confirmed order
	Cancel {
		#[arg(long)]
		id: OrderId,
	},
	/// Show an order's state
	State {
		#[arg(long)]
		id: OrderId,
	},
	/// Show an order record
	Order {
		#[arg(long)]
		id: OrderId,
	},
	/// List a profile's current orders (owner only)
	Orders {
		#[arg(long)]
		target: Identity,
	},
	/// List the caller's current orders
	MyOrders,
	/// List the caller's delivered orders
	MyCompleted,
	/// Print journaled events
	Events {
		#[arg(long, default_value_t = 0)]
		from: u64,
		#[arg(long, default_value_t = 100)]
		limit: u64,
	},
}

/// Runs `command` as `caller` and renders the result as JSON.
pub async fn execute(
	engine: &LedgerEngine,
	caller: Identity,
	command: Command,
) -> Result<Value, LedgerError> {
	let output = match command {
		Command::Register { name, age } => {
			engine.new_user_profile(caller, &name, &age).await?;
			json!({ "identity": caller, "name": name, "age": age })
		},
		Command::DeleteProfile => {
			engine.delete_profile(caller).await?;
			json!({ "deleted": caller })
		},
		Command::AdminDelete { target } => {
			engine.admin_delete_profile_and_orders(caller, target).await?;
			json!({ "deleted": target })
		},
		Command::Profile { target } => {
			let (name, age) = engine.get_profile(caller, target).await?;
			json!({ "identity": target, "name": name, "age": age })
		},
		Command::CreateOrder { amount } => {
			let id = engine.create_order(caller, amount).await?;
			json!({ "id": id })
		},
		Command::Confirm { id } => {
			engine.confirm_order(caller, id).await?;
			json!({ "id": id, "state": "Confirmed" })
		},
		Command::Deliver { id } => {
			engine.confirm_delivery(caller, id).await?;
			json!({ "id": id, "state": "Delivered" })
		},
		Command::Cancel { id } => {
			engine.cancel_order(caller, id).await?;
			json!({ "id": id, "state": "Cancelled" })
		},
		Command::State { id } => {
			let state = engine.get_order_state(id).await?;
			json!({ "id": id, "state": state })
		},
		Command::Order { id } => json!(engine.get_order(id).await?),
		Command::Orders { target } => json!(engine.get_orders(caller, target).await?),
		Command::MyOrders => json!(engine.get_my_orders(caller).await?),
		Command::MyCompleted => json!(engine.get_my_completed_orders(caller).await?),
		Command::Events { from, limit } => json!(engine.events(from, limit).await?),
	};
	Ok(output)
}
