//! In-process event bus.
//!
//! Broadcasts ledger events to any number of subscribers. Publishing with no
//! subscribers drops the event; the persisted journal remains the record.

use ledger_types::EventRecord;
use tokio::sync::broadcast;

/// Default number of events buffered per subscriber before lagging.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cloneable handle to a broadcast channel of journaled events.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<EventRecord>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
		self.sender.subscribe()
	}

	/// Publishes an event, returning the number of subscribers that received it.
	pub fn publish(
		&self,
		record: EventRecord,
	) -> Result<usize, broadcast::error::SendError<EventRecord>> {
		self.sender.send(record)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
