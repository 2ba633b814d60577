//! Builder for constructing ledger engines.
//!
//! Turns a [`Config`] into a running [`LedgerEngine`] by instantiating the
//! configured storage implementations through their factory functions.

use crate::engine::{event_bus::EventBus, LedgerEngine};
use ledger_config::Config;
use ledger_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building an engine.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Engine error: {0}")]
	Engine(String),
}

/// Factory functions available to the builder, keyed by implementation name.
pub struct LedgerFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builds a [`LedgerEngine`] from configuration.
pub struct LedgerBuilder {
	config: Config,
	event_bus: EventBus,
}

impl LedgerBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			event_bus: EventBus::default(),
		}
	}

	/// Uses an existing event bus instead of a fresh one.
	pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
		self.event_bus = event_bus;
		self
	}

	/// Builds the engine over the primary storage implementation.
	pub async fn build<SF>(self, factories: LedgerFactories<SF>) -> Result<LedgerEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;
		let storage_config = self
			.config
			.storage
			.implementations
			.get(primary)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage '{}' not found in implementations",
					primary
				))
			})?;

		let factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"No factory registered for storage implementation '{}'",
				primary
			))
		})?;

		let backend = match factory(storage_config) {
			Ok(backend) => {
				tracing::info!(component = "storage", implementation = %primary, "Loaded");
				backend
			},
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			},
		};

		let storage = Arc::new(StorageService::new(backend));
		LedgerEngine::new(self.config, storage, self.event_bus)
			.await
			.map_err(|e| BuilderError::Engine(e.to_string()))
	}
}
