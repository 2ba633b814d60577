//! Configuration builder for tests and local development.

use crate::{Config, LedgerConfig, StorageConfig};
use ledger_types::Identity;
use std::collections::HashMap;

/// Builds [`Config`] values with in-memory storage defaults.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	ledger_id: String,
	owner: Identity,
	storage_primary: String,
	storage_implementations: HashMap<String, toml::Value>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		let mut storage_implementations = HashMap::new();
		storage_implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);

		let mut owner = [0u8; Identity::LEN];
		owner[Identity::LEN - 1] = 0x01;

		Self {
			ledger_id: "test-ledger".to_string(),
			owner: Identity(owner),
			storage_primary: "memory".to_string(),
			storage_implementations,
		}
	}

	pub fn ledger_id(mut self, id: impl Into<String>) -> Self {
		self.ledger_id = id.into();
		self
	}

	pub fn owner(mut self, owner: Identity) -> Self {
		self.owner = owner;
		self
	}

	/// Selects the primary storage implementation.
	pub fn storage_primary(mut self, primary: impl Into<String>) -> Self {
		self.storage_primary = primary.into();
		self
	}

	/// Adds or replaces a storage implementation's configuration table.
	pub fn storage_implementation(mut self, name: impl Into<String>, config: toml::Value) -> Self {
		self.storage_implementations.insert(name.into(), config);
		self
	}

	pub fn build(self) -> Config {
		Config {
			ledger: LedgerConfig {
				id: self.ledger_id,
				owner: self.owner,
			},
			storage: StorageConfig {
				primary: self.storage_primary,
				implementations: self.storage_implementations,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_use_memory_storage() {
		let config = ConfigBuilder::new().build();
		assert_eq!(config.storage.primary, "memory");
		assert!(config.storage.implementations.contains_key("memory"));
		assert!(!config.ledger.owner.is_null());
	}

	#[test]
	fn test_overrides() {
		let owner = Identity([9; Identity::LEN]);
		let config = ConfigBuilder::new()
			.ledger_id("custom")
			.owner(owner)
			.build();
		assert_eq!(config.ledger.id, "custom");
		assert_eq!(config.ledger.owner, owner);
	}
}
