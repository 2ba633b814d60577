//! Command-line host for the ledger engine.
//!
//! Each invocation loads the configuration, opens the ledger over the
//! configured storage, applies one operation as the given caller identity
//! and prints the result as JSON.

use clap::Parser;
use ledger_config::Config;
use ledger_core::{LedgerBuilder, LedgerEngine, LedgerFactories};
use ledger_types::Identity;
use std::path::PathBuf;

mod commands;

use commands::Command;

/// Command-line arguments for the ledger host.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Identity the operation is performed as. Defaults to the configured owner.
	#[arg(long, env = "LEDGER_CALLER")]
	caller: Option<Identity>,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr so stdout carries only the JSON result
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.ledger.id);

	let engine = build_engine(config).await?;
	let caller = args.caller.unwrap_or_else(|| engine.owner());

	let output = commands::execute(&engine, caller, args.command).await?;
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

/// Builds the engine with every built-in storage implementation available.
async fn build_engine(config: Config) -> Result<LedgerEngine, Box<dyn std::error::Error>> {
	let storage_factories = ledger_storage::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();

	let engine = LedgerBuilder::new(config)
		.build(LedgerFactories { storage_factories })
		.await?;
	Ok(engine)
}

#[cfg(test)]
mod tests {
	use super::*;
	use ledger_config::builders::config::ConfigBuilder;
	use tempfile::tempdir;

	#[test]
	fn test_args_parse_subcommand() {
		let args = Args::try_parse_from([
			"ledger",
			"--caller",
			"0x00000000000000000000000000000000000000a1",
			"create-order",
			"--amount",
			"100",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
		assert!(args.caller.is_some());
		assert!(matches!(args.command, Command::CreateOrder { amount: 100 }));
	}

	#[test]
	fn test_args_reject_bad_caller() {
		let result = Args::try_parse_from(["ledger", "--caller", "0x12", "my-orders"]);
		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_build_engine_with_memory_config() {
		let config = ConfigBuilder::new().build();
		let engine = build_engine(config).await.unwrap();
		assert_eq!(engine.next_order_id().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_build_engine_from_file_config() {
		let temp_dir = tempdir().unwrap();
		let config_path = temp_dir.path().join("ledger.toml");
		let storage_dir = temp_dir.path().join("data");

		let config_content = format!(
			r#"
[ledger]
id = "file-ledger"
owner = "0x00000000000000000000000000000000000000ee"

[storage]
primary = "file"
[storage.implementations.file]
storage_path = "{}"
"#,
			storage_dir.display()
		);
		std::fs::write(&config_path, config_content).unwrap();

		let config = Config::from_file(config_path.to_str().unwrap())
			.await
			.unwrap();
		let engine = build_engine(config).await.unwrap();
		assert_eq!(
			engine.owner().to_string(),
			"0x00000000000000000000000000000000000000ee"
		);
	}
}
