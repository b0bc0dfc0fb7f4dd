//! CreditMarket replay tool.
//!
//! Runs a JSON operation script against a fresh engine and prints one JSON
//! line per command, followed by a summary line.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use creditmarket_ledger::MarketEngine;
use creditmarket_types::{MarketConfig, constants};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod script;

/// Replay a CreditMarket operation script
#[derive(Parser, Debug)]
#[command(name = "creditmarket")]
#[command(about = "Replay a JSON operation script against a CreditMarket ledger")]
#[command(version = constants::VERSION)]
struct Args {
    /// Path to the JSON script (array of commands)
    #[arg(short, long)]
    script: PathBuf,

    /// Path to a JSON engine config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Check supply conservation after every mutation
    #[arg(long)]
    verify_supply: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    // Logs go to stderr so stdout stays machine-readable.
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load the engine config, defaulting when no file is given. `--verify-supply`
/// can only switch per-operation checking on.
fn load_config(path: Option<&Path>, verify_supply: bool) -> anyhow::Result<MarketConfig> {
    let mut config = match path {
        Some(path) => MarketConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MarketConfig::default(),
    };
    if verify_supply {
        config.verify_supply_after_each_op = true;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = load_config(args.config.as_deref(), args.verify_supply)?;

    let commands = script::load(&args.script)?;
    info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        commands = commands.len(),
        "Replaying script"
    );

    let mut engine = MarketEngine::with_config(config)?;
    let (outcomes, summary) = script::run(&mut engine, &commands);

    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }
    println!("{}", serde_json::to_string(&summary)?);

    info!(
        steps = summary.steps,
        failed = summary.failed,
        digest = %summary.state_digest,
        "Replay complete"
    );
    Ok(())
}
