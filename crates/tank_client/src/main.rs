//! Battle tanks client.
//!
//! Reads server messages as JSON lines on stdin and answers with tank
//! commands as JSON lines on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Play as team "alpha" with default settings
//! cargo run -p tank_client -- --team alpha --token 1f2e3d
//!
//! # Grid routing from a config file, with debug logs
//! cargo run -p tank_client -- --team alpha --config tank.ron --verbose
//! ```
//!
//! Logs go to stderr. `RUST_LOG` overrides `--verbose`.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tank_client::{Commander, Runner};
use tank_core::config::EngineConfig;

#[derive(Parser)]
#[command(name = "tank_client")]
#[command(about = "Battle tanks client: routes and fights a team of tanks")]
#[command(version)]
struct Cli {
    /// Team name as registered with the server
    #[arg(short, long)]
    team: String,

    /// Client token issued by the server
    #[arg(long, default_value = "")]
    token: String,

    /// Engine configuration file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "Failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    tracing::info!(team = %cli.team, strategy = ?config.strategy, "Starting battle tanks client");

    let commander = Commander::new(cli.team, cli.token, config);
    let mut runner = Runner::new(commander);
    match runner.run(io::stdin().lock(), io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "I/O failure");
            ExitCode::FAILURE
        }
    }
}
