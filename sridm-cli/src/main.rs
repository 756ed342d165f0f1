//! sridm -- SR OS IPsec debug output analyzer
//!
//! Extracts `DEBUG #2001` messages from a debug capture or a replayed live
//! feed, correlates IKEv2 IDi with remote tunnel endpoints, and prints the
//! endpoints and messages of tunnels whose IDi matches a pattern.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use cli::{Cli, Commands};
use commands::report::MatchSettings;
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    let loaded = commands::config::load_effective(config_path).await;

    // An invalid file still gets logging, so `config validate` can report it
    let mut general = loaded
        .as_ref()
        .map(|config| config.general.clone())
        .unwrap_or_default();
    if let Some(level) = cli.log_level {
        general.log_level = level;
    }
    init_logging(&general)?;
    sridm_core::metrics::describe_all();

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
        Commands::File(args) => {
            let config = loaded?;
            let settings = MatchSettings::resolve(&config.analyzer, &cli.matching);
            debug!(?settings, "effective match settings");
            commands::file::execute(args, &config, &settings, &writer).await
        }
        Commands::Feed(args) => {
            let config = loaded?;
            let settings = MatchSettings::resolve(&config.analyzer, &cli.matching);
            debug!(?settings, "effective match settings");
            commands::feed::execute(args, &config, &settings, &writer).await
        }
    }
}

fn init_logging(general: &sridm_core::config::GeneralConfig) -> Result<(), CliError> {
    logging::init_tracing(general).map_err(|e: anyhow::Error| CliError::Config(e.to_string()))
}
