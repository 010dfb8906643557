//! Parley CLI and HTTP server entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration, initializes tracing, then
//! dispatches to the requested command.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use parley_infra::config::{load_config, resolve_data_dir};
use parley_observe::tracing_setup::{TracingOptions, init_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    // Config is read before the subscriber exists, so its warnings go unlogged
    let data_dir = resolve_data_dir();
    let config = load_config(cli.config.as_deref(), &data_dir).await;

    let options = TracingOptions::from_verbosity(cli.verbose, cli.quiet)
        .with_json(cli.log_json)
        .with_otel(config.enable_otel);
    let tracing_guard = init_tracing(&options).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let result = match cli.command {
        Commands::Serve { host, port } => {
            cli::serve::run(config, &data_dir, host, port, cli.quiet).await
        }
        Commands::Migrate => cli::migrate::run(&config, &data_dir, cli.quiet).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    tracing_guard.shutdown();
    result
}
