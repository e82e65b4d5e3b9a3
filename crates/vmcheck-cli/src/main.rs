//! vmcheck CLI: the `vmcheck` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Run {
            snapshots,
            config,
            property_key,
            no_metrics,
            json,
        } => commands::run::run(commands::run::Args {
            snapshots,
            config,
            property_key,
            no_metrics,
            json,
        }),

        Commands::Classify {
            snapshot,
            config,
            property_key,
            json,
        } => commands::classify::run(snapshot, config, property_key, json),
    }
}
