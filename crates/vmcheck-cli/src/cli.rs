use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vmcheck",
    about = "vmcheck: fleet-wide VM property consistency checks reported as gauges",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one check cycle per snapshot and print reports plus metrics
    Run {
        /// Fleet snapshot JSONL; repeat to replay several cycles in order
        #[arg(long = "snapshot", required = true)]
        snapshots: Vec<String>,

        /// Optional TOML config file
        #[arg(long)]
        config: Option<String>,

        /// Override the extraConfig property key
        #[arg(long)]
        property_key: Option<String>,

        /// Skip the Prometheus exposition after the reports
        #[arg(long)]
        no_metrics: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify each node of one snapshot without touching metrics
    Classify {
        /// Fleet snapshot JSONL
        #[arg(long)]
        snapshot: String,

        /// Optional TOML config file
        #[arg(long)]
        config: Option<String>,

        /// Override the extraConfig property key
        #[arg(long)]
        property_key: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
