//! Tributary CLI - maximum flow and tiered attribution for capacitated networks.

mod commands;
mod network;
mod report;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tributary")]
#[command(author, version, about = "Edmonds-Karp max flow with tiered attribution", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a network and print attributed origin-to-destination flows
    Solve(commands::solve::SolveArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Solve(args) => commands::solve::run(args),
    }
}
