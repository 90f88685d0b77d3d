
mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};
use commands::{centroids, convert};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    logging::setup_trace(cli.verbose);

    match &cli.command {
        Commands::Centroids(args) => centroids::run(&cli, args),
        Commands::Convert(args) => convert::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
