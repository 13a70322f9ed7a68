mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{estimate, frame};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Frame(args) => frame::run(&cli, args),
        Commands::Estimate(args) => estimate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
