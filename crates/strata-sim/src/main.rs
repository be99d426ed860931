use std::error::Error;

use clap::{Parser, Subcommand};
use strata_sim::commands::{
    allocate::{self, AllocateArgs},
    replicate::{self, ReplicateArgs},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "strata-sim", about = "Stratified treatment allocation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate a cohort once and write the allocation artefacts.
    Allocate(AllocateArgs),
    /// Allocate a cohort repeatedly on independent seeds and summarise arm shares.
    Replicate(ReplicateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Allocate(args) => allocate::run(&args).map(|_| ()),
        Command::Replicate(args) => replicate::run(&args).map(|_| ()),
    }
}
