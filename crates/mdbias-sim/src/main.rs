use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    evaluate::{self, EvaluateArgs},
    version::{self, VersionArgs},
};
use env_logger::Env;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "mdbias", about = "Enhanced-sampling bias driver for MD hosts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the crate version and, with a kernel, the library API version.
    Version(VersionArgs),
    /// Validate a force configuration against a particle count.
    Check(CheckArgs),
    /// Evaluate the bias over a sequence of position frames.
    Evaluate(EvaluateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Version(args) => version::run(&args),
        Command::Check(args) => check::run(&args),
        Command::Evaluate(args) => evaluate::run(&args),
    }
}
