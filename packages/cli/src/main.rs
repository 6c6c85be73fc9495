mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, eval, CheckArgs, EvalArgs};
use tracing_subscriber::EnvFilter;

/// Element Adapter CLI - container-relative queries for elements
#[derive(Parser, Debug)]
#[command(name = "element-adapter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log compilation and evaluation details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a config and show what its queries watch and measure
    Check(CheckArgs),

    /// Evaluate one query against the given property values
    Eval(EvalArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Check(args) => check(args, &cwd),
            Command::Eval(args) => eval(args),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
