// mvprep-cli/src/main.rs
//
// Entry point for the `mvprep` binary.
//
// Responsibilities include:
// - Parsing command-line arguments.
// - Setting up console (and optional file) logging.
// - Loading configuration from file, environment and flags.
// - Dispatching to the subcommand and mapping failures to the exit code.

use clap::Parser;
use log::{debug, error, info};
use mvprep_cli::commands::load_config;
use mvprep_cli::{Cli, Commands, logging, run_harmonize, run_prepare, run_split};
use std::process;

fn main() {
    let cli = Cli::parse();

    match logging::init(cli.verbose, cli.log_dir.as_deref()) {
        Ok(Some(log_path)) => info!("Writing run log to {}", log_path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        debug!("Configuration: {:?}", config);
        match cli.command {
            Commands::Harmonize(args) => run_harmonize(args, config),
            Commands::Split(args) => run_split(args, config),
            Commands::Prepare(args) => run_prepare(args, config),
        }
    });

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
