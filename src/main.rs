//! kc - read and write persistent, schema-validated configuration.

use std::process;

use clap::Parser;
use keepconf::cli::{Cli, Commands};
use keepconf::commands::{self, Output};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `KC_LOG=debug`).
const LOG_ENV: &str = "KC_LOG";

fn main() {
    init_logging();

    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run_command(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Send library logs to stderr, filtered by `KC_LOG` (default: warn).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(cli: Cli) -> keepconf::Result<()> {
    let human = cli.human_readable;
    let mut config = commands::open(&cli.config)?;

    match cli.command {
        Commands::Get { key } => {
            let result = commands::get(&config, key.as_deref());
            output(&result, human);
        }
        Commands::Set { key, value } => {
            let result = commands::set(&mut config, &key, &value)?;
            output(&result, human);
        }
        Commands::Has { key } => {
            let result = commands::has(&config, &key);
            output(&result, human);
        }
        Commands::Delete { key } => {
            let result = commands::delete(&mut config, key.as_deref())?;
            output(&result, human);
        }
        Commands::Path => {
            let result = commands::path(&config);
            output(&result, human);
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
