//! routescope CLI - HTTP endpoint discovery for controller hierarchies.
//!
//! Usage:
//!   routescope scan <ROOT>...              # Resolve endpoints (text)
//!   routescope scan <ROOT> -f json         # Same, as JSON
//!   routescope scan <ROOT> --strict        # Exit 2 on warnings
//!   routescope resolve parsed.json         # Resolve external front-end output
//!   routescope chain <CLASS> <ROOT>...     # Superclass chain of a class
//!   routescope classes <ROOT>...           # Indexed classes

use clap::Parser;
use routescope::cli::{log_level, run, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report
    let filter = if cli.verbose > 0 {
        EnvFilter::new(log_level(cli.verbose))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(0)))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
