//! roadreach CLI - bounded edge reachability for road networks.
//!
//! Usage:
//!   roadreach reach --graph net.json --edge 12         # Reach of one edge
//!   roadreach scan --graph net.bin --min-reach 20      # Poorly connected edges
//!   roadreach stats --graph net.bin                    # Graph statistics
//!   roadreach convert --graph net.json --out net.bin   # Write a snapshot
//!
//! Output is JSON on stdout; logs go to stderr (RUST_LOG controls the level).

use clap::Parser;
use roadreach::cli::{run, Cli};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
