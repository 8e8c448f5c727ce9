//! scrapyd-client binary entrypoint.
//!
//! # Usage
//!
//! ```bash
//! scrapyd-client targets
//! scrapyd-client -t production spiders -p 'demo*'
//! scrapyd-client schedule -p demo quotes --arg setting=DOWNLOAD_DELAY=2
//! ```
//!
//! # Environment Variables
//!
//! - `SCRAPYD_TARGET`, `SCRAPYD_USERNAME`, `SCRAPYD_PASSWORD`: global flag defaults
//! - `SCRAPY_CONFIG`: extra configuration file
//! - `NETRC`: credentials file (default `~/.netrc`)
//! - `RUST_LOG`: log filter

use std::io;
use std::process::ExitCode;

use clap::Parser;

use scrapyd_cli::cli::Cli;
use scrapyd_cli::logging::log_filter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = log_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(scrapyd_cli::run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.report());
            ExitCode::from(e.exit_code())
        }
    }
}
