//! # read-substrait: Print a Serialized Substrait Plan
//!
//! Loads a protobuf-encoded Substrait plan from disk and prints it to stdout.
//!
//! ```text
//! plan file
//!   |
//!   +-> mohair_substrait::PlanMessage::substrait_from_file
//!   +-> (optional) root resolution
//!   +-> stringify (text or JSON)
//!   |
//!   v
//! stdout
//! ```
//!
//! ## Usage
//!
//! ```text
//! read-substrait [-h] [-j] [-r] -f <path-to-substrait-file>
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: the plan was loaded and printed.
//! - `1`: help was requested, `-f` was missing, arguments were invalid, or the plan
//!   could not be loaded or rendered.
//!
//! ## Configuration
//!
//! Logging goes to stderr and is controlled by the `RUST_LOG` environment variable
//! (defaults to `mohair=info,read_substrait=info`).

mod tool;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use mohair_substrait::config::LibraryConfig;
use tracing_subscriber::EnvFilter;

use crate::tool::{ToolArgs, ToolError, ToolInterface};

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout only ever carries the rendered plan.
    let mut filter = EnvFilter::from_default_env();
    for directive in ["mohair=info", "read_substrait=info"] {
        filter = filter.add_directive(
            directive
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
        );
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match ToolArgs::try_parse() {
        Ok(args) => args,
        Err(err) if err.kind() == ErrorKind::DisplayVersion => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        println!("{}", ToolArgs::usage());
        return ExitCode::FAILURE;
    }

    let config = LibraryConfig::from_build();
    tracing::debug!(version = %config.version, "read-substrait starting");

    let tool = ToolInterface::new(args, config);
    match tool.start(&mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        // the library logs its own failures where they happen
        Err(ToolError::Plan(_)) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
