//! Build Rule Enforcer - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `enforcer check` | Run the configured rules against the current directory |
//! | `enforcer check --module a --module b --parallel` | One pass per module, sharing the result cache |
//! | `enforcer list` | Show every registered rule |
//!
//! Exit status is non-zero when the build must fail.

// Force-link enforcer-rules to ensure linkme registrations are included
extern crate enforcer_rules;

mod cli;

use clap::Parser;
use std::process::ExitCode;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
