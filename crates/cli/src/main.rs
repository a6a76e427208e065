// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! falcon: CLI entry point.
//!
//! Exit codes: 0 success, 1 usage or precondition failure, 2 transient
//! error worth retrying.

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "falcon", about = "Project-management orchestrator for coding agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the current repository for falcon.
    Init {
        /// Project display name (defaults to the repo directory name).
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the repo scope, falcon home, and worktree state.
    Status,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Init { name } => commands::init::run(name),
        Commands::Status => commands::status::run(),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(e.code);
    }
}
