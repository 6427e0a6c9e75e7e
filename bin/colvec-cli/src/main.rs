// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # colvec
//!
//! Command-line interface for budgeted columnar vectors.
//!
//! ## Usage
//! ```bash
//! # Run a scripted workload and print allocator statistics
//! colvec run --config ./workload.toml
//!
//! # Same, as JSON
//! colvec run --config ./workload.toml --json
//!
//! # Show per-type allocation limits
//! colvec limits
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "colvec",
    about = "Fixed-width columnar vectors under a hierarchical memory budget",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a vector workload described by a TOML file.
    Run {
        /// Path to the workload configuration.
        #[arg(short, long)]
        config: std::path::PathBuf,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print element width, default allocation, and ceiling per vector type.
    Limits {
        /// Print the table as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { config, json } => commands::run::execute(&config, json),
        Commands::Limits { json } => commands::limits::execute(json),
    }
}
