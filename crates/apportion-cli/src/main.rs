//! Apportion CLI - Command-line interface for the allocation calculators.
//!
//! # Usage
//!
//! ```bash
//! # Size leveraged positions against a margin budget
//! apportion margin --portfolio positions.csv --balance 10000 --margin-fraction 0.4
//!
//! # Same table, one dial instrument soaks up the budget
//! apportion margin --portfolio positions.csv --balance 10000 --margin-fraction 0.4 --single-dial
//!
//! # Spend a deposit across target weights
//! apportion invest --portfolio funds.csv --cash 1000
//!
//! # Review where next month's contribution should go
//! apportion invest --portfolio funds.csv --cash 150 --monthly 100
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod error;
mod input;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = cli.format;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Margin(args) => commands::margin::execute(args, format, quiet)?,
        Commands::Invest(args) => commands::invest::execute(args, format, quiet)?,
    }

    Ok(())
}
