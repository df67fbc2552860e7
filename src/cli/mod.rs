//! Command-line interface wiring for entity-tracker.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod annotate;
pub mod log;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Named entity annotation logged to an experiment tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command; `log` with configured defaults when none is given.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Some(Commands::Log(args)) => log::run(args, settings).await,
            Some(Commands::Annotate(args)) => annotate::run(args, settings).await,
            None => log::run(log::Args::default(), settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Annotate the input file and log the entity table to the tracker.
    Log(log::Args),
    /// Annotate the input file and print the results without logging.
    Annotate(annotate::Args),
}
