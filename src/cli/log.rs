//! CLI entry-point for the annotate-and-log pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::{Settings, TrackingMode},
    nlp,
    pipeline::{self, LogTarget},
    tracking,
};

/// Args for the `log` command.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct Args {
    /// Override the input text file.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Override the tracking project.
    #[arg(long)]
    pub project: Option<String>,
    /// Override the tracking mode.
    #[arg(long, value_enum)]
    pub mode: Option<TrackingMode>,
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(input) = self.input {
            settings.input_path = input;
        }
        if let Some(project) = self.project {
            settings.project = project;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        settings
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let settings = args.apply(settings);
    let recognizer = nlp::load_recognizer(&settings)?;
    let tracker = tracking::connect(&settings)?;
    let target = LogTarget::from(&settings);
    let summary = pipeline::run(
        &settings.input_path,
        recognizer.as_ref(),
        tracker.as_ref(),
        &target,
    )
    .await?;
    println!("run {} logged {} rows", summary.run_id, summary.rows);
    Ok(())
}
