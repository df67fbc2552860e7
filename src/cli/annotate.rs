//! CLI entry-point for printing annotations without logging them.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    nlp::{self, render},
    pipeline,
};

/// Args for the `annotate` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Override the input text file.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Print rendered HTML instead of JSON.
    #[arg(long)]
    pub html: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let input = args.input.unwrap_or_else(|| settings.input_path.clone());
    let recognizer = nlp::load_recognizer(&settings)?;
    let lines = pipeline::read_lines(&input)?;
    let annotations = pipeline::annotate_lines(recognizer.as_ref(), &lines)?;

    let mut out = io::stdout().lock();
    for annotation in &annotations {
        if args.html {
            writeln!(out, "{}", render::render_html(annotation)?)?;
        } else {
            writeln!(out, "{}", serde_json::to_string(annotation)?)?;
        }
    }
    info!(lines = annotations.len(), "printed annotations");
    Ok(())
}
