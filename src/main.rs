//! `entity-tracker` binary: logging, settings, then the selected command.

use anyhow::Result;
use entity_tracker::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load()?;

    info!(command = ?cli, "entity-tracker starting");
    cli.dispatch(settings).await
}
