//! Experiment tracking clients: online, offline and disabled runs.

pub mod error;
pub mod http;
pub mod offline;
pub mod table;

use async_trait::async_trait;
use indexmap::IndexMap;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Settings, TrackingMode};

pub use error::{Result, TrackingError};
pub use http::HttpTracker;
pub use offline::OfflineTracker;
pub use table::Table;

/// Keyed values logged as one step of a run.
pub type LogPayload = IndexMap<String, Value>;

/// Opens runs within a project.
#[async_trait]
pub trait Tracker: Send + Sync {
    async fn init(&self, project: &str) -> Result<Box<dyn Run>>;
}

/// An open tracking run. `finish` must be called once; nothing may be logged after it.
#[async_trait]
pub trait Run: Send {
    fn id(&self) -> &str;

    async fn log(&mut self, payload: LogPayload) -> Result<()>;

    async fn finish(&mut self, exit_code: i32) -> Result<()>;
}

/// Random lowercase alphanumeric run id.
pub fn new_run_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Step counter and finished flag shared by every run implementation.
#[derive(Debug, Clone)]
pub(crate) struct RunState {
    pub(crate) id: String,
    step: u64,
    finished: bool,
}

impl RunState {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            step: 0,
            finished: false,
        }
    }

    /// Claim the next step number.
    pub(crate) fn next_step(&mut self) -> Result<u64> {
        if self.finished {
            return Err(TrackingError::RunFinished(self.id.clone()));
        }
        let step = self.step;
        self.step += 1;
        Ok(step)
    }

    pub(crate) fn mark_finished(&mut self) -> Result<()> {
        if self.finished {
            return Err(TrackingError::RunFinished(self.id.clone()));
        }
        self.finished = true;
        Ok(())
    }
}

/// Accepts runs and discards everything logged to them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTracker;

#[async_trait]
impl Tracker for DisabledTracker {
    async fn init(&self, project: &str) -> Result<Box<dyn Run>> {
        let state = RunState::new(format!("disabled-{}", new_run_id()));
        info!(%project, run = %state.id, "tracking disabled; run will be discarded");
        Ok(Box::new(DisabledRun { state }))
    }
}

struct DisabledRun {
    state: RunState,
}

#[async_trait]
impl Run for DisabledRun {
    fn id(&self) -> &str {
        &self.state.id
    }

    async fn log(&mut self, payload: LogPayload) -> Result<()> {
        let step = self.state.next_step()?;
        debug!(step, keys = ?payload.keys().collect::<Vec<_>>(), "discarding payload");
        Ok(())
    }

    async fn finish(&mut self, _exit_code: i32) -> Result<()> {
        self.state.mark_finished()
    }
}

/// Build the tracker for the configured mode.
pub fn connect(settings: &Settings) -> anyhow::Result<Box<dyn Tracker>> {
    let tracker: Box<dyn Tracker> = match settings.mode {
        TrackingMode::Online => Box::new(HttpTracker::new(
            &settings.base_url,
            settings.api_key.clone(),
            settings.entity.clone(),
        )?),
        TrackingMode::Offline => Box::new(OfflineTracker::new(&settings.runs_dir)),
        TrackingMode::Disabled => Box::new(DisabledTracker),
    };
    info!(mode = ?settings.mode, "connected tracker");
    Ok(tracker)
}
