//! Offline tracker appending run records to local JSONL files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::{fs, io::AsyncWriteExt};
use tracing::info;

use super::{new_run_id, LogPayload, Result, Run, RunState, Tracker, TrackingError};

/// Writes each run to `{root}/{project}/{run_id}.jsonl`.
#[derive(Debug, Clone)]
pub struct OfflineTracker {
    root: PathBuf,
}

impl OfflineTracker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the record file for a run. Path separators in the project
    /// are flattened; empty and dot-only names are rejected.
    pub fn run_path(&self, project: &str, run_id: &str) -> Result<PathBuf> {
        let dir: String = project
            .trim()
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        if dir.chars().all(|c| c == '.') {
            return Err(TrackingError::InvalidProject(project.to_string()));
        }
        Ok(self.root.join(dir).join(format!("{run_id}.jsonl")))
    }
}

async fn append(path: &Path, record: &Value) -> Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&line).await?;
    file.flush().await?;
    Ok(())
}

#[async_trait]
impl Tracker for OfflineTracker {
    async fn init(&self, project: &str) -> Result<Box<dyn Run>> {
        let state = RunState::new(new_run_id());
        let path = self.run_path(project, &state.id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let record = json!({
            "type": "init",
            "run": state.id,
            "project": project,
            "timestamp": Utc::now().to_rfc3339(),
        });
        append(&path, &record).await?;
        info!(path = %path.display(), run = %state.id, "opened offline run");
        Ok(Box::new(OfflineRun { path, state }))
    }
}

struct OfflineRun {
    path: PathBuf,
    state: RunState,
}

#[async_trait]
impl Run for OfflineRun {
    fn id(&self) -> &str {
        &self.state.id
    }

    async fn log(&mut self, payload: LogPayload) -> Result<()> {
        let step = self.state.next_step()?;
        let record = json!({
            "type": "log",
            "step": step,
            "timestamp": Utc::now().to_rfc3339(),
            "data": payload,
        });
        append(&self.path, &record).await
    }

    async fn finish(&mut self, exit_code: i32) -> Result<()> {
        self.state.mark_finished()?;
        let record = json!({
            "type": "finish",
            "exit_code": exit_code,
            "timestamp": Utc::now().to_rfc3339(),
        });
        append(&self.path, &record).await?;
        info!(path = %self.path.display(), exit_code, "finished offline run");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_separators_are_flattened() {
        let tracker = OfflineTracker::new("/tmp/runs");
        assert_eq!(
            tracker.run_path("team/NeMo", "abc").unwrap(),
            PathBuf::from("/tmp/runs/team_NeMo/abc.jsonl")
        );
        assert_eq!(
            tracker.run_path("../x", "abc").unwrap(),
            PathBuf::from("/tmp/runs/.._x/abc.jsonl")
        );
    }

    #[test]
    fn empty_and_dot_projects_are_rejected() {
        let tracker = OfflineTracker::new("/tmp/runs");
        for project in ["", "  ", ".", ".."] {
            assert!(matches!(
                tracker.run_path(project, "abc"),
                Err(TrackingError::InvalidProject(_))
            ));
        }
    }

    #[tokio::test]
    async fn init_refuses_parent_directory_project() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = OfflineTracker::new(dir.path().join("runs"));
        assert!(tracker.init("..").await.is_err());
        assert!(!dir.path().join("runs").exists());
    }
}
