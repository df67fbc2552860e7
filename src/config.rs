//! Runtime configuration utilities for entity-tracker.

use std::{env, path::PathBuf};

use anyhow::{anyhow, Context};
use clap::ValueEnum;
use serde::Deserialize;

/// Where tracking runs are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    /// Stream runs to the remote tracking service.
    Online,
    /// Write runs to local JSONL files for later upload.
    Offline,
    /// Accept and discard everything.
    Disabled,
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Text file annotated one line at a time.
    pub input_path: PathBuf,
    /// Recognizer implementation name.
    pub ner_model: String,
    /// Optional JSON gazetteer of extra `{ "LABEL": ["term", ...] }` entries.
    pub gazetteer_path: Option<PathBuf>,
    /// Tracking project the run is filed under.
    pub project: String,
    /// Team or user owning the project.
    pub entity: Option<String>,
    pub mode: TrackingMode,
    /// Base URL of the tracking service API.
    pub base_url: String,
    pub api_key: Option<String>,
    /// Root folder for offline run files.
    pub runs_dir: PathBuf,
    /// Key the table is logged under.
    pub table_key: String,
    /// Name of the table's single column.
    pub column: String,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let input_path = non_empty("NER_INPUT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("entities/sample_text_dev.txt"));
        let ner_model = non_empty("NER_MODEL").unwrap_or_else(|| "rules".to_string());
        let gazetteer_path = non_empty("NER_GAZETTEER").map(PathBuf::from);
        let project = non_empty("TRACKING_PROJECT").unwrap_or_else(|| "NeMo".to_string());
        let entity = non_empty("TRACKING_ENTITY");
        let mode = match non_empty("TRACKING_MODE") {
            Some(raw) => <TrackingMode as ValueEnum>::from_str(raw.trim(), true)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("parsing TRACKING_MODE={raw}"))?,
            None => TrackingMode::Online,
        };
        let base_url =
            non_empty("TRACKING_BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string());
        let api_key = non_empty("TRACKING_API_KEY");
        let runs_dir = non_empty("TRACKING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./runs"));
        let table_key = non_empty("NER_TABLE_KEY").unwrap_or_else(|| "NER Table".to_string());
        let column = non_empty("NER_COLUMN").unwrap_or_else(|| "NER".to_string());

        Ok(Self {
            input_path,
            ner_model,
            gazetteer_path,
            project,
            entity,
            mode,
            base_url,
            api_key,
            runs_dir,
            table_key,
            column,
        })
    }
}
