//! Read lines, annotate each one, log the annotations as a single table.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    nlp::{
        ner::{Annotation, Recognizer},
        render,
    },
    tracking::{LogPayload, Table, Tracker},
};

/// Where and under which names the table is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub project: String,
    pub table_key: String,
    pub column: String,
}

impl From<&Settings> for LogTarget {
    fn from(settings: &Settings) -> Self {
        Self {
            project: settings.project.clone(),
            table_key: settings.table_key.clone(),
            column: settings.column.clone(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: String,
    pub rows: usize,
}

/// Read a UTF-8 file into its lines, terminators stripped.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading input file {}", path.display()))?;
    Ok(raw.lines().map(str::to_string).collect())
}

/// Run the recognizer over every line in order. The first failure aborts.
pub fn annotate_lines(recognizer: &dyn Recognizer, lines: &[String]) -> Result<Vec<Annotation>> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            info!(line = idx + 1, %line, "annotating");
            recognizer
                .recognize(line)
                .with_context(|| format!("recognizing entities on line {}", idx + 1))
        })
        .collect()
}

/// One-column table with one rendered annotation per row.
pub fn build_table(column: &str, annotations: &[Annotation]) -> Result<Table> {
    let mut table = Table::new([column]);
    for annotation in annotations {
        table.add_row(vec![render::ner_cell(annotation)?])?;
    }
    Ok(table)
}

/// Open a run, log the table once, and close the run even if logging failed.
#[instrument(skip_all, fields(project = %target.project, rows = table.len()))]
pub async fn log_table(
    tracker: &dyn Tracker,
    target: &LogTarget,
    table: Table,
) -> Result<RunSummary> {
    let rows = table.len();
    let mut payload = LogPayload::new();
    payload.insert(
        target.table_key.clone(),
        serde_json::to_value(&table).context("serializing annotation table")?,
    );

    let mut run = tracker
        .init(&target.project)
        .await
        .context("opening tracking run")?;
    let logged = run.log(payload).await;
    let exit_code = if logged.is_ok() { 0 } else { 1 };
    let finished = run.finish(exit_code).await;

    match (logged, finished) {
        (Ok(()), Ok(())) => {}
        (Err(log_err), Ok(())) => {
            return Err(anyhow::Error::new(log_err).context("logging annotation table"));
        }
        (Ok(()), Err(finish_err)) => {
            return Err(anyhow::Error::new(finish_err).context("finishing tracking run"));
        }
        (Err(log_err), Err(finish_err)) => {
            warn!(run = %run.id(), error = %finish_err, "finishing tracking run failed");
            return Err(anyhow::Error::new(log_err).context(format!(
                "logging annotation table (finishing the run also failed: {finish_err})"
            )));
        }
    }
    info!(run = %run.id(), rows, "logged annotation table");
    Ok(RunSummary {
        run_id: run.id().to_string(),
        rows,
    })
}

/// The whole pipeline. A missing input file fails before the tracker is touched.
#[instrument(skip_all, fields(input = %input.display()))]
pub async fn run(
    input: &Path,
    recognizer: &dyn Recognizer,
    tracker: &dyn Tracker,
    target: &LogTarget,
) -> Result<RunSummary> {
    let lines = read_lines(input)?;
    if lines.is_empty() {
        warn!("input file is empty; logging an empty table");
    }
    info!(lines = lines.len(), "read input");
    let annotations = annotate_lines(recognizer, &lines)?;
    let table = build_table(&target.column, &annotations)?;
    log_table(tracker, target, table).await
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::nlp::ner::RuleBasedRecognizer;

    #[test]
    fn crlf_terminators_are_stripped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "one\r\ntwo\n\nthree").unwrap();
        let lines = read_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn table_rows_follow_annotation_order() {
        let lines = vec![
            "Alice went to Paris.".to_string(),
            "Bob works at Acme Corp.".to_string(),
        ];
        let annotations = annotate_lines(&RuleBasedRecognizer::new(), &lines).unwrap();
        let table = build_table("NER", &annotations).unwrap();
        assert_eq!(table.columns(), ["NER".to_string()]);
        let texts: Vec<&str> = table
            .column("NER")
            .unwrap()
            .map(|cell| cell["doc"]["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, ["Alice went to Paris.", "Bob works at Acme Corp."]);
    }
}
