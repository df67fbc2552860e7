use std::fs;

use entity_tracker::{
    nlp::ner::RuleBasedRecognizer,
    pipeline::{self, LogTarget},
    tracking::OfflineTracker,
};
use serde_json::Value;

#[tokio::test]
async fn run_file_holds_init_log_finish() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lines.txt");
    fs::write(&input, "Alice went to Paris.\nBob works at Acme Corp.\n").unwrap();
    let tracker = OfflineTracker::new(dir.path().join("runs"));
    let target = LogTarget {
        project: "NeMo".into(),
        table_key: "NER Table".into(),
        column: "NER".into(),
    };

    let summary = pipeline::run(&input, &RuleBasedRecognizer::new(), &tracker, &target)
        .await
        .unwrap();

    let path = tracker.run_path("NeMo", &summary.run_id).unwrap();
    let raw = fs::read_to_string(path).unwrap();
    let records: Vec<Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = records
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["init", "log", "finish"]);
    assert_eq!(records[0]["project"], "NeMo");
    assert_eq!(records[1]["step"], 0);
    assert_eq!(
        records[1]["data"]["NER Table"]["data"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert_eq!(records[2]["exit_code"], 0);
}
