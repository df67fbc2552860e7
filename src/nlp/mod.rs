//! Natural language processing layer: recognizers and entity rendering.

pub mod ner;
pub mod render;

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use crate::config::Settings;
use ner::{Recognizer, RuleBasedRecognizer};

/// Construct the recognizer selected by configuration.
pub fn load_recognizer(settings: &Settings) -> Result<Arc<dyn Recognizer>> {
    let recognizer = match settings.ner_model.as_str() {
        "rules" => {
            let rules = RuleBasedRecognizer::new();
            match &settings.gazetteer_path {
                Some(path) => rules.with_gazetteer(path)?,
                None => rules,
            }
        }
        other => bail!("unknown NER model {other:?} (expected \"rules\")"),
    };
    info!(model = %settings.ner_model, "loaded recognizer");
    Ok(Arc::new(recognizer) as Arc<dyn Recognizer>)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs};

    use super::*;

    fn settings(pairs: &[(&str, String)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn unknown_model_is_rejected() {
        let err = load_recognizer(&settings(&[("NER_MODEL", "spacy".into())]))
            .err()
            .expect("unknown model fails");
        assert!(err.to_string().contains("spacy"));
    }

    #[test]
    fn gazetteer_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gazetteer.json");
        fs::write(&path, r#"{"PRODUCT": ["NeMo", "Megatron"]}"#).unwrap();

        let recognizer = load_recognizer(&settings(&[(
            "NER_GAZETTEER",
            path.display().to_string(),
        )]))
        .unwrap();
        let annotation = recognizer.recognize("we ship megatron weekly").unwrap();
        assert_eq!(annotation.entities(), vec![("megatron", "PRODUCT")]);
    }

    #[test]
    fn malformed_or_missing_gazetteer_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gazetteer.json");
        fs::write(&path, r#"["not", "a", "map"]"#).unwrap();

        let malformed = load_recognizer(&settings(&[(
            "NER_GAZETTEER",
            path.display().to_string(),
        )]))
        .err()
        .expect("malformed gazetteer fails");
        assert!(malformed.to_string().contains("parsing gazetteer"));

        let missing = load_recognizer(&settings(&[(
            "NER_GAZETTEER",
            dir.path().join("absent.json").display().to_string(),
        )]))
        .err()
        .expect("missing gazetteer fails");
        assert!(missing.to_string().contains("reading gazetteer"));
    }
}
