//! Rule-based named entity recognition. Any model can be plugged in behind [`Recognizer`].

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashSet},
    path::Path,
};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Extracted entity span with byte offsets relative to the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
    pub score: f64,
}

/// Entities recognized in one line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    /// Sorted by start offset, never overlapping.
    pub ents: Vec<Span>,
}

impl Annotation {
    /// `(text, label)` pairs in document order.
    pub fn entities(&self) -> Vec<(&str, &str)> {
        self.ents
            .iter()
            .map(|span| (span.text.as_str(), span.label.as_str()))
            .collect()
    }
}

/// Trait for NER implementations.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Annotation>;
}

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+(?:['&\-]\p{L}+)*").expect("valid regex"));

static PATTERNS: Lazy<Vec<(Regex, &'static str, f64)>> = Lazy::new(|| {
    [
        (
            r"[$€£]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s(?:million|billion|thousand))?|\b\d+(?:,\d{3})*(?:\.\d+)?\s(?:dollars|euros|pounds)\b",
            "MONEY",
            0.95,
        ),
        (r"\b\d+(?:\.\d+)?(?:\s?%|\spercent\b)", "PERCENT", 0.95),
        (
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)(?:\s+\d{1,2}(?:st|nd|rd|th)?)?(?:,?\s+\d{4})?\b|\b(?:1[5-9]|20)\d{2}\b",
            "DATE",
            0.9,
        ),
        (r"\b\d+(?:,\d{3})*(?:\.\d+)?\b", "CARDINAL", 0.8),
    ]
    .into_iter()
    .map(|(pattern, label, score)| (Regex::new(pattern).expect("valid regex"), label, score))
    .collect()
});

// Dropped from a chunk only when they open a sentence.
static FUNCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "A", "After", "An", "And", "At", "Before", "But", "By", "During", "For", "From", "He",
        "Her", "His", "If", "In", "It", "Its", "On", "Or", "Our", "She", "That", "The", "Their",
        "There", "These", "They", "This", "Those", "To", "Today", "Tomorrow", "We", "When",
        "While", "With", "Yesterday", "You",
    ]
    .into_iter()
    .collect()
});

static ORG_MARKERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Agency", "Association", "Bank", "Co", "Company", "Corp", "Corporation", "Council",
        "Department", "Foundation", "Group", "Holdings", "Inc", "Institute", "LLC", "Labs", "Ltd",
        "Ministry", "Partners", "Systems", "Technologies", "University",
    ]
    .into_iter()
    .collect()
});

static KNOWN_ORGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Amazon", "Apple", "BBC", "EU", "FBI", "Google", "IBM", "Intel", "Meta", "Microsoft",
        "NASA", "NVIDIA", "Netflix", "Nvidia", "OpenAI", "Tesla", "UN",
    ]
    .into_iter()
    .collect()
});

static KNOWN_PLACES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Beijing", "Berlin", "Brazil", "California", "Canada", "China", "England", "France",
        "Germany", "India", "Italy", "Japan", "London", "Madrid", "Mexico", "Moscow", "New York",
        "Paris", "Rome", "Russia", "Spain", "Texas", "Tokyo", "UK", "USA", "United Kingdom",
        "United States", "Washington",
    ]
    .into_iter()
    .collect()
});

/// Candidate span before overlap resolution; lower `priority` wins ties.
#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    label: String,
    score: f64,
    priority: u8,
}

/// Regex patterns, capitalisation chunks and an optional user gazetteer.
#[derive(Debug, Default)]
pub struct RuleBasedRecognizer {
    gazetteer: Vec<(Regex, String)>,
}

impl RuleBasedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add case-insensitive whole-word terms, keyed by label.
    pub fn with_terms(mut self, terms: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        for (label, words) in terms {
            for word in words.iter().filter(|w| !w.trim().is_empty()) {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(word.trim()));
                let regex = Regex::new(&pattern)
                    .with_context(|| format!("compiling gazetteer term {word:?}"))?;
                self.gazetteer.push((regex, label.clone()));
            }
        }
        Ok(self)
    }

    /// Load a JSON gazetteer of the form `{ "LABEL": ["term", ...] }`.
    pub fn with_gazetteer(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading gazetteer {}", path.display()))?;
        let terms: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing gazetteer {}", path.display()))?;
        let recognizer = self.with_terms(&terms)?;
        info!(
            path = %path.display(),
            terms = recognizer.gazetteer.len(),
            "loaded gazetteer"
        );
        Ok(recognizer)
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut out = Vec::new();
        for (regex, label) in &self.gazetteer {
            out.extend(regex.find_iter(text).map(|m| Candidate {
                start: m.start(),
                end: m.end(),
                label: label.clone(),
                score: 1.0,
                priority: 0,
            }));
        }
        for (idx, (regex, label, score)) in PATTERNS.iter().enumerate() {
            // CARDINAL is last and loses to any other pattern of equal extent.
            let priority = if idx + 1 == PATTERNS.len() { 2 } else { 1 };
            out.extend(regex.find_iter(text).map(|m| Candidate {
                start: m.start(),
                end: m.end(),
                label: (*label).to_string(),
                score: *score,
                priority,
            }));
        }
        for (start, end, tokens) in proper_noun_chunks(text) {
            let (label, score) = classify(&tokens, &text[start..end]);
            out.push(Candidate {
                start,
                end,
                label: label.to_string(),
                score,
                priority: 3,
            });
        }
        out
    }
}

impl Recognizer for RuleBasedRecognizer {
    fn recognize(&self, text: &str) -> Result<Annotation> {
        let ents: Vec<Span> = resolve_overlaps(self.candidates(text))
            .into_iter()
            .map(|c| Span {
                text: text[c.start..c.end].to_string(),
                start: c.start,
                end: c.end,
                label: c.label,
                score: c.score,
            })
            .collect();
        debug!(entities = ents.len(), "recognized line");
        Ok(Annotation {
            text: text.to_string(),
            ents,
        })
    }
}

/// Earliest start wins, then the longest span, then the lowest priority.
fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by_key(|c| (c.start, Reverse(c.end - c.start), c.priority));
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for candidate in candidates {
        if !kept.is_empty() && candidate.start < last_end {
            continue;
        }
        last_end = candidate.end;
        kept.push(candidate);
    }
    kept
}

/// Runs of capitalised tokens separated only by whitespace.
fn proper_noun_chunks(text: &str) -> Vec<(usize, usize, Vec<&str>)> {
    let mut chunks = Vec::new();
    let mut current: Option<(usize, usize, Vec<&str>)> = None;
    for m in TOKEN.find_iter(text) {
        let token = m.as_str();
        let capitalised = token.chars().next().is_some_and(char::is_uppercase) && token != "I";
        let skipped = sentence_initial(text, m.start()) && FUNCTION_WORDS.contains(token);
        if !capitalised || skipped {
            chunks.extend(current.take());
            continue;
        }
        let extends = current.as_ref().is_some_and(|(_, end, _)| {
            text[*end..m.start()].chars().all(char::is_whitespace)
        });
        if extends {
            if let Some((_, end, tokens)) = current.as_mut() {
                *end = m.end();
                tokens.push(token);
            }
        } else {
            chunks.extend(current.take());
            current = Some((m.start(), m.end(), vec![token]));
        }
    }
    chunks.extend(current);
    chunks
}

fn sentence_initial(text: &str, start: usize) -> bool {
    matches!(
        text[..start].trim_end().chars().last(),
        None | Some('.' | '!' | '?' | '"' | ':')
    )
}

fn classify(tokens: &[&str], chunk: &str) -> (&'static str, f64) {
    if tokens.iter().any(|t| ORG_MARKERS.contains(*t)) {
        ("ORG", 0.85)
    } else if KNOWN_ORGS.contains(chunk) {
        ("ORG", 0.9)
    } else if KNOWN_PLACES.contains(chunk) {
        ("GPE", 0.9)
    } else {
        ("PERSON", 0.6)
    }
}
