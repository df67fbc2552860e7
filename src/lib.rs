//! Line-by-line named entity annotation logged to an experiment tracker.

pub mod cli;
pub mod config;
pub mod logging;
pub mod nlp;
pub mod pipeline;
pub mod tracking;
