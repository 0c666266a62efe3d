use std::path::PathBuf;
use thiserror::Error;

use crate::resolver::NameKind;

#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("failed to read name list {}: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list corpus root {}: {source}", path.display())]
    CorpusRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read module source {}: {source}", path.display())]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} not found{}", format_suggestions(suggestions))]
    Unresolved {
        kind: NameKind,
        name: String,
        suggestions: Vec<String>,
    },

    #[error("{unresolved} of {total} legacy names failed to resolve")]
    CheckFailed { unresolved: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (candidates: {})", suggestions.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, LegacyError>;
