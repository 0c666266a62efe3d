use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{LegacyError, Result};

/// Read a line-delimited name list.
///
/// Only the line terminator is removed. Blank lines and surrounding
/// whitespace are kept as-is, and so are duplicates, because every line
/// produces exactly one alias in the generated file.
pub fn load_names(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| LegacyError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    let names = split_names(&content);
    debug!(path = %path.display(), count = names.len(), "loaded name list");
    Ok(names)
}

pub fn split_names(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}
