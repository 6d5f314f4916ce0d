//! Input list loading

use crate::error::{Error, Result};
use crate::types::WorkItem;
use std::path::Path;

/// Load the newline-delimited input list of target URLs.
///
/// Blank lines and lines beginning with `#` are ignored. A missing file is an
/// error: without an input list there is nothing to harvest.
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Input(format!("failed to read input list {}: {}", path.display(), e))
    })?;
    let items = parse_work_items(&text);
    tracing::info!(path = %path.display(), items = items.len(), "loaded input list");
    Ok(items)
}

/// Parse work items from newline-delimited text
pub fn parse_work_items(text: &str) -> Vec<WorkItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(WorkItem::from)
        .collect()
}
