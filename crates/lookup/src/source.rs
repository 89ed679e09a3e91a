//! Identifier source: one identifier per line.

use std::path::Path;

use log::info;

use crate::errors::PipelineError;
use crate::models::Identifier;

/// Splits text into identifiers, trimming whitespace and skipping blank
/// lines. Order and duplicates are preserved.
pub fn parse_identifiers(contents: &str) -> Vec<Identifier> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_identifiers(path: impl AsRef<Path>) -> Result<Vec<Identifier>, PipelineError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await?;
    let identifiers = parse_identifiers(&contents);
    info!("Read {} identifiers from {}", identifiers.len(), path.display());
    Ok(identifiers)
}
