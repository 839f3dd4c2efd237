//! Fixtures
//!
//! Loads event records from JSON or YAML files. Event files are a single top-level list of
//! records; since YAML is a superset of JSON, both are read with the same parser.

use std::{fs, path::Path};

use thiserror::Error;

use crate::events::EventRecord;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse events: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Load event records from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a list of event records.
pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<EventRecord>, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_events_str(&contents)
}

/// Parse event records from a JSON or YAML string.
///
/// # Errors
///
/// Returns an error if `contents` is not a list of event records.
pub fn parse_events_str(contents: &str) -> Result<Vec<EventRecord>, FixtureError> {
    Ok(serde_norway::from_str(contents)?)
}
