use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MARKER: &str = r"\s*[#;/]* selfup ";

#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("No prefix is specified")]
    Empty,
    #[error("Given an invalid regex: `{0}`")]
    InvalidPattern(#[from] regex::Error),
}

/// Per-run settings shared read-only by every line and every file.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub marker: Regex,
    pub skip_by: Option<String>,
    pub working_dir: PathBuf,
}

impl EngineOptions {
    pub fn new(
        marker: &str,
        skip_by: Option<String>,
        working_dir: PathBuf,
    ) -> Result<Self, MarkerError> {
        if marker.is_empty() {
            return Err(MarkerError::Empty);
        }

        Ok(Self {
            marker: Regex::new(marker)?,
            skip_by: skip_by.filter(|s| !s.is_empty()),
            working_dir,
        })
    }

    pub fn is_skipped(&self, line: &str) -> bool {
        self.skip_by
            .as_deref()
            .is_some_and(|skip_by| line.contains(skip_by))
    }
}

/// A line cut at the first marker occurrence.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MarkerSplit<'a> {
    pub subject: &'a str,
    pub marker: &'a str,
    pub directive: &'a str,
}

impl MarkerSplit<'_> {
    pub fn reassemble(&self, subject: &str) -> String {
        format!("{}{}{}", subject, self.marker, self.directive)
    }
}

/// Like a ruby's String#partition, but only accepts the split when the
/// remainder looks like a JSON object.
pub fn split_marker<'a>(line: &'a str, marker: &Regex) -> Option<MarkerSplit<'a>> {
    let found = marker.find(line)?;
    let directive = &line[found.end()..];
    if !directive.starts_with('{') {
        return None;
    }

    Some(MarkerSplit {
        subject: &line[..found.start()],
        marker: found.as_str(),
        directive,
    })
}
