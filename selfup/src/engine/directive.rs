use regex::Regex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

/// The v1 directive as written after the marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveSchema {
    pub extract: String,
    #[serde(rename = "replacer")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub nth: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub delimiter: String,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

#[derive(Error, Debug)]
pub enum DirectiveError {
    #[error("Unmarshaling as JSON has failed, check the given prefix. {0}")]
    Json(#[from] serde_json::Error),
    #[error("`extract` must not be empty")]
    EmptyExtract,
    #[error("`extract` is not a valid regex. {0}")]
    Pattern(#[from] regex::Error),
    #[error("`replacer` does not include commands")]
    EmptyCommand,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldOutOfRange {
    pub nth: usize,
    pub available: usize,
}

/// A validated directive, ready to run.
#[derive(Debug, Clone)]
pub struct Directive {
    pub extractor: Regex,
    pub command: Vec<String>,
    pub nth: Option<NonZeroUsize>,
    pub delimiter: Option<String>,
}

impl Directive {
    pub fn parse(text: &str) -> Result<Self, DirectiveError> {
        let schema: DirectiveSchema = serde_json::from_str(text)?;
        Self::try_from(schema)
    }

    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    /// Picks the replacement out of raw producer output. One trailing newline
    /// is dropped first; the rest of the output is kept as-is unless a field
    /// is selected.
    pub fn select_field(&self, stdout: &str) -> Result<String, FieldOutOfRange> {
        let output = stdout.strip_suffix('\n').unwrap_or(stdout);
        let nth = match self.nth {
            None => return Ok(output.to_string()),
            Some(nth) => nth.get(),
        };

        let fields: Vec<&str> = match self.delimiter.as_deref() {
            Some(delimiter) => output.split(delimiter).collect(),
            None => output.split_whitespace().collect(),
        };

        fields
            .get(nth - 1)
            .map(|field| field.to_string())
            .ok_or(FieldOutOfRange {
                nth,
                available: fields.len(),
            })
    }
}

impl TryFrom<DirectiveSchema> for Directive {
    type Error = DirectiveError;

    fn try_from(schema: DirectiveSchema) -> Result<Self, Self::Error> {
        if schema.extract.is_empty() {
            return Err(DirectiveError::EmptyExtract);
        }
        let extractor = Regex::new(&schema.extract)?;
        if schema.command.is_empty() {
            return Err(DirectiveError::EmptyCommand);
        }

        Ok(Self {
            extractor,
            command: schema.command,
            nth: NonZeroUsize::new(schema.nth),
            delimiter: Some(schema.delimiter).filter(|d| !d.is_empty()),
        })
    }
}
