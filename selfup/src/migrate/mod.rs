//! One-time rewrite of the beta directive schema (`regex` + `script`) into v1.

mod cli;
mod error;

use crate::engine::prelude::DirectiveSchema;
use error::MigrateError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

pub const BETA_MARKER: &str = "# selfup ";

#[derive(Debug, Default, Deserialize)]
struct BetaSchema {
    #[serde(default)]
    regex: String,
    #[serde(default)]
    script: String,
}

impl From<BetaSchema> for DirectiveSchema {
    fn from(beta: BetaSchema) -> Self {
        DirectiveSchema {
            extract: beta.regex,
            command: vec!["bash".to_string(), "-c".to_string(), beta.script],
            nth: 0,
            delimiter: String::new(),
        }
    }
}

/// Returns the migrated content, or `None` when no line needed migration.
pub fn migrate_text(content: &str) -> Result<Option<String>, MigrateError> {
    let mut new_lines = Vec::new();
    let mut is_migrated = false;

    for (index, line) in content.lines().enumerate() {
        let (head, tail) = match line.split_once(BETA_MARKER) {
            Some(parts) => parts,
            None => {
                new_lines.push(line.to_string());
                continue;
            }
        };

        let beta: BetaSchema = serde_json::from_str(tail).map_err(|error| MigrateError::Json {
            line_number: index + 1,
            text: tail.to_string(),
            error,
        })?;
        if beta.regex.is_empty() || beta.script.is_empty() {
            new_lines.push(line.to_string());
            continue;
        }

        let v1 = serde_json::to_string(&DirectiveSchema::from(beta)).map_err(MigrateError::Encode)?;
        debug!("Migrating line {}", index + 1);
        new_lines.push(format!("{}{}{}", head, BETA_MARKER, v1));
        is_migrated = true;
    }

    if !is_migrated {
        return Ok(None);
    }

    let mut body = new_lines.join("\n");
    if content.ends_with('\n') {
        body.push('\n');
    }
    Ok(Some(body))
}

/// Migrates `path` in place, writing only when something changed.
pub async fn migrate_file(path: &Path) -> Result<bool, MigrateError> {
    let io_error = |error| MigrateError::Io {
        path: path.display().to_string(),
        error,
    };

    let content = tokio::fs::read_to_string(path).await.map_err(io_error)?;
    let migrated = migrate_text(&content).map_err(|source| MigrateError::Content {
        path: path.display().to_string(),
        source: Box::new(source),
    })?;

    match migrated {
        Some(body) => {
            tokio::fs::write(path, body).await.map_err(io_error)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub mod prelude {
    pub use super::cli::{MigrateArgs, migrate_root};
    pub use super::error::MigrateError;
    pub use super::{BETA_MARKER, migrate_file, migrate_text};
}
