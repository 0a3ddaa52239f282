//! The line engine: finds directive lines, runs their producer commands and
//! rewrites the value in front of the marker.

mod directive;
mod error;
mod marker;
mod rewrite;
mod runner;

pub mod prelude {
    pub use super::directive::{Directive, DirectiveError, DirectiveSchema, FieldOutOfRange};
    pub use super::error::EngineError;
    pub use super::marker::{DEFAULT_MARKER, EngineOptions, MarkerError, MarkerSplit, split_marker};
    pub use super::rewrite::{Inconsistent, Rewrite, replace_first, rewrite_subject};
    pub use super::runner::{EngineResult, LineOutcome, LineRecord, dry_run, process_line};
}
