use super::directive::DirectiveError;
use thiserror::Error;

/// Failures that abort processing of the whole input. There is no per-line
/// recovery: a file either processes completely or not at all.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{line_number}: Directive `{directive}` is malformed. {source}")]
    MalformedDirective {
        line_number: usize,
        directive: String,
        #[source]
        source: DirectiveError,
    },
    #[error("{line_number}: Executing {command} has failed. {reason}")]
    ProducerFailure {
        line_number: usize,
        command: String,
        reason: String,
    },
    #[error(
        "{line_number}: Accessing invalid fields: STDOUT:{stdout} Delimiter:{delimiter} Nth:{nth} (only {available} fields)"
    )]
    OutOfRangeField {
        line_number: usize,
        stdout: String,
        delimiter: String,
        nth: usize,
        available: usize,
    },
    #[error(
        "{line_number}: The result of updater command has malformed format: {replacer} (`{extract}` re-matched `{rematched}`)"
    )]
    MalformedProducerOutput {
        line_number: usize,
        replacer: String,
        extract: String,
        rematched: String,
    },
    #[error("Unable to read input. {error:?}")]
    IoError {
        #[from]
        error: std::io::Error,
    },
}
