use super::directive::Directive;
use super::error::EngineError;
use super::marker::{EngineOptions, split_marker};
use super::rewrite::rewrite_subject;
use crate::shared::prelude::{CaptureOpts, ExecutionProvider};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// One directive line that was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub line_number: usize,
    pub extracted: String,
    pub replacer: String,
    pub is_changed: bool,
}

/// Lines are kept as raw bytes so text the engine does not touch is written
/// back exactly as read, whatever its encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineResult {
    pub new_lines: Vec<Vec<u8>>,
    pub records: Vec<LineRecord>,
    pub total: usize,
    pub changed_count: usize,
}

impl EngineResult {
    pub fn is_dirty(&self) -> bool {
        self.changed_count > 0
    }

    /// The rewritten content, with a single trailing newline.
    pub fn render(&self) -> Vec<u8> {
        let mut body = self.new_lines.join(&b'\n');
        body.push(b'\n');
        body
    }

    fn push(&mut self, line: Vec<u8>, record: Option<LineRecord>) {
        self.new_lines.push(line);
        if let Some(record) = record {
            self.total += 1;
            if record.is_changed {
                self.changed_count += 1;
            }
            self.records.push(record);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    PassThrough,
    Processed { line: String, record: LineRecord },
}

/// Classifies and, when it carries a directive, rewrites a single line.
pub async fn process_line(
    line_number: usize,
    line: &str,
    options: &EngineOptions,
    producer: &dyn ExecutionProvider,
) -> Result<LineOutcome, EngineError> {
    if options.is_skipped(line) {
        debug!("Skipping line {}", line_number);
        return Ok(LineOutcome::PassThrough);
    }
    let split = match split_marker(line, &options.marker) {
        Some(split) => split,
        None => return Ok(LineOutcome::PassThrough),
    };

    let directive =
        Directive::parse(split.directive).map_err(|source| EngineError::MalformedDirective {
            line_number,
            directive: split.directive.to_string(),
            source,
        })?;

    let stdout = run_producer(line_number, &directive, options, producer).await?;
    let replacer = directive
        .select_field(&stdout)
        .map_err(|e| EngineError::OutOfRangeField {
            line_number,
            stdout: stdout.clone(),
            delimiter: directive.delimiter.clone().unwrap_or_default(),
            nth: e.nth,
            available: e.available,
        })?;

    let rewrite = rewrite_subject(split.subject, &directive.extractor, &replacer).map_err(|e| {
        EngineError::MalformedProducerOutput {
            line_number,
            replacer: replacer.clone(),
            extract: directive.extractor.as_str().to_string(),
            rematched: e.rematched,
        }
    })?;
    if rewrite.is_empty_extraction() {
        warn!(target: "user", "{}: `{}` found nothing to replace", line_number, directive.extractor);
    }

    let is_changed = rewrite.subject != split.subject;
    Ok(LineOutcome::Processed {
        line: split.reassemble(&rewrite.subject),
        record: LineRecord {
            line_number,
            extracted: rewrite.extracted,
            replacer,
            is_changed,
        },
    })
}

async fn run_producer(
    line_number: usize,
    directive: &Directive,
    options: &EngineOptions,
    producer: &dyn ExecutionProvider,
) -> Result<String, EngineError> {
    let failure = |reason: String| EngineError::ProducerFailure {
        line_number,
        command: directive.program().to_string(),
        reason,
    };

    let capture = producer
        .run_command(CaptureOpts {
            working_dir: &options.working_dir,
            args: &directive.command,
        })
        .await
        .map_err(|e| failure(e.to_string()))?;

    match capture.exit_code {
        Some(0) => Ok(capture.stdout),
        Some(code) => Err(failure(format!(
            "Exited with status {}. {}",
            code,
            capture.stderr.trim()
        ))),
        None => Err(failure("Terminated by a signal.".to_string())),
    }
}

/// Drops the `\n` terminator and a `\r` right before it.
fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Runs every line of `input` through the engine, in order. The first error
/// aborts the whole input.
pub async fn dry_run<R>(
    mut input: R,
    options: &EngineOptions,
    producer: &dyn ExecutionProvider,
) -> Result<EngineResult, EngineError>
where
    R: AsyncBufRead + Unpin,
{
    let mut result = EngineResult::default();
    let mut buffer = Vec::new();
    let mut line_number = 0;

    loop {
        buffer.clear();
        if input.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }
        line_number += 1;
        let raw = trim_line_ending(&buffer);

        let outcome = match std::str::from_utf8(raw) {
            Ok(line) => process_line(line_number, line, options, producer).await?,
            Err(_) => {
                debug!("Line {} is not UTF-8, copying it as-is", line_number);
                LineOutcome::PassThrough
            }
        };
        match outcome {
            LineOutcome::PassThrough => result.push(raw.to_vec(), None),
            LineOutcome::Processed { line, record } => result.push(line.into_bytes(), Some(record)),
        }
    }

    Ok(result)
}
