use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use mockall::automock;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tracing::{debug, instrument};
use which::which_in;

/// Everything a finished producer process left behind.
#[derive(Clone, Default, Builder, Debug)]
#[builder(setter(into))]
pub struct OutputCapture {
    #[builder(default)]
    pub working_dir: PathBuf,
    #[builder(default)]
    pub stdout: String,
    #[builder(default)]
    pub stderr: String,
    #[builder(default)]
    pub exit_code: Option<i32>,
    #[builder(default)]
    pub start_time: DateTime<Utc>,
    #[builder(default)]
    pub end_time: DateTime<Utc>,
    #[builder(default)]
    pub command: String,
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Unable to run the command. {error:?}")]
    IoError {
        #[from]
        error: std::io::Error,
    },
    #[error("Executable {name} was not found or is not executable.")]
    MissingExecutable { name: String },
    #[error("Unable to parse UTF-8 output. {error:?}")]
    FromUtf8Error {
        #[from]
        error: std::string::FromUtf8Error,
    },
}

#[automock]
#[async_trait]
pub trait ExecutionProvider: Send + Sync {
    async fn run_command<'a>(&self, opts: CaptureOpts<'a>) -> Result<OutputCapture, CaptureError>;
}

#[derive(Default, Debug)]
pub struct DefaultExecutionProvider {}

#[async_trait]
impl ExecutionProvider for DefaultExecutionProvider {
    async fn run_command<'a>(&self, opts: CaptureOpts<'a>) -> Result<OutputCapture, CaptureError> {
        OutputCapture::capture_output(opts).await
    }
}

pub struct CaptureOpts<'a> {
    pub working_dir: &'a Path,
    /// Executable followed by its arguments. Never passed through a shell.
    pub args: &'a [String],
}

impl CaptureOpts<'_> {
    pub fn command(&self) -> String {
        self.args.join(" ")
    }
}

impl OutputCapture {
    #[instrument(skip_all)]
    pub async fn capture_output(opts: CaptureOpts<'_>) -> Result<Self, CaptureError> {
        let (program, args) = match opts.args.split_first() {
            Some(split) => split,
            None => {
                return Err(CaptureError::MissingExecutable {
                    name: String::new(),
                });
            }
        };
        let executable = resolve_executable(program, opts.working_dir)?;

        debug!("Executing {} {:?}", executable.display(), args);

        let start_time = Utc::now();
        let output = tokio::process::Command::new(&executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .current_dir(opts.working_dir)
            .output()
            .await?;
        let end_time = Utc::now();

        debug!(
            "{} exited with {:?} after {}ms",
            opts.command(),
            output.status.code(),
            (end_time - start_time).num_milliseconds()
        );

        Ok(Self {
            working_dir: opts.working_dir.to_path_buf(),
            stdout: String::from_utf8(output.stdout)?,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            start_time,
            end_time,
            command: opts.command(),
        })
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

fn resolve_executable(program: &str, working_dir: &Path) -> Result<PathBuf, CaptureError> {
    which_in(program, env::var_os("PATH"), working_dir).map_err(|e| {
        debug!("Unable to find binary {:?}", e);
        CaptureError::MissingExecutable {
            name: program.to_string(),
        }
    })
}
