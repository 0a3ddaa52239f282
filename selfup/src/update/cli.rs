use super::report::{ReportStyle, summary_line};
use super::runner::{FileOutcome, UpdateMode, process_files};
use crate::engine::prelude::{DEFAULT_MARKER, EngineOptions};
use crate::shared::prelude::{DefaultExecutionProvider, ExecutionProvider, wants_color};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Start JSON after this pattern (regex)
    #[arg(long, env = "SELFUP_PREFIX", default_value = DEFAULT_MARKER)]
    pub prefix: String,

    /// Skip to run if the line contains this string
    #[arg(long, env = "SELFUP_SKIP_BY")]
    pub skip_by: Option<String>,

    /// Exit as error if found changes
    #[arg(long, action)]
    pub check: bool,

    /// Disable color output
    #[arg(long, action)]
    pub no_color: bool,

    /// How many files are processed at once
    #[arg(long, short = 'j', env = "SELFUP_JOBS")]
    pub jobs: Option<usize>,

    /// Files to scan for directives
    #[arg(required = true)]
    pub paths: Vec<String>,
}

impl UpdateArgs {
    pub fn report_style(&self) -> ReportStyle {
        ReportStyle {
            color: wants_color(self.no_color),
        }
    }

    fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Tallies of every file that processed successfully.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub total: usize,
    pub changed: usize,
    pub has_error: bool,
}

impl UpdateSummary {
    pub fn exit_code(&self, check: bool) -> i32 {
        if self.has_error || (check && self.changed > 0) {
            1
        } else {
            0
        }
    }
}

pub async fn update_root(working_dir: PathBuf, args: &UpdateArgs, mode: UpdateMode) -> Result<i32> {
    let options = match EngineOptions::new(&args.prefix, args.skip_by.clone(), working_dir) {
        Ok(options) => options,
        Err(e) => {
            error!(target: "user", "{}", e);
            return Ok(2);
        }
    };

    let producer: Arc<dyn ExecutionProvider> = Arc::new(DefaultExecutionProvider::default());
    let outcomes = process_files(&args.paths, Arc::new(options), producer, mode, args.jobs()).await;
    let summary = report_outcomes(&outcomes, args.report_style());

    info!(target: "always", "");
    info!(target: "always", "{}", summary_line(mode, summary.changed, summary.total));

    Ok(summary.exit_code(args.check))
}

pub fn report_outcomes(outcomes: &[FileOutcome], style: ReportStyle) -> UpdateSummary {
    let mut summary = UpdateSummary::default();

    for outcome in outcomes {
        let result = match &outcome.result {
            Ok(result) => result,
            Err(e) => {
                error!(target: "always", "{}", e);
                summary.has_error = true;
                continue;
            }
        };

        summary.total += result.total;
        summary.changed += result.changed_count;
        for record in &result.records {
            info!(target: "always", "{}", style.render_record(&outcome.path, record));
        }
    }

    summary
}
