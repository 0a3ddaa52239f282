use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use indicatif::ProgressStyle;
use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::{IndicatifFilter, hide_indicatif_span_fields};
use tracing_subscriber::Registry;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::prelude::*;

pub const LOG_DIR: &str = "/tmp/selfup";

/// Colors are used only on a terminal, and never when `NO_COLOR` is set.
pub fn wants_color(no_color_flag: bool) -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !no_color_flag && !no_color_env && std::io::stdout().is_terminal()
}

fn file_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {wide_msg} {pos}/{len} files [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("logging"))]
pub struct LoggingOpts {
    /// Show more of what happens, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global(true))]
    pub verbose: u8,

    /// How to show progress across files
    #[arg(
        long,
        global(true),
        default_value = "auto",
        env = "SELFUP_OUTPUT_PROGRESS"
    )]
    pub progress: LoggingProgress,
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoggingProgress {
    /// Draw a progress bar when stdout is a terminal
    Auto,
    /// Never draw a progress bar
    Plain,
}

impl LoggingOpts {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    fn shows_progress(&self) -> bool {
        self.progress == LoggingProgress::Auto && std::io::stdout().is_terminal()
    }

    /// Installs the global subscriber.
    ///
    /// The console gets two streams: report lines (target `always`) printed
    /// bare, and diagnostics (target `user`) with their level, filtered by
    /// verbosity. `ansi` must be the same decision the report colors follow.
    /// Everything, whatever its target, also goes to a per-run log file.
    pub fn configure_logging(&self, run_id: &str, ansi: bool) -> Result<(WorkerGuard, String)> {
        std::fs::create_dir_all(LOG_DIR)?;
        let log_file = format!("{}/selfup-{}.log", LOG_DIR, run_id);

        let (file_writer, guard) = tracing_appender::non_blocking(strip_ansi_escapes::Writer::new(
            File::create(PathBuf::from(&log_file))?,
        ));
        let file_output = fmt::layer()
            .event_format(Format::default().pretty())
            .with_ansi(false)
            .with_writer(file_writer);

        let indicatif_layer = IndicatifLayer::new()
            .with_span_field_formatter(hide_indicatif_span_fields(DefaultFields::new()))
            .with_progress_style(file_progress_style());

        let report_output = fmt::layer()
            .event_format(
                Format::default()
                    .with_target(false)
                    .with_level(false)
                    .without_time()
                    .compact(),
            )
            .with_ansi(ansi)
            .with_writer(indicatif_layer.get_stdout_writer())
            .with_filter(filter_fn(|metadata| metadata.target() == "always"));

        let level_filter = self.to_level_filter();
        let user_output = fmt::layer()
            .event_format(
                Format::default()
                    .with_target(false)
                    .without_time()
                    .compact(),
            )
            .with_ansi(ansi)
            .with_writer(indicatif_layer.get_stdout_writer())
            .with_filter(filter_fn(move |metadata| {
                metadata.target() == "user" && level_filter >= *metadata.level()
            }));

        let progress_layer = self
            .shows_progress()
            .then(|| indicatif_layer.with_filter(IndicatifFilter::new(false)));

        let subscriber = Registry::default()
            .with(report_output)
            .with(user_output)
            .with(progress_layer)
            .with(file_output);

        tracing::subscriber::set_global_default(subscriber)?;

        Ok((guard, log_file))
    }
}
