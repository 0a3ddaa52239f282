mod cli;
mod error;
mod report;
mod runner;

pub mod prelude {
    pub use super::cli::{UpdateArgs, UpdateSummary, report_outcomes, update_root};
    pub use super::error::UpdateError;
    pub use super::report::{ReportStyle, summary_line};
    pub use super::runner::{FileOutcome, UpdateMode, process_file, process_files};
}
