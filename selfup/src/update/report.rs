use super::runner::UpdateMode;
use crate::engine::prelude::LineRecord;
use colored::Colorize;

/// Presentation settings, decided once by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportStyle {
    pub color: bool,
}

impl ReportStyle {
    fn green(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn render_record(&self, path: &str, record: &LineRecord) -> String {
        let mut estimation = " ".to_string();
        let mut suffix = String::new();
        if record.is_changed {
            estimation = self.green("✓");
            suffix = format!(" => {}", self.green(&record.replacer));
        }

        format!(
            "{} {}:{}: {}{}",
            estimation, path, record.line_number, record.extracted, suffix
        )
    }
}

pub fn summary_line(mode: UpdateMode, changed: usize, total: usize) -> String {
    match mode {
        UpdateMode::List => format!("{}/{} items will be replaced", changed, total),
        UpdateMode::Apply => format!("{}/{} items have been replaced", changed, total),
    }
}
