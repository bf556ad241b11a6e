use anyhow::Result;
use console::style;
use pixmeta_core::{AnalysisReport, Outcome};
use std::time::Duration;

const HEADERS: [&str; 7] = [
    "File",
    "Format",
    "Size",
    "DPI",
    "Depth",
    "Compression",
    "Details",
];

/// Output formatter with colored messages
pub struct OutputFormatter {
    colored: bool,
}

impl OutputFormatter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("✓").green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("ℹ").cyan(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Render reports as an aligned table, one row per file
    pub fn render_table(&self, reports: &[AnalysisReport]) -> String {
        let rows: Vec<[&str; 7]> = reports.iter().map(row).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for cells in &rows {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header = join_padded(&HEADERS, &widths);
        if self.colored {
            out.push_str(&style(header).bold().to_string());
        } else {
            out.push_str(&header);
        }
        out.push('\n');

        let rule: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        out.push_str(&"-".repeat(rule));
        out.push('\n');

        for (report, cells) in reports.iter().zip(&rows) {
            let line = join_padded(cells, &widths);
            out.push_str(&self.color_row(line, report.outcome()));
            out.push('\n');
        }
        out
    }

    fn color_row(&self, line: String, outcome: Outcome) -> String {
        if !self.colored {
            return line;
        }
        match outcome {
            Outcome::Analyzed => line,
            Outcome::Unsupported => style(line).yellow().to_string(),
            Outcome::Unreadable | Outcome::Failed => style(line).red().to_string(),
        }
    }

    pub fn render_json(&self, reports: &[AnalysisReport]) -> Result<String> {
        Ok(serde_json::to_string_pretty(reports)?)
    }

    /// Format a duration as seconds
    pub fn format_seconds(&self, elapsed: Duration) -> String {
        let secs = format!("{:.3}s", elapsed.as_secs_f64());
        if self.colored {
            style(secs).yellow().to_string()
        } else {
            secs
        }
    }

    /// Print batch summary: count, elapsed time, average per file
    pub fn print_batch_summary(&self, reports: &[AnalysisReport], elapsed: Duration) {
        let total = reports.len();
        let failed = reports.iter().filter(|r| !r.is_analyzed()).count();
        let average = per_file(elapsed, total);

        println!();
        if self.colored {
            println!(
                "{} {} files in {} ({} per file), {} {} analyzed, {} {} not analyzed",
                style("Summary:").bold(),
                total,
                self.format_seconds(elapsed),
                self.format_seconds(average),
                style("✓").green(),
                total - failed,
                style("✗").red(),
                failed
            );
        } else {
            println!(
                "Summary: {} files in {} ({} per file), {} analyzed, {} not analyzed",
                total,
                self.format_seconds(elapsed),
                self.format_seconds(average),
                total - failed,
                failed
            );
        }
    }
}

fn per_file(elapsed: Duration, total: usize) -> Duration {
    if total == 0 {
        Duration::ZERO
    } else {
        elapsed.div_f64(total as f64)
    }
}

fn row(report: &AnalysisReport) -> [&str; 7] {
    [
        report.filename(),
        report.format(),
        report.size(),
        report.dpi(),
        report.depth(),
        report.compression(),
        report.extra_info(),
    ]
}

fn join_padded(cells: &[&str; 7], widths: &[usize; 7]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    padded.join("  ").trim_end().to_string()
}
