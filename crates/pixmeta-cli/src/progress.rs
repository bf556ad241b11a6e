use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pixmeta_core::BatchProgress;
use std::time::Duration;
use tokio::sync::mpsc;

/// Progress reporter for CLI operations
pub struct ProgressReporter {
    multi: MultiProgress,
    show_progress: bool,
}

impl ProgressReporter {
    pub fn new(show_progress: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            show_progress,
        }
    }

    /// Create progress bar for a batch
    pub fn create_bar(&self, total: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = self.multi.add(ProgressBar::new(total));
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(bar_style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Some(pb)
    }

    /// Mirror batch progress updates onto the bar until the sender closes.
    /// Returns the last update seen.
    pub async fn follow(
        pb: Option<ProgressBar>,
        mut rx: mpsc::UnboundedReceiver<BatchProgress>,
    ) -> Option<BatchProgress> {
        let mut last = None;
        while let Some(progress) = rx.recv().await {
            if let Some(pb) = &pb {
                pb.set_position(progress.completed as u64);
                if let Some(file) = &progress.current_file {
                    pb.set_message(file.clone());
                }
            }
            last = Some(progress);
        }
        last
    }

    /// Finish progress bar with success message
    pub fn finish_bar(pb: &Option<ProgressBar>, message: &str) {
        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} {}", style("✓").green(), message));
        }
    }

    /// Finish progress bar with error message
    pub fn finish_bar_error(pb: &Option<ProgressBar>, message: &str) {
        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} {}", style("✗").red(), message));
        }
    }
}
