use futures::stream::{self, StreamExt};
use pixmeta_common::{Error, Result};
use pixmeta_formats::ImageDecoder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::engine::{self, AnalysisReport};

/// Upper bound for the automatic worker count
const MAX_DEFAULT_WORKERS: usize = 32;

/// min(32, 2 × CPUs)
pub fn default_worker_count() -> usize {
    (2 * num_cpus::get()).min(MAX_DEFAULT_WORKERS)
}

/// Where a job's bytes come from
#[derive(Debug, Clone)]
pub enum JobSource {
    Bytes(Arc<[u8]>),
    /// Read by the worker
    Path(PathBuf),
}

/// Single file to analyze in a batch
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub filename: String,
    pub source: JobSource,
}

impl BatchJob {
    pub fn from_bytes(filename: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            source: JobSource::Bytes(bytes.into()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            filename,
            source: JobSource::Path(path),
        }
    }

    /// Decode and analyze (synchronous; call from a worker thread)
    pub fn run(&self) -> AnalysisReport {
        let decoded = match &self.source {
            JobSource::Bytes(bytes) => ImageDecoder::decode(bytes),
            JobSource::Path(path) => ImageDecoder::decode_path(path),
        };
        engine::analyze(decoded, &self.filename)
    }

    /// Report for a job whose worker died before producing one
    pub(crate) fn abandoned(&self, reason: impl std::fmt::Display) -> AnalysisReport {
        engine::analyze(
            Err(pixmeta_formats::DecodeFailure::Other(format!(
                "worker failed: {reason}"
            ))),
            &self.filename,
        )
    }
}

/// Progress tracking for batch operations
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub current_file: Option<String>,
    /// (file, extra_info) for every report that did not fully analyze
    pub failed: Vec<(String, String)>,
}

impl BatchProgress {
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f32 / self.total as f32) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Run decode work off the async runtime. A worker that panics or is
/// cancelled yields the job's failure report instead.
async fn on_blocking_pool<F>(job: &BatchJob, work: F) -> AnalysisReport
where
    F: FnOnce() -> AnalysisReport + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("{}: worker join error: {}", job.filename, e);
            job.abandoned(e)
        }
    }
}

/// Async batch processor with progress tracking
pub struct BatchProcessor {
    /// Maximum files in flight
    concurrency: usize,
}

impl BatchProcessor {
    pub fn new(concurrency: usize) -> Self {
        let concurrency = if concurrency == 0 {
            default_worker_count()
        } else {
            concurrency
        };

        tracing::debug!(
            "BatchProcessor initialized with concurrency={}",
            concurrency
        );
        Self { concurrency }
    }

    /// Analyze every job, sending progress updates through the channel.
    /// Reports come back in submission order, one per job.
    pub async fn process_batch(
        &self,
        jobs: Vec<BatchJob>,
        progress_tx: mpsc::UnboundedSender<BatchProgress>,
    ) -> Vec<AnalysisReport> {
        let total = jobs.len();
        tracing::info!("Starting batch analysis: {} files", total);

        let progress = Arc::new(Mutex::new(BatchProgress {
            completed: 0,
            total,
            current_file: None,
            failed: Vec::new(),
        }));

        let initial_progress = progress.lock().await.clone();
        let _ = progress_tx.send(initial_progress);

        let reports: Vec<AnalysisReport> = stream::iter(jobs)
            .map(|job| {
                let progress = Arc::clone(&progress);
                let progress_tx = progress_tx.clone();

                async move {
                    {
                        let mut p = progress.lock().await;
                        p.current_file = Some(job.filename.clone());
                        let _ = progress_tx.send(p.clone());
                    }

                    let report = on_blocking_pool(&job, {
                        let job = job.clone();
                        move || job.run()
                    })
                    .await;

                    {
                        let mut p = progress.lock().await;
                        p.completed += 1;
                        if !report.is_analyzed() {
                            p.failed.push((
                                report.filename().to_string(),
                                report.extra_info().to_string(),
                            ));
                        }
                        let _ = progress_tx.send(p.clone());
                    }

                    report
                }
            })
            // keeps submission order
            .buffered(self.concurrency)
            .collect()
            .await;

        tracing::info!(
            "Batch analysis complete: {}/{} analyzed",
            reports.iter().filter(|r| r.is_analyzed()).count(),
            total
        );

        reports
    }

    /// Convenience method: process batch and wait for completion
    pub async fn process_batch_sync(&self, jobs: Vec<BatchJob>) -> Result<Vec<AnalysisReport>> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let processor_handle = {
            let concurrency = self.concurrency;
            tokio::spawn(async move {
                let processor = BatchProcessor { concurrency };
                processor.process_batch(jobs, tx).await
            })
        };

        tokio::spawn(async move {
            while let Some(progress) = rx.recv().await {
                tracing::debug!(
                    "Progress: {}/{} ({:.1}%)",
                    progress.completed,
                    progress.total,
                    progress.percentage()
                );
            }
        });

        processor_handle
            .await
            .map_err(|e| Error::WorkerPool(format!("Batch processing failed: {}", e)))
    }
}
