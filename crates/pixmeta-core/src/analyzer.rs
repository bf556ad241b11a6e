use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use pixmeta_common::{Error, Result};
use pixmeta_formats::ImageDecoder;

use crate::batch::{default_worker_count, BatchJob};
use crate::engine::{self, AnalysisReport};

/// Synchronous analysis front end with its own bounded worker pool
pub struct Analyzer {
    pool: ThreadPool,
}

impl Analyzer {
    /// `workers == 0` picks [`default_worker_count`]
    pub fn new(workers: usize) -> Result<Self> {
        let workers = if workers == 0 {
            default_worker_count()
        } else {
            workers
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pixmeta-worker-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        tracing::debug!("Analyzer pool started with {} workers", workers);
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn analyze_bytes(&self, bytes: &[u8], filename: &str) -> AnalysisReport {
        engine::analyze(ImageDecoder::decode(bytes), filename)
    }

    pub fn analyze_path(&self, path: &Path) -> AnalysisReport {
        BatchJob::from_path(path).run()
    }

    /// Analyze in parallel; one report per job, in job order
    pub fn analyze_batch(&self, jobs: Vec<BatchJob>) -> Vec<AnalysisReport> {
        tracing::info!("Analyzing {} files on {} workers", jobs.len(), self.workers());

        self.pool.install(|| {
            jobs.par_iter()
                .map(|job| guarded(job, || job.run()))
                .collect()
        })
    }
}

/// Run `work` for `job`, turning a panic into that job's failure report
fn guarded(job: &BatchJob, work: impl FnOnce() -> AnalysisReport) -> AnalysisReport {
    panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
        tracing::warn!("{}: worker panicked", job.filename);
        job.abandoned("panicked")
    })
}
