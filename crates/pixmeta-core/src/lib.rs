pub mod analyzer;
pub mod batch;
pub mod engine;

pub use analyzer::Analyzer;
pub use batch::{default_worker_count, BatchJob, BatchProcessor, BatchProgress, JobSource};
pub use engine::{analyze, AnalysisReport, Outcome};
