//! Batch admission checks run before any file is analyzed.
//!
//! A batch is rejected as a whole on the first violation: an empty batch, too
//! many files, a file without an extension, or an extension outside the
//! allow-list.

use std::path::Path;

/// Upper bound on files accepted in a single batch
pub const MAX_FILES: usize = 100_000;

/// Extensions accepted by default
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "tif", "tiff", "bmp", "pcx"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No files selected or the batch is empty.")]
    EmptyBatch,

    #[error("Maximum number of files exceeded ({max}).")]
    TooManyFiles { max: usize },

    #[error("File \"{0}\" has no extension.")]
    MissingExtension(String),

    #[error("File \"{name}\" has a forbidden type. Allowed: {allowed}")]
    ForbiddenExtension { name: String, allowed: String },
}

/// Limits a batch must satisfy
#[derive(Debug, Clone)]
pub struct BatchPolicy {
    pub max_files: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_files: MAX_FILES,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BatchPolicy {
    pub fn new(max_files: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_files,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Validate a batch by file name
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ValidationError> {
        if names.is_empty() || names[0].as_ref().is_empty() {
            return Err(ValidationError::EmptyBatch);
        }

        if names.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                max: self.max_files,
            });
        }

        for name in names {
            self.check_extension(name.as_ref())?;
        }

        tracing::debug!("Batch of {} files passed validation", names.len());
        Ok(())
    }

    fn check_extension(&self, name: &str) -> Result<(), ValidationError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ValidationError::MissingExtension(name.to_string()))?;

        let ext = ext.to_lowercase();
        if self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            Ok(())
        } else {
            Err(ValidationError::ForbiddenExtension {
                name: name.to_string(),
                allowed: self.allowed_extensions.join(", "),
            })
        }
    }
}
