use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Expand command-line inputs (files, directories, glob patterns) into files,
/// keeping the order they were given in.
pub fn collect_inputs(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            collect_dir(path, recursive, &mut files)?;
        } else if is_pattern(input) {
            let matched = resolve_pattern(input)?;
            if matched.is_empty() {
                tracing::warn!("No files matched pattern: {}", input);
            }
            files.extend(matched);
        } else {
            anyhow::bail!("No such file or directory: {}", input);
        }
    }

    tracing::debug!("Collected {} input files", files.len());
    Ok(files)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn resolve_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    tracing::debug!("Glob pattern: {}", pattern);

    let mut matches = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    matches.push(path);
                }
            }
            Err(e) => tracing::warn!("Glob error: {}", e),
        }
    }
    Ok(matches)
}

fn collect_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort();

    for path in entries {
        if path.is_file() {
            files.push(path);
        } else if recursive && path.is_dir() {
            collect_dir(&path, recursive, files)?;
        }
    }
    Ok(())
}
