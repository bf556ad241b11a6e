//! Metadata inference engine.
//!
//! Turns a decoded [`ImageHandle`] into an [`AnalysisReport`], filling in
//! resolution and compression from per-format defaults when the container
//! does not carry them. The engine does no I/O and never returns an error:
//! every failure becomes a note in the report's `extra_info`.

mod compression;
mod depth;
mod details;
mod dpi;
mod report;

pub use dpi::Dpi;
pub use report::{AnalysisReport, Outcome};

use pixmeta_common::{ImageFormat, Result};
use pixmeta_formats::{DecodeFailure, ImageHandle};
use report::ReportFields;

pub const UNRECOGNIZED: &str = "Unrecognized or corrupted image format.";

pub fn analyze(
    decoded: std::result::Result<ImageHandle, DecodeFailure>,
    filename: &str,
) -> AnalysisReport {
    let handle = match decoded {
        Ok(handle) => handle,
        Err(DecodeFailure::Unidentified) => {
            tracing::warn!("{}: unrecognized image data", filename);
            return AnalysisReport::degraded(
                filename,
                Outcome::Unreadable,
                UNRECOGNIZED.to_string(),
            );
        }
        Err(DecodeFailure::Other(detail)) => {
            tracing::warn!("{}: decode failed: {}", filename, detail);
            return AnalysisReport::degraded(
                filename,
                Outcome::Failed,
                format!("Analysis error: {detail}"),
            );
        }
    };

    let Some(format) = handle.format.supported() else {
        tracing::warn!("{}: {} is not supported", filename, handle.format);
        return AnalysisReport::degraded(
            filename,
            Outcome::Unsupported,
            format!(
                "Format {} is not in the supported list ({})",
                handle.format,
                ImageFormat::supported_list()
            ),
        );
    };

    let size = format!("{} x {}", handle.width, handle.height);
    match derive(&handle, format, size.clone()) {
        Ok(fields) => AnalysisReport::analyzed(filename, fields),
        Err(e) => {
            tracing::warn!("{}: analysis failed: {}", filename, e);
            AnalysisReport::failed(filename, format.name(), size, format!("Analysis error: {e}"))
        }
    }
}

fn derive(handle: &ImageHandle, format: ImageFormat, size: String) -> Result<ReportFields> {
    let dpi = dpi::infer(handle, format)?
        .map(|dpi| dpi.to_string())
        .unwrap_or_else(|| dpi::NOT_SPECIFIED.to_string());

    Ok(ReportFields {
        format: format.name().to_string(),
        size,
        dpi,
        depth: depth::describe(handle, format),
        compression: compression::infer(handle, format).to_string(),
        extra_info: details::collect(handle, format),
    })
}
