use serde::Serialize;

pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// How far the engine got with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Analyzed,
    /// Decoded, but the format is outside the allow-list
    Unsupported,
    /// No decoder recognized the bytes
    Unreadable,
    /// Decoding or field derivation failed part way
    Failed,
}

/// Display-ready metadata for one input file.
///
/// Built once by the engine and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    filename: String,
    format: String,
    size: String,
    dpi: String,
    depth: String,
    compression: String,
    extra_info: String,
    #[serde(skip)]
    outcome: Outcome,
}

/// Fields of a fully analyzed file
pub(crate) struct ReportFields {
    pub format: String,
    pub size: String,
    pub dpi: String,
    pub depth: String,
    pub compression: String,
    pub extra_info: String,
}

impl AnalysisReport {
    pub(crate) fn analyzed(filename: &str, fields: ReportFields) -> Self {
        Self {
            filename: filename.to_string(),
            format: fields.format,
            size: fields.size,
            dpi: fields.dpi,
            depth: fields.depth,
            compression: fields.compression,
            extra_info: fields.extra_info,
            outcome: Outcome::Analyzed,
        }
    }

    /// Every derived field "N/A", with a note explaining why
    pub(crate) fn degraded(filename: &str, outcome: Outcome, extra_info: String) -> Self {
        Self {
            filename: filename.to_string(),
            format: NOT_AVAILABLE.to_string(),
            size: NOT_AVAILABLE.to_string(),
            dpi: NOT_AVAILABLE.to_string(),
            depth: NOT_AVAILABLE.to_string(),
            compression: NOT_AVAILABLE.to_string(),
            extra_info,
            outcome,
        }
    }

    /// Analysis error after the format was identified: keeps format and size
    pub(crate) fn failed(filename: &str, format: &str, size: String, extra_info: String) -> Self {
        Self {
            format: format.to_string(),
            size,
            ..Self::degraded(filename, Outcome::Failed, extra_info)
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn dpi(&self) -> &str {
        &self.dpi
    }

    pub fn depth(&self) -> &str {
        &self.depth
    }

    pub fn compression(&self) -> &str {
        &self.compression
    }

    pub fn extra_info(&self) -> &str {
        &self.extra_info
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_analyzed(&self) -> bool {
        self.outcome == Outcome::Analyzed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_report_fields() {
        let report = AnalysisReport::degraded("x.png", Outcome::Unreadable, "broken".into());
        assert_eq!(report.filename(), "x.png");
        assert_eq!(report.format(), "N/A");
        assert_eq!(report.compression(), "N/A");
        assert!(!report.is_analyzed());
    }

    #[test]
    fn test_failed_keeps_identity() {
        let report = AnalysisReport::failed("a.tif", "TIFF", "2 x 2".into(), "bad".into());
        assert_eq!(report.format(), "TIFF");
        assert_eq!(report.size(), "2 x 2");
        assert_eq!(report.dpi(), "N/A");
        assert_eq!(report.outcome(), Outcome::Failed);
    }

    #[test]
    fn test_serializes_display_fields_only() {
        let report = AnalysisReport::degraded("x.gif", Outcome::Unsupported, "nope".into());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["extra_info"], "nope");
        assert_eq!(json["format"], "N/A");
        assert!(json.get("outcome").is_none());
    }
}
