//! Output and result types.
//!
//! The batch scheduler never throws "some documents failed" as an error;
//! partial failure is an expected, representable state. Each input document
//! produces exactly one [`DocumentOutcome`]: either a finished
//! [`InvertedDocument`] or a captured [`InvertError`]. The stats types are
//! serde-serialisable so the CLI can emit them as `--json`.

use crate::error::InvertError;
use serde::{Deserialize, Serialize};

/// A successfully inverted document: name + bytes, ready for the caller to
/// save, offer as a download, or bundle into an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvertedDocument {
    /// Name of the input this was produced from.
    pub source_name: String,
    /// Derived output name (`report.pdf` → `report_inverted.pdf`).
    pub output_name: String,
    /// The finished PDF. Skipped in JSON output; consumers wanting the bytes
    /// hold the struct itself.
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Per-document conversion statistics.
    pub stats: DocumentStats,
}

/// Timing and size statistics for one document conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Pages in the source document (== pages in the output).
    pub pages: usize,
    /// Wall-clock time spent rasterizing, across all pages.
    pub render_ms: u64,
    /// Wall-clock time spent inverting + encoding, across all pages.
    pub encode_ms: u64,
    /// Total conversion time including assembly.
    pub total_ms: u64,
    /// Size of the produced PDF in bytes.
    pub output_bytes: usize,
}

/// Outcome for one document in a batch: exactly one of the two shapes is
/// produced per input.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// The document converted fully.
    Success(InvertedDocument),
    /// The document failed at some page boundary; no partial output exists.
    Failure {
        source_name: String,
        error: InvertError,
    },
}

impl DocumentOutcome {
    /// Name of the input document this outcome belongs to.
    pub fn source_name(&self) -> &str {
        match self {
            DocumentOutcome::Success(doc) => &doc.source_name,
            DocumentOutcome::Failure { source_name, .. } => source_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Success(_))
    }
}

/// Result of a whole batch run.
///
/// The batch itself never fails: `outcomes` holds one entry per input
/// document, and [`summary`](BatchSummary) aggregates them.
#[derive(Debug)]
pub struct BatchOutput {
    /// One outcome per input document, in submission order regardless of
    /// completion order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Aggregate counts and timing.
    pub summary: BatchSummary,
}

impl BatchOutput {
    /// Consume the batch, keeping only the successful documents.
    ///
    /// This is the upward-facing success list: failures were already logged
    /// by the scheduler and reported through the progress callback.
    pub fn into_successes(self) -> Vec<InvertedDocument> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                DocumentOutcome::Success(doc) => Some(doc),
                DocumentOutcome::Failure { .. } => None,
            })
            .collect()
    }

    /// Iterate over the failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &InvertError)> {
        self.outcomes.iter().filter_map(|o| match o {
            DocumentOutcome::Failure { source_name, error } => {
                Some((source_name.as_str(), error))
            }
            DocumentOutcome::Success(_) => None,
        })
    }
}

/// Aggregate counts for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_ms: u64,
}

/// Lightweight document description, produced by [`crate::convert::inspect`]
/// without running the conversion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Nominal physical size of each page, in page order.
    pub pages: Vec<PageGeometry>,
}

/// Nominal physical size of a page in point units (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(name: &str) -> DocumentOutcome {
        DocumentOutcome::Success(InvertedDocument {
            source_name: name.into(),
            output_name: format!("{name}_inverted.pdf"),
            data: vec![1, 2, 3],
            stats: DocumentStats::default(),
        })
    }

    fn failure(name: &str) -> DocumentOutcome {
        DocumentOutcome::Failure {
            source_name: name.into(),
            error: InvertError::EmptyDocument { name: name.into() },
        }
    }

    #[test]
    fn into_successes_filters_failures() {
        let batch = BatchOutput {
            outcomes: vec![success("a"), failure("b"), success("c")],
            summary: BatchSummary {
                total: 3,
                succeeded: 2,
                failed: 1,
                total_ms: 0,
            },
        };
        let ok = batch.into_successes();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok[0].source_name, "a");
        assert_eq!(ok[1].source_name, "c");
    }

    #[test]
    fn failures_iterates_only_failures() {
        let batch = BatchOutput {
            outcomes: vec![success("a"), failure("b")],
            summary: BatchSummary::default(),
        };
        let failed: Vec<&str> = batch.failures().map(|(n, _)| n).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn json_skips_document_bytes() {
        let DocumentOutcome::Success(doc) = success("a") else {
            unreachable!()
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("output_name"));
        assert!(!json.contains("\"data\""));
    }
}
