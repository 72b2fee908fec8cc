//! Per-field and per-document verification results.

use serde::{Deserialize, Serialize};

use super::field::{ExpectedField, ExpectedValue, FieldKind};
use super::fragment::TextFragment;

/// Outcome of one comparator call against a fragment sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Verdict {
    pub matched: bool,
    pub found_text: Option<String>,
    pub found_fragment: Option<TextFragment>,
    /// Absolute numeric difference, or 0-100 similarity.
    pub score: Option<f64>,
}

impl Verdict {
    pub fn no_match() -> Self {
        Self::default()
    }
}

/// Result of verifying one expected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatchResult {
    pub field: String,
    pub kind: FieldKind,
    pub matched: bool,
    pub expected: ExpectedValue,
    pub found_text: Option<String>,
    pub found_fragment: Option<TextFragment>,
    pub score: Option<f64>,
    /// Set when the comparison itself failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldMatchResult {
    pub fn from_verdict(field: &ExpectedField, kind: FieldKind, verdict: Verdict) -> Self {
        Self {
            field: field.key.clone(),
            kind,
            matched: verdict.matched,
            expected: field.value.clone(),
            found_text: verdict.found_text,
            found_fragment: verdict.found_fragment,
            score: verdict.score,
            error: None,
        }
    }

    /// A non-match recorded for a comparison that could not run.
    pub fn failed(field: &ExpectedField, kind: FieldKind, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_verdict(field, kind, Verdict::no_match())
        }
    }
}

/// Verification of one document within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVerification {
    pub document_id: String,
    /// Batch the document belongs to; `None` for documents directly under the root.
    pub batch_id: Option<String>,
    pub fragments: Vec<TextFragment>,
    pub results: Vec<FieldMatchResult>,
    /// Document-level failure (unreadable file, rasterization error).
    pub error: Option<String>,
}

impl DocumentVerification {
    pub fn new(
        document_id: impl Into<String>,
        batch_id: Option<String>,
        fragments: Vec<TextFragment>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            batch_id,
            fragments,
            results: Vec::new(),
            error: None,
        }
    }

    /// An error entry for a document that could not be processed.
    pub fn failed(
        document_id: impl Into<String>,
        batch_id: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(document_id, batch_id, Vec::new())
        }
    }

    pub fn push(&mut self, result: FieldMatchResult) {
        self.results.push(result);
    }

    pub fn found_count(&self) -> usize {
        self.results.iter().filter(|r| r.matched).count()
    }

    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
