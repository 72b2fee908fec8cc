//! Run results in their reporting shape.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{
    BatchSummary, OverallSummary, batch_name, group_by_batch, summarize_overall,
};
use crate::models::field::{ExpectedValue, FieldKind};
use crate::models::fragment::TextFragment;
use crate::models::verification::{DocumentVerification, FieldMatchResult};

/// One compared field as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub field: String,
    pub kind: FieldKind,
    pub matched: bool,
    pub expected: ExpectedValue,
    pub found: Option<String>,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&FieldMatchResult> for FieldReport {
    fn from(r: &FieldMatchResult) -> Self {
        Self {
            field: r.field.clone(),
            kind: r.kind,
            matched: r.matched,
            expected: r.expected.clone(),
            found: r.found_text.clone(),
            score: r.score,
            error: r.error.clone(),
        }
    }
}

/// One document as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub document_id: String,
    pub fragment_count: usize,
    pub found_count: usize,
    pub total_count: usize,
    pub fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragments: Option<Vec<TextFragment>>,
}

impl DocumentReport {
    pub fn new(doc: &DocumentVerification, include_fragments: bool) -> Self {
        Self {
            document_id: doc.document_id.clone(),
            fragment_count: doc.fragments.len(),
            found_count: doc.found_count(),
            total_count: doc.total_count(),
            fields: doc.results.iter().map(FieldReport::from).collect(),
            error: doc.error.clone(),
            fragments: include_fragments.then(|| doc.fragments.clone()),
        }
    }
}

/// A batch summary with its documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub documents: Vec<DocumentReport>,
}

/// Aggregated result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub overall: OverallSummary,
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    /// Aggregate document verifications into batches and overall totals.
    pub fn build(documents: &[DocumentVerification], include_fragments: bool) -> Self {
        let batches: Vec<BatchReport> = group_by_batch(documents)
            .into_iter()
            .map(|(batch, docs)| BatchReport {
                summary: BatchSummary::from_documents(batch_name(batch), docs.iter().copied()),
                documents: docs
                    .iter()
                    .map(|d| DocumentReport::new(d, include_fragments))
                    .collect(),
            })
            .collect();

        let summaries: Vec<BatchSummary> = batches.iter().map(|b| b.summary.clone()).collect();

        Self {
            generated_at: Utc::now(),
            overall: summarize_overall(&summaries),
            batches,
        }
    }

    /// Documents that could not be processed, with their batch.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &DocumentReport)> {
        self.batches.iter().flat_map(|b| {
            b.documents
                .iter()
                .filter(|d| d.error.is_some())
                .map(move |d| (b.summary.batch_id.as_str(), d))
        })
    }

    /// Human-readable rendering of the report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let o = &self.overall;

        let _ = writeln!(out, "Verification report ({})", self.generated_at.to_rfc3339());
        let _ = writeln!(
            out,
            "Overall: {}/{} fields found ({:.2}%) in {} documents, {} batches, {} failed",
            o.fields_found,
            o.total_fields,
            o.success_rate,
            o.total_documents,
            o.total_batches,
            o.failed_documents
        );

        for batch in &self.batches {
            let s = &batch.summary;
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Batch {}: {}/{} fields found ({:.2}%) in {} documents",
                s.batch_id, s.fields_found, s.total_fields, s.success_rate, s.total_documents
            );

            for doc in &batch.documents {
                if let Some(error) = &doc.error {
                    let _ = writeln!(out, "  {}: ERROR {}", doc.document_id, error);
                    continue;
                }

                let _ = writeln!(
                    out,
                    "  {}: {}/{} fields, {} fragments",
                    doc.document_id, doc.found_count, doc.total_count, doc.fragment_count
                );
                for field in &doc.fields {
                    let _ = writeln!(
                        out,
                        "    [{}] {} ({}): expected '{}', found '{}'{}",
                        if field.matched { "ok" } else { "--" },
                        field.field,
                        field.kind,
                        field.expected,
                        field.found.as_deref().unwrap_or("-"),
                        field
                            .score
                            .map(|s| format!(", score {:.2}", s))
                            .unwrap_or_default()
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::ExpectedField;
    use crate::verify::DocumentVerifier;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<DocumentVerification> {
        let verifier = DocumentVerifier::default();
        let fields = vec![
            ExpectedField::new("valor", "150,00"),
            ExpectedField::new("nome", "Maria Silva"),
        ];
        let fragments = vec![
            TextFragment::new("Silva Maria", 0.9),
            TextFragment::new("150.00", 0.95),
        ];

        vec![
            verifier.verify("a.png", Some("edital-1".into()), fragments, &fields),
            DocumentVerification::failed("b.pdf", Some("edital-1".into()), "no raster images"),
        ]
    }

    #[test]
    fn test_build() {
        let report = RunReport::build(&sample(), false);

        assert_eq!(report.batches.len(), 1);
        assert_eq!(report.overall.fields_found, 2);
        assert_eq!(report.overall.success_rate, 100.0);

        let doc = &report.batches[0].documents[0];
        assert_eq!(doc.fragment_count, 2);
        assert_eq!(doc.fields[0].found.as_deref(), Some("150.00"));
        assert!(doc.fragments.is_none());

        let failures: Vec<&str> = report.failures().map(|(_, d)| d.document_id.as_str()).collect();
        assert_eq!(failures, vec!["b.pdf"]);
    }

    #[test]
    fn test_json_shape() {
        let report = RunReport::build(&sample(), true);
        let json = serde_json::to_value(&report).unwrap();

        let batch = &json["batches"][0];
        assert_eq!(batch["batchId"], "edital-1");
        assert_eq!(batch["totalDocuments"], 2);
        assert_eq!(batch["documents"][0]["documentId"], "a.png");
        assert_eq!(batch["documents"][0]["fields"][0]["expected"], "150,00");
        assert_eq!(batch["documents"][0]["fields"][0]["matched"], true);
        assert_eq!(batch["documents"][0]["fragments"][0]["text"], "Silva Maria");
        assert_eq!(batch["documents"][1]["error"], "no raster images");
        assert_eq!(json["overall"]["successRate"], 100.0);
    }

    #[test]
    fn test_to_text() {
        let text = RunReport::build(&sample(), false).to_text();

        assert!(text.contains("Batch edital-1: 2/2 fields found (100.00%) in 2 documents"));
        assert!(text.contains("[ok] valor (numeric): expected '150,00', found '150.00'"));
        assert!(text.contains("b.pdf: ERROR no raster images"));
    }
}
