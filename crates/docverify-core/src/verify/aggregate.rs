//! Batch and overall success-rate statistics.
//!
//! Aggregation is a pure reduction over documents: it does not depend on
//! document order and recomputes everything on each call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::verification::DocumentVerification;

/// Batch id used for documents directly under the input root.
pub const DEFAULT_BATCH: &str = "default";

/// `found / total * 100`, or 0 when there is nothing to find.
pub fn success_rate(found: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    found as f64 / total as f64 * 100.0
}

/// Statistics for one batch ("edital").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub batch_id: String,
    pub total_documents: usize,
    pub failed_documents: usize,
    pub total_fields: usize,
    pub fields_found: usize,
    pub success_rate: f64,
}

impl BatchSummary {
    pub fn from_documents<'a, I>(batch_id: impl Into<String>, documents: I) -> Self
    where
        I: IntoIterator<Item = &'a DocumentVerification>,
    {
        let mut summary = Self {
            batch_id: batch_id.into(),
            total_documents: 0,
            failed_documents: 0,
            total_fields: 0,
            fields_found: 0,
            success_rate: 0.0,
        };

        for doc in documents {
            summary.total_documents += 1;
            summary.failed_documents += usize::from(doc.is_failed());
            summary.total_fields += doc.total_count();
            summary.fields_found += doc.found_count();
        }

        summary.success_rate = success_rate(summary.fields_found, summary.total_fields);
        summary
    }
}

/// Statistics across all batches of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_batches: usize,
    pub total_documents: usize,
    pub failed_documents: usize,
    pub total_fields: usize,
    pub fields_found: usize,
    pub success_rate: f64,
}

/// Display id of a batch key.
pub fn batch_name(batch_id: Option<&str>) -> &str {
    batch_id.unwrap_or(DEFAULT_BATCH)
}

/// Group documents by batch.
///
/// Root-level documents (`None`) come first, then batch subdirectories in
/// lexical order. A subdirectory named `default` stays a separate group.
pub fn group_by_batch(
    documents: &[DocumentVerification],
) -> BTreeMap<Option<&str>, Vec<&DocumentVerification>> {
    let mut groups: BTreeMap<Option<&str>, Vec<&DocumentVerification>> = BTreeMap::new();
    for doc in documents {
        groups.entry(doc.batch_id.as_deref()).or_default().push(doc);
    }
    groups
}

/// One summary per batch, in [`group_by_batch`] order.
pub fn summarize_batches(documents: &[DocumentVerification]) -> Vec<BatchSummary> {
    group_by_batch(documents)
        .into_iter()
        .map(|(batch, docs)| BatchSummary::from_documents(batch_name(batch), docs))
        .collect()
}

/// Totals across batches with the same success-rate formula.
pub fn summarize_overall(batches: &[BatchSummary]) -> OverallSummary {
    let total_fields = batches.iter().map(|b| b.total_fields).sum();
    let fields_found = batches.iter().map(|b| b.fields_found).sum();

    OverallSummary {
        total_batches: batches.len(),
        total_documents: batches.iter().map(|b| b.total_documents).sum(),
        failed_documents: batches.iter().map(|b| b.failed_documents).sum(),
        total_fields,
        fields_found,
        success_rate: success_rate(fields_found, total_fields),
    }
}
