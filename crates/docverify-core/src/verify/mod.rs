//! Per-document verification and result aggregation.

pub mod aggregate;
pub mod report;

pub use aggregate::{BatchSummary, OverallSummary, success_rate, summarize_batches, summarize_overall};
pub use report::{DocumentReport, FieldReport, RunReport};

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Number;
use tracing::{debug, warn};

use crate::compare::FieldComparator;
use crate::error::{ComparisonError, Result};
use crate::models::config::MatchingConfig;
use crate::models::field::{ExpectedField, ExpectedValue, FieldKind};
use crate::models::fragment::TextFragment;
use crate::models::verification::{DocumentVerification, FieldMatchResult};

/// Dispatches each expected field to the matching comparator.
#[derive(Debug, Clone)]
pub struct DocumentVerifier {
    comparator: FieldComparator,
    numeric_fields: Vec<String>,
}

impl DocumentVerifier {
    pub fn new(comparator: FieldComparator) -> Self {
        Self {
            comparator,
            numeric_fields: MatchingConfig::default().numeric_fields,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Result<Self> {
        Ok(Self {
            comparator: FieldComparator::from_config(config)?,
            numeric_fields: config.numeric_fields.clone(),
        })
    }

    /// Set the field keys treated as numeric.
    pub fn with_numeric_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn comparator(&self) -> &FieldComparator {
        &self.comparator
    }

    pub fn kind_of(&self, field: &ExpectedField) -> FieldKind {
        FieldKind::classify(field, &self.numeric_fields)
    }

    /// Compare one field against the document's fragments.
    pub fn verify_field(
        &self,
        field: &ExpectedField,
        fragments: &[TextFragment],
    ) -> std::result::Result<FieldMatchResult, ComparisonError> {
        let kind = self.kind_of(field);
        let verdict = match (kind, &field.value) {
            (FieldKind::Numeric, ExpectedValue::Number(n)) => {
                self.comparator.compare_amount(number_to_decimal(n)?, fragments)
            }
            (FieldKind::Numeric, ExpectedValue::Text(s)) => {
                self.comparator.compare_value(s, fragments)
            }
            (FieldKind::Text, value) => self.comparator.compare_name(&value.as_text(), fragments),
        };

        Ok(FieldMatchResult::from_verdict(field, kind, verdict))
    }

    /// Verify every expected field of one document.
    ///
    /// A field whose comparison fails is recorded as a non-match; the other
    /// fields are still compared.
    pub fn verify(
        &self,
        document_id: impl Into<String>,
        batch_id: Option<String>,
        fragments: Vec<TextFragment>,
        fields: &[ExpectedField],
    ) -> DocumentVerification {
        let mut doc = DocumentVerification::new(document_id, batch_id, fragments);

        for field in fields {
            let result = match self.verify_field(field, &doc.fragments) {
                Ok(result) => result,
                Err(e) => {
                    warn!("{}: field '{}' not compared: {}", doc.document_id, field.key, e);
                    FieldMatchResult::failed(field, self.kind_of(field), e.to_string())
                }
            };
            doc.push(result);
        }

        debug!(
            "{}: {}/{} fields found",
            doc.document_id,
            doc.found_count(),
            doc.total_count()
        );
        doc
    }
}

impl Default for DocumentVerifier {
    fn default() -> Self {
        Self::new(FieldComparator::new())
    }
}

/// Exact decimal form of a JSON number.
fn number_to_decimal(n: &Number) -> std::result::Result<Decimal, ComparisonError> {
    let s = n.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .map_err(|_| ComparisonError::UnrepresentableNumber(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(text: &str) -> TextFragment {
        TextFragment::new(text, 0.95)
    }

    #[test]
    fn test_monetary_field_end_to_end() {
        let verifier = DocumentVerifier::default();
        let fields = vec![ExpectedField::new("valor", "150,00")];

        let doc = verifier.verify("nota.png", None, vec![fragment("150.00")], &fields);

        assert_eq!(doc.results.len(), 1);
        let result = &doc.results[0];
        assert_eq!(result.kind, FieldKind::Numeric);
        assert!(result.matched);
        assert_eq!(result.found_text.as_deref(), Some("150.00"));
        assert_eq!(result.found_fragment.as_ref().unwrap().confidence, 0.95);
    }

    #[test]
    fn test_name_field_end_to_end() {
        let verifier = DocumentVerifier::default();
        let fields = vec![ExpectedField::new("nome", "João Paulo")];

        let doc = verifier.verify("nota.png", None, vec![fragment("Joao Paulo Silva")], &fields);

        let result = &doc.results[0];
        assert_eq!(result.kind, FieldKind::Text);
        assert!(!result.matched);
        assert!((result.score.unwrap() - 69.230_769_230_769_23).abs() < 1e-9);
    }

    #[test]
    fn test_declared_number_uses_numeric_strategy() {
        let verifier = DocumentVerifier::default().with_numeric_fields(Vec::<String>::new());
        let fields = vec![ExpectedField::new("codigo", 1234.5_f64)];

        let doc = verifier.verify("a.png", None, vec![fragment("1.234,50")], &fields);

        assert_eq!(doc.results[0].kind, FieldKind::Numeric);
        assert!(doc.results[0].matched);
    }

    #[test]
    fn test_unrepresentable_number_is_recorded_per_field() {
        let verifier = DocumentVerifier::default();
        let huge = ExpectedValue::from_json(&serde_json::json!(1e40)).unwrap();
        let fields = vec![
            ExpectedField {
                key: "valor".to_string(),
                value: huge,
            },
            ExpectedField::new("nome", "Maria Silva"),
        ];

        let doc = verifier.verify("a.png", None, vec![fragment("Maria Silva")], &fields);

        assert_eq!(doc.total_count(), 2);
        assert!(!doc.results[0].matched);
        assert!(doc.results[0].error.is_some());
        assert!(doc.results[1].matched);
        assert_eq!(doc.found_count(), 1);
    }

    #[test]
    fn test_no_fields_no_results() {
        let doc = DocumentVerifier::default().verify("a.png", None, vec![fragment("Total")], &[]);
        assert_eq!(doc.total_count(), 0);
        assert_eq!(doc.fragments.len(), 1);
    }
}
