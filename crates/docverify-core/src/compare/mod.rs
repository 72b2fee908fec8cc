//! Field comparison strategies.

pub mod fuzzy;
pub mod normalize;
pub mod numeric;

pub use fuzzy::{compare_name, token_sort_ratio};
pub use normalize::{normalize_text, normalize_value, parse_decimal};
pub use numeric::{closest_candidate, first_within_tolerance, NumericCandidate};

use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::config::MatchingConfig;
use crate::models::fragment::TextFragment;
use crate::models::verification::Verdict;

/// Default token-sort threshold for text fields.
pub const DEFAULT_NAME_THRESHOLD: f64 = 80.0;

/// Stateless comparator holding the matching parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparator {
    value_tolerance: Decimal,
    name_threshold: f64,
}

impl FieldComparator {
    /// Comparator with tolerance 0.01 and threshold 80.
    pub fn new() -> Self {
        Self {
            value_tolerance: Decimal::new(1, 2),
            name_threshold: DEFAULT_NAME_THRESHOLD,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            value_tolerance: config.tolerance()?,
            name_threshold: config.name_match_threshold,
        })
    }

    /// Set the numeric tolerance.
    pub fn with_value_tolerance(mut self, tolerance: Decimal) -> Self {
        self.value_tolerance = tolerance;
        self
    }

    /// Set the fuzzy-text threshold.
    pub fn with_name_threshold(mut self, threshold: f64) -> Self {
        self.name_threshold = threshold;
        self
    }

    pub fn value_tolerance(&self) -> Decimal {
        self.value_tolerance
    }

    pub fn name_threshold(&self) -> f64 {
        self.name_threshold
    }

    /// Numeric-tolerance strategy over a textual expectation.
    pub fn compare_value(&self, expected: &str, fragments: &[TextFragment]) -> Verdict {
        numeric::compare_value(expected, fragments, self.value_tolerance)
    }

    /// Numeric-tolerance strategy over an already-parsed expectation.
    pub fn compare_amount(&self, expected: Decimal, fragments: &[TextFragment]) -> Verdict {
        numeric::compare_amount(expected, fragments, self.value_tolerance)
    }

    /// Fuzzy-text strategy.
    pub fn compare_name(&self, expected: &str, fragments: &[TextFragment]) -> Verdict {
        fuzzy::compare_name(expected, fragments, self.name_threshold)
    }
}

impl Default for FieldComparator {
    fn default() -> Self {
        Self::new()
    }
}
