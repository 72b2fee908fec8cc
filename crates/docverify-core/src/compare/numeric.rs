//! Numeric-tolerance matching.
//!
//! The search runs in two passes that are kept apart on purpose:
//! [`first_within_tolerance`] is order-dependent and returns the first
//! acceptable fragment in recognition order, while [`closest_candidate`]
//! only runs when the first pass fails and returns the global minimum
//! difference (first-encountered on ties).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::normalize::parse_decimal;
use crate::models::fragment::TextFragment;
use crate::models::verification::Verdict;

/// A fragment whose text parsed as a decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericCandidate<'a> {
    /// Position in the fragment sequence.
    pub index: usize,
    pub fragment: &'a TextFragment,
    pub value: Decimal,
    /// Absolute difference from the expected value.
    pub difference: Decimal,
}

impl NumericCandidate<'_> {
    fn into_verdict(self, matched: bool) -> Verdict {
        Verdict {
            matched,
            found_text: Some(self.value.to_string()),
            found_fragment: Some(self.fragment.clone()),
            score: self.difference.to_f64(),
        }
    }
}

/// Fragments that parse as decimals, in recognition order.
///
/// A fragment whose difference from `expected` overflows a decimal is skipped.
pub fn candidates(
    expected: Decimal,
    fragments: &[TextFragment],
) -> impl Iterator<Item = NumericCandidate<'_>> {
    fragments.iter().enumerate().filter_map(move |(index, fragment)| {
        let value = parse_decimal(&fragment.text)?;
        let difference = value.checked_sub(expected)?.abs();
        Some(NumericCandidate {
            index,
            fragment,
            value,
            difference,
        })
    })
}

/// First fragment, in recognition order, within `tolerance` of `expected`.
pub fn first_within_tolerance(
    expected: Decimal,
    fragments: &[TextFragment],
    tolerance: Decimal,
) -> Option<NumericCandidate<'_>> {
    candidates(expected, fragments).find(|c| c.difference <= tolerance)
}

/// Fragment with the smallest difference from `expected`.
pub fn closest_candidate(
    expected: Decimal,
    fragments: &[TextFragment],
) -> Option<NumericCandidate<'_>> {
    // min_by keeps the first of several equal minima
    candidates(expected, fragments).min_by(|a, b| a.difference.cmp(&b.difference))
}

/// Match `expected` against the fragments.
///
/// A miss still reports the closest candidate for diagnostics; only when
/// no fragment is numeric at all is nothing found.
pub fn compare_amount(expected: Decimal, fragments: &[TextFragment], tolerance: Decimal) -> Verdict {
    if let Some(hit) = first_within_tolerance(expected, fragments, tolerance) {
        return hit.into_verdict(true);
    }

    closest_candidate(expected, fragments)
        .map(|miss| miss.into_verdict(false))
        .unwrap_or_else(Verdict::no_match)
}

/// Parse `expected` and match it; an unparseable expectation never matches.
pub fn compare_value(expected: &str, fragments: &[TextFragment], tolerance: Decimal) -> Verdict {
    match parse_decimal(expected) {
        Some(value) => compare_amount(value, fragments, tolerance),
        None => Verdict::no_match(),
    }
}
