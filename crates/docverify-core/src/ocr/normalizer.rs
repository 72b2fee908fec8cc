//! Conversion of raw OCR pages into canonical text fragments.

use serde_json::Value;
use tracing::{debug, warn};

use super::raw::{RawOcrResult, RawPage};
use crate::compare::normalize::normalize_text;
use crate::models::fragment::{BoundingBox, TextFragment};

/// Fragments of every page, in page then recognition order.
pub fn normalize_result(result: &RawOcrResult) -> Vec<TextFragment> {
    result.pages.iter().flat_map(normalize_page).collect()
}

/// Fragments of one page, in recognition order.
pub fn normalize_page(page: &RawPage) -> Vec<TextFragment> {
    match page {
        RawPage::Records(lines) | RawPage::Lines(lines) => {
            lines.iter().filter_map(fragment_from_record).collect()
        }
        RawPage::Columns { texts, scores } => texts
            .iter()
            .enumerate()
            .filter_map(|(i, text)| {
                let text = accept_text(text.as_str()?)?;
                Some(TextFragment::new(text, coerce_confidence(scores.get(i))))
            })
            .collect(),
        RawPage::Geometric(lines) => lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let fragment = fragment_from_geometric_line(line);
                if fragment.is_none() {
                    debug!("Skipping geometric line {}: {}", i, line);
                }
                fragment
            })
            .collect(),
        RawPage::Unrecognized => {
            warn!("Unrecognized OCR page shape, no fragments extracted");
            Vec::new()
        }
    }
}

/// Apply the fragment filter: drop empty text, a lone `"0"`, and single
/// characters.
fn accept_text(raw: &str) -> Option<String> {
    let text = normalize_text(raw);
    if text.is_empty() || text == "0" || text.chars().count() <= 1 {
        return None;
    }
    Some(text)
}

/// Numbers and numeric strings become floats; anything else is 0.0.
fn coerce_confidence(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn point(value: &Value) -> Option<(f64, f64)> {
    let coords = value.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    Some((coords[0].as_f64()?, coords[1].as_f64()?))
}

/// Bounding box from either `[x1, y1, x2, y2]` or a list of points.
fn bbox_from_value(value: &Value) -> Option<BoundingBox> {
    let items = value.as_array()?;

    if items.len() == 4 && items.iter().all(Value::is_number) {
        let c: Vec<f64> = items.iter().filter_map(Value::as_f64).collect();
        return Some(BoundingBox::new(c[0], c[1], c[2], c[3]));
    }

    polygon_bbox(value)
}

/// Enclosing rectangle of a polygon with at least four valid points.
fn polygon_bbox(value: &Value) -> Option<BoundingBox> {
    let points: Vec<(f64, f64)> = value.as_array()?.iter().filter_map(point).collect();
    if points.len() < 4 {
        return None;
    }
    BoundingBox::enclosing(points)
}

fn fragment_from_record(record: &Value) -> Option<TextFragment> {
    let text = accept_text(record.get("text")?.as_str()?)?;
    let confidence = coerce_confidence(record.get("confidence"));

    let mut fragment = TextFragment::new(text, confidence);
    if let Some(bbox) = record.get("bbox").and_then(bbox_from_value) {
        fragment = fragment.with_bbox(bbox);
    }
    Some(fragment)
}

/// `[polygon, [text, score]]`, or `[polygon, "text"]` without a score.
fn fragment_from_geometric_line(line: &Value) -> Option<TextFragment> {
    let parts = line.as_array()?;
    if parts.len() < 2 {
        return None;
    }

    let (text, confidence) = match &parts[1] {
        Value::Array(info) if info.len() >= 2 => {
            (info[0].as_str()?, coerce_confidence(info.get(1)))
        }
        Value::String(text) => (text.as_str(), 0.0),
        _ => return None,
    };

    let mut fragment = TextFragment::new(accept_text(text)?, confidence);
    if let Some(bbox) = polygon_bbox(&parts[0]) {
        fragment = fragment.with_bbox(bbox);
    }
    Some(fragment)
}
