//! Engine-native OCR output shapes.
//!
//! OCR engines report results in several historical layouts. Each page is
//! classified once into a [`RawPage`] variant; anything unrecognized becomes
//! [`RawPage::Unrecognized`] and later yields no fragments.

use serde_json::{Map, Value};
use tracing::trace;

/// One page of engine-native output.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPage {
    /// Page record wrapping line records: `{"data": [{"text", "confidence", "bbox"}, ...]}`.
    Records(Vec<Value>),

    /// Line records without a wrapping page record: `[{"text", "confidence"}, ...]`.
    Lines(Vec<Value>),

    /// Parallel arrays: `{"rec_texts": [...], "rec_scores": [...]}`. No geometry.
    Columns { texts: Vec<Value>, scores: Vec<Value> },

    /// Legacy geometric lines: `[[[x, y] x4], [text, score]]`.
    Geometric(Vec<Value>),

    /// Shape not understood.
    Unrecognized,
}

impl RawPage {
    /// Classify a single page value.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Object(obj) => classify_object(obj),
            Value::Array(items) if items.iter().any(is_geometric_line) => {
                Self::Geometric(items.clone())
            }
            Value::Array(items) if items.iter().all(|v| v.is_object() || v.is_null()) => {
                Self::Lines(items.clone())
            }
            Value::Null => Self::Lines(Vec::new()),
            _ => Self::Unrecognized,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Records(_) => "records",
            Self::Lines(_) => "lines",
            Self::Columns { .. } => "columns",
            Self::Geometric(_) => "geometric",
            Self::Unrecognized => "unrecognized",
        }
    }
}

fn classify_object(obj: &Map<String, Value>) -> RawPage {
    if let Some(Value::Array(lines)) = obj.get("data") {
        return RawPage::Records(lines.clone());
    }

    if let Some(Value::Array(texts)) = obj.get("rec_texts") {
        let scores = match obj.get("rec_scores") {
            Some(Value::Array(scores)) => scores.clone(),
            _ => Vec::new(),
        };
        return RawPage::Columns {
            texts: texts.clone(),
            scores,
        };
    }

    RawPage::Unrecognized
}

/// A line record is an object carrying `text`.
fn is_line_record(value: &Value) -> bool {
    value.get("text").is_some()
}

/// A geometric line starts with a polygon: an array of coordinate pairs.
fn is_geometric_line(value: &Value) -> bool {
    let Some(parts) = value.as_array() else {
        return false;
    };

    parts.len() >= 2 && is_polygon(&parts[0])
}

fn is_polygon(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|points| !points.is_empty() && points.iter().all(is_point))
}

fn is_point(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|c| c.len() >= 2 && c[0].is_number() && c[1].is_number())
}

/// Full engine-native result for one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawOcrResult {
    pub pages: Vec<RawPage>,
}

impl RawOcrResult {
    pub fn new(pages: Vec<RawPage>) -> Self {
        Self { pages }
    }

    pub fn single(page: RawPage) -> Self {
        Self { pages: vec![page] }
    }

    /// Inspect an engine's JSON result and dispatch each page to its shape.
    ///
    /// A top-level array is either one page of lines (line records or
    /// geometric lines directly) or a sequence of pages.
    pub fn from_json(value: &Value) -> Self {
        let pages = match value {
            Value::Array(items) if items.iter().any(is_line_record) => {
                vec![RawPage::Lines(items.clone())]
            }
            Value::Array(items) if items.iter().any(is_geometric_line) => {
                vec![RawPage::Geometric(items.clone())]
            }
            Value::Array(items) => items.iter().map(RawPage::classify).collect(),
            other => vec![RawPage::classify(other)],
        };

        trace!(
            "Classified OCR result pages: {:?}",
            pages.iter().map(RawPage::name).collect::<Vec<_>>()
        );

        Self { pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn names(result: &RawOcrResult) -> Vec<&'static str> {
        result.pages.iter().map(RawPage::name).collect()
    }

    #[test]
    fn test_page_records() {
        let raw = json!([
            {"data": [{"text": "Total", "confidence": 0.9}]},
            {"data": []}
        ]);
        assert_eq!(names(&RawOcrResult::from_json(&raw)), vec!["records", "records"]);
    }

    #[test]
    fn test_direct_lines() {
        let raw = json!([{"text": "Total", "confidence": 0.9}, {"text": "10,00"}]);
        assert_eq!(names(&RawOcrResult::from_json(&raw)), vec!["lines"]);

        let nested = json!([[{"text": "Total", "confidence": 0.9}]]);
        assert_eq!(names(&RawOcrResult::from_json(&nested)), vec!["lines"]);
    }

    #[test]
    fn test_columns() {
        let raw = json!([{"rec_texts": ["a", "b"], "rec_scores": [0.5]}]);
        let result = RawOcrResult::from_json(&raw);

        assert_eq!(
            result.pages,
            vec![RawPage::Columns {
                texts: vec![json!("a"), json!("b")],
                scores: vec![json!(0.5)],
            }]
        );
    }

    #[test]
    fn test_geometric() {
        let line = json!([[[0, 0], [10, 0], [10, 5], [0, 5]], ["Total", 0.98]]);

        let wrapped = json!([[line.clone()]]);
        assert_eq!(names(&RawOcrResult::from_json(&wrapped)), vec!["geometric"]);

        let direct = json!([line]);
        assert_eq!(names(&RawOcrResult::from_json(&direct)), vec!["geometric"]);
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(names(&RawOcrResult::from_json(&json!("text"))), vec!["unrecognized"]);
        assert_eq!(
            names(&RawOcrResult::from_json(&json!([{"boxes": []}, 42]))),
            vec!["unrecognized", "unrecognized"]
        );
    }
}
