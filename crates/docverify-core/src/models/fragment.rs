//! Canonical text fragments produced by the result normalizer.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Smallest rectangle enclosing all points, or `None` for an empty set.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let init = Self::new(x, y, x, y);

        Some(iter.fold(init, |b, (x, y)| Self {
            x1: b.x1.min(x),
            y1: b.y1.min(y),
            x2: b.x2.max(x),
            y2: b.y2.max(y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One unit of recognized text.
///
/// Fragments keep the recognition order of the OCR engine; comparators rely
/// on that order for deterministic tie-breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text, whitespace-normalized.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f64,

    /// Location on the page, when the engine reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enclosing_quadrilateral() {
        let points = [(10.0, 5.0), (50.0, 4.0), (52.0, 20.0), (9.0, 21.0)];
        let bbox = BoundingBox::enclosing(points).unwrap();

        assert_eq!(bbox, BoundingBox::new(9.0, 4.0, 52.0, 21.0));
        assert_eq!(bbox.width(), 43.0);
        assert_eq!(bbox.height(), 17.0);
    }

    #[test]
    fn test_enclosing_empty() {
        assert!(BoundingBox::enclosing(Vec::<(f64, f64)>::new()).is_none());
    }
}
