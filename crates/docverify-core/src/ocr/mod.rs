//! OCR collaborator interface and result normalization.

mod normalizer;
#[cfg(feature = "native")]
mod pure_engine;
mod raw;

pub use normalizer::{normalize_page, normalize_result};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;
pub use raw::{RawOcrResult, RawPage};

use image::DynamicImage;
use tracing::{debug, error};

use crate::error::OcrError;
use crate::models::fragment::TextFragment;

/// Long-lived handle to a text recognition model.
///
/// Implementations are created once per process and injected into the
/// pipeline; `recognize` must not mutate shared state.
pub trait OcrEngine {
    /// Engine identifier used in logs.
    fn name(&self) -> &'static str;

    /// Recognize text on one page image, returning engine-native output.
    fn recognize(&self, image: &DynamicImage) -> Result<RawOcrResult, OcrError>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RawOcrResult, OcrError> {
        (**self).recognize(image)
    }
}

/// Recognize one page and normalize it into fragments.
///
/// OCR output is best-effort: an engine failure is logged and yields no
/// fragments for the page.
pub fn recognize_fragments<E: OcrEngine + ?Sized>(
    engine: &E,
    image: &DynamicImage,
) -> Vec<TextFragment> {
    match engine.recognize(image) {
        Ok(raw) => {
            let fragments = normalize_result(&raw);
            debug!(
                "{} produced {} fragments from {} page(s)",
                engine.name(),
                fragments.len(),
                raw.pages.len()
            );
            fragments
        }
        Err(e) => {
            error!("{} failed: {}", engine.name(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct FixedEngine(serde_json::Value);

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<RawOcrResult, OcrError> {
            Ok(RawOcrResult::from_json(&self.0))
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<RawOcrResult, OcrError> {
            Err(OcrError::Recognition("model crashed".to_string()))
        }
    }

    #[test]
    fn test_recognize_fragments() {
        let engine = FixedEngine(json!([{"text": "150.00", "confidence": 0.95}]));
        let image = DynamicImage::new_rgb8(4, 4);

        let fragments = recognize_fragments(&engine, &image);

        assert_eq!(fragments, vec![TextFragment::new("150.00", 0.95)]);
    }

    #[test]
    fn test_engine_failure_yields_no_fragments() {
        let image = DynamicImage::new_rgb8(4, 4);
        let engine: Box<dyn OcrEngine> = Box::new(FailingEngine);

        assert!(recognize_fragments(&engine, &image).is_empty());
    }
}
