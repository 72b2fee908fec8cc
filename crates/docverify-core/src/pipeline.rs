//! End-to-end verification of the documents under an input root.

use std::path::Path;

use image::DynamicImage;
use tracing::{error, info};

use crate::error::Result;
use crate::input::{DocumentKind, DocumentSource, discover_documents, load_expected_fields};
use crate::models::config::VerifyConfig;
use crate::models::fragment::TextFragment;
use crate::models::verification::DocumentVerification;
use crate::ocr::{OcrEngine, recognize_fragments};
use crate::pdf::PageRasterizer;
use crate::verify::DocumentVerifier;

/// Runs OCR, normalization and comparison for each document.
///
/// The OCR engine and rasterizer are injected long-lived handles. Documents
/// are independent: a failure in one is recorded as an error entry and
/// never affects the others.
pub struct VerificationPipeline<E, R> {
    engine: E,
    rasterizer: R,
    verifier: DocumentVerifier,
    render_dpi: u32,
}

impl<E: OcrEngine, R: PageRasterizer> VerificationPipeline<E, R> {
    pub fn new(engine: E, rasterizer: R, verifier: DocumentVerifier) -> Self {
        Self {
            engine,
            rasterizer,
            verifier,
            render_dpi: 300,
        }
    }

    pub fn from_config(engine: E, rasterizer: R, config: &VerifyConfig) -> Result<Self> {
        let verifier = DocumentVerifier::from_config(&config.matching)?;
        Ok(Self::new(engine, rasterizer, verifier).with_render_dpi(config.pdf.render_dpi))
    }

    /// Set the DPI requested from the rasterizer.
    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.render_dpi = dpi;
        self
    }

    pub fn verifier(&self) -> &DocumentVerifier {
        &self.verifier
    }

    /// Page images of a document, in page order.
    pub fn load_pages(&self, source: &DocumentSource) -> Result<Vec<DynamicImage>> {
        match source.kind {
            DocumentKind::Pdf => Ok(self.rasterizer.rasterize(&source.path, self.render_dpi)?),
            DocumentKind::Image => Ok(vec![image::open(&source.path)?]),
        }
    }

    /// Fragments of all pages concatenated in page order.
    pub fn extract_fragments(&self, source: &DocumentSource) -> Result<Vec<TextFragment>> {
        let pages = self.load_pages(source)?;
        Ok(pages
            .iter()
            .flat_map(|page| recognize_fragments(&self.engine, page))
            .collect())
    }

    /// Verify one document, turning a document-level failure into an error entry.
    pub fn process_document(&self, source: &DocumentSource) -> DocumentVerification {
        info!("Processing {}", source.path.display());

        let fields = load_expected_fields(&source.metadata_path());

        match self.extract_fragments(source) {
            Ok(fragments) => {
                info!("{}: {} fragments extracted", source.document_id, fragments.len());
                self.verifier.verify(
                    source.document_id.clone(),
                    source.batch_id.clone(),
                    fragments,
                    &fields,
                )
            }
            Err(e) => {
                error!("Failed to process {}: {}", source.path.display(), e);
                DocumentVerification::failed(
                    source.document_id.clone(),
                    source.batch_id.clone(),
                    e.to_string(),
                )
            }
        }
    }

    /// Verify documents sequentially, keeping input order.
    pub fn verify_sources(&self, sources: &[DocumentSource]) -> Vec<DocumentVerification> {
        sources.iter().map(|s| self.process_document(s)).collect()
    }

    /// Discover and verify every document under `root`.
    pub fn run(&self, root: &Path) -> Result<Vec<DocumentVerification>> {
        let sources = discover_documents(root)?;
        info!("Found {} documents under {}", sources.len(), root.display());
        Ok(self.verify_sources(&sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use crate::ocr::RawOcrResult;
    use crate::verify::RunReport;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::fs;

    /// Engine returning a scripted result chosen by image width.
    struct ScriptedEngine {
        by_width: Vec<(u32, Value)>,
    }

    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn recognize(&self, image: &DynamicImage) -> std::result::Result<RawOcrResult, OcrError> {
            self.by_width
                .iter()
                .find(|(w, _)| *w == image.width())
                .map(|(_, v)| RawOcrResult::from_json(v))
                .ok_or_else(|| OcrError::Recognition("no script for image".to_string()))
        }
    }

    /// Rasterizer yielding fixed-width blank pages.
    struct BlankPages(Vec<u32>);

    impl PageRasterizer for BlankPages {
        fn rasterize(&self, _path: &Path, _dpi: u32) -> crate::pdf::Result<Vec<DynamicImage>> {
            if self.0.is_empty() {
                return Err(PdfError::NoRasterImages);
            }
            Ok(self.0.iter().map(|&w| DynamicImage::new_rgb8(w, 4)).collect())
        }
    }

    fn engine() -> ScriptedEngine {
        ScriptedEngine {
            by_width: vec![
                (10, json!([{"data": [{"text": "Maria Silva", "confidence": 0.9}]}])),
                (11, json!({"rec_texts": ["R$ 150,00"], "rec_scores": [0.8]})),
                (12, json!([[[[[0, 0], [9, 0], [9, 3], [0, 3]], ["150.00", 0.95]]]])),
            ],
        }
    }

    fn write_png(path: &Path, width: u32) {
        DynamicImage::new_rgb8(width, 4).save(path).unwrap();
    }

    #[test]
    fn test_pdf_pages_concatenated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("nota.pdf");
        fs::write(&pdf, b"%PDF").unwrap();

        let pipeline = VerificationPipeline::new(engine(), BlankPages(vec![10, 11]), DocumentVerifier::default());
        let source = DocumentSource::from_path(&pdf, None).unwrap();

        let fragments = pipeline.extract_fragments(&source).unwrap();
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();

        assert_eq!(texts, vec!["Maria Silva", "R$ 150,00"]);
    }

    #[test]
    fn test_run_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write_png(&root.join("a.png"), 12);
        fs::write(root.join("a.json"), r#"{"valor": "150,00", "nome": ""}"#).unwrap();

        fs::write(root.join("broken.png"), b"not an image").unwrap();
        fs::write(root.join("broken.json"), r#"{"valor": "1,00"}"#).unwrap();

        fs::create_dir(root.join("edital-7")).unwrap();
        write_png(&root.join("edital-7/b.png"), 10);
        fs::write(root.join("edital-7/b.json"), r#"{"nome": "Silva Maria"}"#).unwrap();
        write_png(&root.join("edital-7/c.png"), 99);
        fs::write(root.join("edital-7/c.json"), r#"{"nome": "Maria Silva"}"#).unwrap();
        fs::write(root.join("edital-7/d.pdf"), b"%PDF").unwrap();

        let pipeline = VerificationPipeline::new(engine(), BlankPages(Vec::new()), DocumentVerifier::default());
        let docs = pipeline.run(root).unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a.png", "broken.png", "b.png", "c.png", "d.pdf"]);

        // a.png: one field, "nome" excluded
        assert_eq!(docs[0].total_count(), 1);
        assert!(docs[0].results[0].matched);
        assert_eq!(docs[0].results[0].found_text.as_deref(), Some("150.00"));

        assert!(docs[1].is_failed());
        assert!(docs[2].results[0].matched);

        // engine failure on c.png is absorbed: no fragments, field unmatched
        assert!(!docs[3].is_failed());
        assert!(docs[3].fragments.is_empty());
        assert_eq!(docs[3].found_count(), 0);

        assert!(docs[4].is_failed());

        let report = RunReport::build(&docs, false);
        assert_eq!(report.overall.total_documents, 5);
        assert_eq!(report.overall.failed_documents, 2);
        assert_eq!(report.overall.total_fields, 3);
        assert_eq!(report.overall.fields_found, 2);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let pipeline = VerificationPipeline::new(engine(), BlankPages(vec![10]), DocumentVerifier::default());
        assert!(pipeline.run(Path::new("/nonexistent/root")).is_err());
    }
}
