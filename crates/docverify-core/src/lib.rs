//! Core library for verifying scanned-document metadata against OCR output.
//!
//! This crate provides:
//! - Normalization of engine-native OCR results into canonical text fragments
//! - Field comparison (numeric tolerance and token-sort fuzzy matching)
//! - Per-document verification and batch/overall success-rate aggregation
//! - Input discovery, metadata loading and PDF page rasterization

pub mod compare;
pub mod error;
pub mod input;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod verify;

pub use compare::FieldComparator;
pub use error::{VerifyError, Result};
pub use input::{DocumentKind, DocumentSource, discover_documents, load_expected_fields};
pub use models::config::VerifyConfig;
pub use models::field::{ExpectedField, ExpectedValue, FieldKind};
pub use models::fragment::{BoundingBox, TextFragment};
pub use models::verification::{DocumentVerification, FieldMatchResult, Verdict};
pub use ocr::{OcrEngine, RawOcrResult, RawPage, normalize_result, recognize_fragments};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{EmbeddedImageRasterizer, PageRasterizer};
pub use pipeline::VerificationPipeline;
pub use verify::{BatchSummary, DocumentVerifier, OverallSummary, RunReport};
