//! Error types for the docverify-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the docverify library.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Input layout or metadata error.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Field comparison error.
    #[error("comparison error: {0}")]
    Comparison(#[from] ComparisonError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF rasterization.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// No page carried a decodable raster image.
    #[error("no raster images found in PDF")]
    NoRasterImages,
}

/// Errors raised by the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Recognition call failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to the input layout and metadata files.
#[derive(Error, Debug)]
pub enum InputError {
    /// The input root is missing or not a directory.
    #[error("input root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The discovery pattern could not be built.
    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A metadata file could not be read or parsed.
    #[error("metadata {}: {reason}", .path.display())]
    Metadata { path: PathBuf, reason: String },
}

/// Errors raised while comparing one expected field.
#[derive(Error, Debug)]
pub enum ComparisonError {
    /// A numeric expected value does not fit a decimal.
    #[error("expected value {0} cannot be represented as a decimal")]
    UnrepresentableNumber(String),
}

/// Result type for the docverify library.
pub type Result<T> = std::result::Result<T, VerifyError>;
