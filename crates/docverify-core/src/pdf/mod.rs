//! PDF rasterization collaborator.

mod extractor;

pub use extractor::EmbeddedImageRasterizer;

use std::path::Path;

use image::DynamicImage;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Turns a PDF into one image per page, in page order.
pub trait PageRasterizer {
    /// Rasterize every page of the PDF at `path`.
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for Box<R> {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        (**self).rasterize(path, dpi)
    }
}
