//! Page rasterization for scanned PDFs using lopdf.
//!
//! Scanned documents carry one raster image per page. Each page's largest
//! image XObject is decoded and used as the page image; pages with only
//! vector content are skipped.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PageRasterizer, Result};
use crate::error::PdfError;

/// Rasterizer that extracts each page's embedded scan.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedImageRasterizer {
    /// Maximum pages to rasterize (0 = unlimited).
    max_pages: usize,
}

impl EmbeddedImageRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of pages rasterized per document.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Rasterize a PDF held in memory.
    pub fn rasterize_bytes(&self, data: &[u8]) -> Result<Vec<DynamicImage>> {
        let doc = load_document(data)?;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let limit = match self.max_pages {
            0 => pages.len(),
            n => n.min(pages.len()),
        };

        let mut images = Vec::with_capacity(limit);
        for (&number, &page_id) in pages.iter().take(limit) {
            match page_image(&doc, page_id) {
                Some(image) => images.push(image),
                None => warn!("Page {} has no decodable raster image, skipping", number),
            }
        }

        if images.is_empty() {
            return Err(PdfError::NoRasterImages);
        }

        Ok(images)
    }
}

impl PageRasterizer for EmbeddedImageRasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;

        // Embedded scans are used at their native resolution.
        debug!("Rasterizing {} (requested {} dpi)", path.display(), dpi);
        self.rasterize_bytes(&data)
    }
}

fn load_document(data: &[u8]) -> Result<Document> {
    let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

    if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");
    }

    Ok(doc)
}

/// Largest decodable image on a page.
fn page_image(doc: &Document, page_id: ObjectId) -> Option<DynamicImage> {
    let resources = page_resources(doc, page_id)?;
    let (_, xobjects) = doc.dereference(resources.get(b"XObject").ok()?).ok()?;
    let Object::Dictionary(xobjects) = xobjects else {
        return None;
    };

    xobjects
        .iter()
        .filter_map(|(_, reference)| doc.dereference(reference).ok())
        .filter_map(|(_, object)| decode_image(doc, object))
        .max_by_key(|image| u64::from(image.width()) * u64::from(image.height()))
}

/// Resources dictionary of a page, inherited from the page tree if needed.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(node)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = node.get(b"Resources") {
        if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
            return Some(dict.clone());
        }
    }

    match node.get(b"Parent") {
        Ok(Object::Reference(parent)) => page_resources(doc, *parent),
        _ => None,
    }
}

fn decode_image(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Image XObject {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) => filters.last().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter");
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    raw_to_image(data, width, height, color_space)
}

/// Build an image from uncompressed 8-bit samples.
fn raw_to_image(
    mut data: Vec<u8>,
    width: u32,
    height: u32,
    color_space: &[u8],
) -> Option<DynamicImage> {
    // Dimensions come from the file and may be arbitrarily large.
    let pixels = (width as usize).checked_mul(height as usize)?;
    let rgb_len = pixels.checked_mul(3)?;

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= rgb_len => {
            data.truncate(rgb_len);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Cannot decode {} bytes as {}x{} {}",
                data.len(),
                width,
                height,
                String::from_utf8_lossy(color_space)
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_rgb() {
        let data = vec![255u8; 2 * 3 * 3 + 5];
        let image = raw_to_image(data, 2, 3, b"DeviceRGB").unwrap();

        assert_eq!((image.width(), image.height()), (2, 3));
    }

    #[test]
    fn test_raw_gray() {
        let image = raw_to_image(vec![0u8; 16], 4, 4, b"DeviceGray").unwrap();
        assert_eq!((image.width(), image.height()), (4, 4));
    }

    #[test]
    fn test_raw_too_short() {
        assert!(raw_to_image(vec![0u8; 5], 4, 4, b"DeviceRGB").is_none());
        assert!(raw_to_image(vec![0u8; 64], 4, 4, b"DeviceCMYK").is_none());
    }

    #[test]
    fn test_oversized_dimensions() {
        assert!(raw_to_image(vec![0u8; 16], u32::MAX, u32::MAX, b"DeviceRGB").is_none());
        assert!(raw_to_image(vec![0u8; 16], u32::MAX, u32::MAX, b"DeviceGray").is_none());
    }

    #[test]
    fn test_invalid_pdf() {
        let result = EmbeddedImageRasterizer::new().rasterize_bytes(b"not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result =
            EmbeddedImageRasterizer::new().rasterize(Path::new("/nonexistent/doc.pdf"), 300);
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }
}
