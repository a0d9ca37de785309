//! Scanned PDF reports rendered page by page for OCR.
//!
//! The upstream `Pdfium` handle is `!Send`, so it is bound per upload and
//! dropped with the document.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;

use super::types::PdfPageRenderer;
use super::ExtractionError;

/// Rendering DPI for OCR input.
pub const DEFAULT_RENDER_DPI: u32 = 200;

/// Longest side of a rendered page. Poster-sized pages are scaled down.
const MAX_PAGE_PX: i32 = 4096;

const LIBRARY_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// PDFium page rasteriser, bound to the library found via
/// `PDFIUM_DYNAMIC_LIB_PATH` or the system search path.
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    /// Fails when no PDFium library can be bound.
    pub fn new() -> Result<Self, ExtractionError> {
        bind()?;
        Ok(Self)
    }
}

fn bind() -> Result<Pdfium, ExtractionError> {
    let bindings = match std::env::var(LIBRARY_ENV) {
        Ok(path) => Pdfium::bind_to_library(&path),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| {
        ExtractionError::OcrInit(format!("PDFium not available (set {LIBRARY_ENV}): {e}"))
    })?;
    Ok(Pdfium::new(bindings))
}

/// PDF points are 1/72 inch.
fn page_scale(dpi: u32) -> f32 {
    dpi as f32 / 72.0
}

fn open_error(e: PdfiumError) -> ExtractionError {
    match e {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            ExtractionError::PdfEncrypted
        }
        other => ExtractionError::PdfRendering {
            page: 0,
            reason: format!("cannot open PDF: {other}"),
        },
    }
}

impl PdfPageRenderer for PdfiumRenderer {
    fn render_pages(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let pdfium = bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(open_error)?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(page_scale(dpi))
            .set_maximum_width(MAX_PAGE_PX)
            .set_maximum_height(MAX_PAGE_PX);

        let mut pages = Vec::new();
        for (page, pdf_page) in document.pages().iter().enumerate() {
            let rendering_failed = |reason: String| ExtractionError::PdfRendering { page, reason };
            let bitmap = pdf_page
                .render_with_config(&config)
                .map_err(|e| rendering_failed(e.to_string()))?;

            let mut png = Cursor::new(Vec::new());
            bitmap
                .as_image()
                .write_to(&mut png, ImageOutputFormat::Png)
                .map_err(|e| rendering_failed(format!("PNG encoding: {e}")))?;
            pages.push(png.into_inner());
        }

        tracing::debug!(pages = pages.len(), dpi, "PDF rendered for OCR");
        Ok(pages)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Returns `pages` small light-grey pages.
pub struct MockPdfPageRenderer {
    pages: usize,
}

impl MockPdfPageRenderer {
    pub fn new(pages: usize) -> Self {
        Self { pages }
    }
}

impl PdfPageRenderer for MockPdfPageRenderer {
    fn render_pages(&self, _pdf_bytes: &[u8], _dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let page = image::RgbImage::from_pixel(64, 64, image::Rgb([230, 230, 230]));
        let png = super::preprocess::encode_png(&page)?;
        Ok(vec![png; self.pages])
    }
}
