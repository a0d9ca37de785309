use super::pdfium::DEFAULT_RENDER_DPI;
use super::preprocess::ImagePreprocessor;
use super::types::{FileKind, OcrEngine, PageSegMode, PdfPageRenderer, ReportText};
use super::upload::UploadedReport;
use super::ExtractionError;

/// Below this many trimmed characters the block-mode result is treated as a
/// miss and the page is read again in single-column mode.
pub const SPARSE_TEXT_CHARS: usize = 50;

/// Main extraction orchestrator trait
pub trait TextExtractor: Send + Sync {
    fn extract(&self, report: &UploadedReport) -> Result<ReportText, ExtractionError>;
}

/// OCR front-end for uploaded reports.
/// Uses trait objects for OCR, preprocessing and PDF rendering, enabling
/// dependency injection.
pub struct ReportTextExtractor {
    ocr_engine: Box<dyn OcrEngine>,
    preprocessor: Box<dyn ImagePreprocessor>,
    pdf_renderer: Option<Box<dyn PdfPageRenderer>>,
}

impl ReportTextExtractor {
    pub fn new(ocr_engine: Box<dyn OcrEngine>, preprocessor: Box<dyn ImagePreprocessor>) -> Self {
        Self {
            ocr_engine,
            preprocessor,
            pdf_renderer: None,
        }
    }

    pub fn with_pdf_renderer(mut self, renderer: Box<dyn PdfPageRenderer>) -> Self {
        self.pdf_renderer = Some(renderer);
        self
    }

    /// Preprocess then OCR one image, retrying sparse results in column mode.
    pub fn read_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let prepared = self.preprocessor.prepare(image_bytes)?;

        let first = self
            .ocr_engine
            .ocr_image(&prepared.png_bytes, PageSegMode::UniformBlock)?;
        if first.text.trim().chars().count() >= SPARSE_TEXT_CHARS {
            return Ok(first.text);
        }

        tracing::debug!(
            chars = first.text.trim().len(),
            "Sparse OCR result, retrying in single-column mode"
        );
        let second = self
            .ocr_engine
            .ocr_image(&prepared.png_bytes, PageSegMode::SingleColumn)?;
        Ok(second.text)
    }

    fn read_pdf(&self, pdf_bytes: &[u8]) -> Result<(usize, String), ExtractionError> {
        let renderer = self.pdf_renderer.as_ref().ok_or_else(|| {
            ExtractionError::PdfRendering {
                page: 0,
                reason: "No PDF renderer configured".into(),
            }
        })?;

        let pages = renderer.render_pages(pdf_bytes, DEFAULT_RENDER_DPI)?;
        let mut text = String::new();
        for png in &pages {
            text.push_str(&self.read_image(png)?);
        }
        Ok((pages.len(), text))
    }
}

impl TextExtractor for ReportTextExtractor {
    fn extract(&self, report: &UploadedReport) -> Result<ReportText, ExtractionError> {
        tracing::info!(
            file = %report.filename,
            kind = ?report.kind,
            bytes = report.bytes.len(),
            "Starting text extraction"
        );

        let (page_count, text) = match report.kind {
            FileKind::Pdf => self.read_pdf(&report.bytes)?,
            FileKind::Png | FileKind::Jpeg => (1, self.read_image(&report.bytes)?),
        };

        tracing::info!(pages = page_count, chars = text.len(), "Text extraction complete");
        Ok(ReportText {
            kind: report.kind,
            page_count,
            text,
        })
    }
}
