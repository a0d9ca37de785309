use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Tesseract page segmentation modes used for lab reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSegMode {
    /// `--psm 4`: single column of text of variable sizes.
    SingleColumn,
    /// `--psm 6`: single uniform block of text.
    UniformBlock,
}

impl PageSegMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::SingleColumn => "4",
            Self::UniformBlock => "6",
        }
    }
}

/// Raw OCR result from the engine
#[derive(Debug, Clone)]
pub struct OcrPageResult {
    pub text: String,
    pub mode: PageSegMode,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine: Send + Sync {
    fn ocr_image(
        &self,
        png_bytes: &[u8],
        mode: PageSegMode,
    ) -> Result<OcrPageResult, ExtractionError>;
}

/// Renders a whole PDF to one PNG per page, in page order.
pub trait PdfPageRenderer: Send + Sync {
    fn render_pages(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError>;
}

/// Text pulled out of an uploaded report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportText {
    pub kind: FileKind,
    pub page_count: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Png,
    Jpeg,
    Pdf,
}

impl FileKind {
    /// Case-insensitive extension check against `png|jpg|jpeg|pdf`.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| ExtractionError::UnsupportedFormat(filename.to_string()))?;
        if !crate::config::ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ExtractionError::UnsupportedFormat(filename.to_string()));
        }
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExtractionError::UnsupportedFormat(filename.to_string())),
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}
