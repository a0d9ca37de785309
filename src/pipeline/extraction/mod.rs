pub mod types;
pub mod preprocess;
pub mod ocr;
pub mod pdfium;
pub mod upload;
pub mod orchestrator;

pub use types::*;
pub use preprocess::*;
pub use ocr::*;
pub use pdfium::*;
pub use upload::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR engine unavailable: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("PDF is password-protected")]
    PdfEncrypted,

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
}
