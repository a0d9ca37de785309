use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

use super::types::{OcrEngine, OcrPageResult, PageSegMode};
use super::ExtractionError;

/// Tesseract driven through its command-line binary.
///
/// The image is written to a scratch file and recognised with
/// `tesseract <image> stdout --psm N`; stdout is the page text.
pub struct TesseractCli {
    binary: PathBuf,
    lang: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            lang: "eng".to_string(),
        }
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+fra")
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }

    /// `true` when `tesseract --version` runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractCli {
    fn ocr_image(
        &self,
        png_bytes: &[u8],
        mode: PageSegMode,
    ) -> Result<OcrPageResult, ExtractionError> {
        let scratch = tempfile::Builder::new()
            .prefix("labscope-ocr-")
            .suffix(".png")
            .tempfile()?;
        std::fs::write(scratch.path(), png_bytes)?;

        let out = Command::new(&self.binary)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg(mode.as_arg())
            .output()
            .map_err(|e| {
                ExtractionError::OcrInit(format!("{}: {e}", self.binary.display()))
            })?;

        if !out.status.success() {
            let err = String::from_utf8_lossy(&out.stderr);
            return Err(ExtractionError::OcrProcessing(err.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&out.stdout).into_owned();
        tracing::debug!(psm = mode.as_arg(), chars = text.len(), "Tesseract finished");
        Ok(OcrPageResult { text, mode })
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Returns canned text. Column mode can be given different text to exercise
/// the sparse-text retry.
pub struct MockOcrEngine {
    block_text: String,
    column_text: String,
    calls: Mutex<Vec<PageSegMode>>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            block_text: text.to_string(),
            column_text: text.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_column_text(mut self, text: &str) -> Self {
        self.column_text = text.to_string();
        self
    }

    /// Modes requested so far, in call order.
    pub fn calls(&self) -> Vec<PageSegMode> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(
        &self,
        _png_bytes: &[u8],
        mode: PageSegMode,
    ) -> Result<OcrPageResult, ExtractionError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(mode);
        }
        let text = match mode {
            PageSegMode::UniformBlock => self.block_text.clone(),
            PageSegMode::SingleColumn => self.column_text.clone(),
        };
        Ok(OcrPageResult { text, mode })
    }
}

/// Always fails, for error-path tests.
pub struct FailingOcrEngine;

impl OcrEngine for FailingOcrEngine {
    fn ocr_image(
        &self,
        _png_bytes: &[u8],
        _mode: PageSegMode,
    ) -> Result<OcrPageResult, ExtractionError> {
        Err(ExtractionError::OcrProcessing("mock OCR failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_text_per_mode() {
        let engine = MockOcrEngine::new("short").with_column_text("Hemoglobin 13.1");
        let block = engine.ocr_image(b"png", PageSegMode::UniformBlock).unwrap();
        let column = engine.ocr_image(b"png", PageSegMode::SingleColumn).unwrap();
        assert_eq!(block.text, "short");
        assert_eq!(column.text, "Hemoglobin 13.1");
        assert_eq!(
            engine.calls(),
            vec![PageSegMode::UniformBlock, PageSegMode::SingleColumn]
        );
    }

    #[test]
    fn missing_binary_is_init_error() {
        let engine = TesseractCli::new("/nonexistent/tesseract-bin");
        assert!(!engine.is_available());
        let err = engine
            .ocr_image(b"png", PageSegMode::UniformBlock)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::OcrInit(_)));
    }
}
