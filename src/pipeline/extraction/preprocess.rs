//! Image cleanup ahead of OCR.
//!
//! Scanned and photographed reports go through the same chain:
//! EXIF orientation fix, BT.601 grayscale, Otsu binarization, 3x3 median
//! denoise, then lossless PNG for the OCR engine.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, RgbImage};
use tracing::debug;

use super::ExtractionError;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Maximum input image size (in bytes) before rejecting.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Smallest valid PNG is ~67 bytes.
const MIN_IMAGE_BYTES: usize = 67;

// ═══════════════════════════════════════════════════════════
// Service trait
// ═══════════════════════════════════════════════════════════

/// Image ready for the OCR engine.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub png_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub threshold: u8,
}

pub trait ImagePreprocessor: Send + Sync {
    fn prepare(&self, image_bytes: &[u8]) -> Result<PreparedImage, ExtractionError>;
}

/// Binarize + denoise preprocessor used in production.
pub struct OtsuPreprocessor;

impl ImagePreprocessor for OtsuPreprocessor {
    fn prepare(&self, image_bytes: &[u8]) -> Result<PreparedImage, ExtractionError> {
        prepare_for_ocr(image_bytes)
    }
}

pub fn prepare_for_ocr(image_bytes: &[u8]) -> Result<PreparedImage, ExtractionError> {
    validate_image_bytes(image_bytes)?;

    let img = image::load_from_memory(image_bytes).map_err(|e| {
        ExtractionError::ImageProcessing(format!("Failed to decode image: {e}"))
    })?;
    let img = apply_orientation(img, read_exif_orientation(image_bytes));

    let gray = rgb_to_gray(&img.to_rgb8());
    let threshold = otsu_threshold(&gray);
    let binary = binarize(&gray, threshold);
    let denoised = median_filter_3x3(&binary);

    debug!(
        width = denoised.width(),
        height = denoised.height(),
        threshold,
        "Image prepared for OCR"
    );

    Ok(PreparedImage {
        png_bytes: encode_gray_png(&denoised)?,
        width: denoised.width(),
        height: denoised.height(),
        threshold,
    })
}

// ═══════════════════════════════════════════════════════════
// Orientation
// ═══════════════════════════════════════════════════════════

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// ═══════════════════════════════════════════════════════════
// Pixel helpers
// ═══════════════════════════════════════════════════════════

/// ITU-R BT.601 luminance.
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = (rgb.width(), rgb.height());
    let mut gray = GrayImage::new(w, h);
    for (x, y, p) in rgb.enumerate_pixels() {
        let luma = 0.299 * p.0[0] as f32 + 0.587 * p.0[1] as f32 + 0.114 * p.0[2] as f32;
        gray.put_pixel(x, y, Luma([luma as u8]));
    }
    gray
}

/// Global threshold maximizing between-class variance of the histogram.
pub fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in img.pixels() {
        histogram[p.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0f64;
    let mut best_variance = 0.0f64;
    let mut best_threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }
        background_sum += level as f64 * count as f64;

        let mean_bg = background_sum / background_weight as f64;
        let mean_fg = (weighted_sum - background_sum) / foreground_weight as f64;
        let between =
            background_weight as f64 * foreground_weight as f64 * (mean_bg - mean_fg).powi(2);

        if between > best_variance {
            best_variance = between;
            best_threshold = level as u8;
        }
    }
    best_threshold
}

/// Pixels above `threshold` become white, the rest black.
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] > threshold { 255 } else { 0 };
    }
    out
}

/// 3x3 median with clamped edges. Removes salt-and-pepper specks left by
/// binarization without thinning strokes.
pub fn median_filter_3x3(img: &GrayImage) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    let mut window = [0u8; 9];
    for y in 0..h {
        for x in 0..w {
            let mut i = 0;
            for dy in [-1i64, 0, 1] {
                for dx in [-1i64, 0, 1] {
                    let nx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                    let ny = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                    window[i] = img.get_pixel(nx, ny).0[0];
                    i += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, Luma([window[4]]));
        }
    }
    out
}

/// Validate image bytes before decoding.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

pub fn encode_gray_png(img: &GrayImage) -> Result<Vec<u8>, ExtractionError> {
    let dynamic = DynamicImage::ImageLuma8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ExtractionError> {
    let dynamic = DynamicImage::ImageRgb8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

// ═══════════════════════════════════════════════════════════
// Mock
// ═══════════════════════════════════════════════════════════

/// Skips decoding entirely; hands the input through untouched.
pub struct MockImagePreprocessor {
    fail: bool,
}

impl MockImagePreprocessor {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagePreprocessor for MockImagePreprocessor {
    fn prepare(&self, image_bytes: &[u8]) -> Result<PreparedImage, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::ImageProcessing(
                "Mock preprocessing failure".into(),
            ));
        }
        Ok(PreparedImage {
            png_bytes: image_bytes.to_vec(),
            width: 0,
            height: 0,
            threshold: 0,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page_with_text_block() -> RgbImage {
        RgbImage::from_fn(120, 80, |x, y| {
            if (20..100).contains(&x) && (20..60).contains(&y) {
                Rgb([20, 20, 20])
            } else {
                let paper = 220 + ((x * 7 + y * 13) % 30) as u8;
                Rgb([paper, paper, paper])
            }
        })
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let gray = rgb_to_gray(&page_with_text_block());
        let t = otsu_threshold(&gray);
        assert!(t < 215, "threshold {t}");
    }

    #[test]
    fn binarize_produces_two_levels() {
        let gray = rgb_to_gray(&page_with_text_block());
        let binary = binarize(&gray, otsu_threshold(&gray));
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(binary.get_pixel(50, 40).0[0], 0);
        assert_eq!(binary.get_pixel(2, 2).0[0], 255);
    }

    #[test]
    fn median_removes_isolated_speck() {
        let mut img = GrayImage::from_pixel(5, 5, Luma([255]));
        img.put_pixel(2, 2, Luma([0]));
        let out = median_filter_3x3(&img);
        assert_eq!(out.get_pixel(2, 2).0[0], 255);
    }

    #[test]
    fn prepare_round_trips_to_png() {
        let png = encode_png(&page_with_text_block()).unwrap();
        let prepared = prepare_for_ocr(&png).unwrap();
        assert_eq!((prepared.width, prepared.height), (120, 80));
        let decoded = image::load_from_memory(&prepared.png_bytes).unwrap();
        assert_eq!(decoded.to_luma8().get_pixel(50, 40).0[0], 0);
        assert_eq!(decoded.to_luma8().get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn rejects_tiny_input() {
        assert!(matches!(
            prepare_for_ocr(b"not an image"),
            Err(ExtractionError::ImageProcessing(_))
        ));
    }

    #[test]
    fn rejects_undecodable_input() {
        let garbage = vec![7u8; 200];
        assert!(prepare_for_ocr(&garbage).is_err());
    }

    #[test]
    fn no_exif_means_upright() {
        let png = encode_png(&page_with_text_block()).unwrap();
        assert_eq!(read_exif_orientation(&png), 1);
    }

    #[test]
    fn mock_passes_bytes_through() {
        let prepared = MockImagePreprocessor::new().prepare(b"abc").unwrap();
        assert_eq!(prepared.png_bytes, b"abc");
        assert!(MockImagePreprocessor::failing().prepare(b"abc").is_err());
    }
}
