// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate.
//! It converts images to grayscale, optionally downscales them, and
//! searches for QR codes, returning their positions and decoded content.

use super::BarcodeScanner;
use super::types::{BarcodeFormat, DetectedCode, FrameRegion};
use crate::app::acquirer::ImageHandle;
use crate::constants::decoding::DEFAULT_MAX_DIMENSION;
use crate::errors::DecodeError;
use async_trait::async_trait;
use image::GrayImage;
use image::imageops::FilterType;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Large photos are scaled down before detection; phone-camera images are
/// far bigger than a QR code needs.
pub struct QrDetector {
    /// Maximum dimension for processing (0 keeps the original size)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

#[async_trait]
impl BarcodeScanner for QrDetector {
    async fn scan(
        &self,
        image: ImageHandle,
        formats: &[BarcodeFormat],
    ) -> Result<Vec<DetectedCode>, DecodeError> {
        if !formats.contains(&BarcodeFormat::QrCode) {
            return Ok(Vec::new());
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::new("image has no pixels"));
        }

        let max_dim = self.max_dimension;

        // Run detection in a blocking task to avoid blocking the async runtime
        tokio::task::spawn_blocking(move || detect_sync(&image, max_dim))
            .await
            .map_err(|e| {
                warn!(error = %e, "QR detection task panicked");
                DecodeError::new(format!("detection task failed: {}", e))
            })
    }
}

/// Synchronous QR detection (runs in blocking task)
fn detect_sync(image: &ImageHandle, max_dimension: u32) -> Vec<DetectedCode> {
    let start = std::time::Instant::now();

    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let (gray, scale) = downscale(gray, max_dimension);
    let (proc_width, proc_height) = gray.dimensions();

    let conversion_time = start.elapsed();
    trace!(
        proc_width,
        proc_height,
        scale,
        conversion_ms = conversion_time.as_millis(),
        "Prepared grayscale image for processing"
    );

    let raw = gray.as_raw();
    let stride = proc_width as usize;
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        proc_width as usize,
        proc_height as usize,
        |x, y| raw[y * stride + x],
    );
    let grids = prepared.detect_grids();

    trace!(
        count = grids.len(),
        detection_ms = (start.elapsed() - conversion_time).as_millis(),
        "QR grid detection complete"
    );

    let mut detections = Vec::with_capacity(grids.len());
    for grid in grids {
        let content = match grid.decode() {
            Ok((_meta, content)) => content,
            Err(e) => {
                debug!(error = ?e, "Failed to decode QR code");
                continue;
            }
        };

        // Scale corners back to the rotated source image
        let corners: Vec<(f32, f32)> = grid
            .bounds
            .iter()
            .map(|p| (p.x as f32 * scale, p.y as f32 * scale))
            .collect();

        let mut code = DetectedCode::new(content, BarcodeFormat::QrCode);
        if let Some(region) = FrameRegion::bounding(&corners, width, height) {
            debug!(
                content = %code.raw_value,
                x = region.x,
                y = region.y,
                width = region.width,
                height = region.height,
                "Detected QR code"
            );
            code = code.with_bounds(region);
        }
        detections.push(code);
    }

    if !detections.is_empty() {
        debug!(
            count = detections.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found codes"
        );
    }

    detections
}

/// Shrink so the longer side fits `max_dimension`; returns the scale back to the input
fn downscale(gray: GrayImage, max_dimension: u32) -> (GrayImage, f32) {
    let (width, height) = gray.dimensions();
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return (gray, 1.0);
    }

    let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
    let new_width = ((width as f32 / scale) as u32).max(1);
    let new_height = ((height as f32 / scale) as u32).max(1);

    let resized = image::imageops::resize(&gray, new_width, new_height, FilterType::Triangle);
    (resized, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Luma};

    #[test]
    fn test_downscale_keeps_small_images() {
        let gray: GrayImage = ImageBuffer::from_pixel(100, 50, Luma([128u8]));
        let (out, scale) = downscale(gray, 640);
        assert_eq!(out.dimensions(), (100, 50));
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_downscale_bounds_longer_side() {
        let gray: GrayImage = ImageBuffer::from_pixel(2000, 1000, Luma([128u8]));
        let (out, scale) = downscale(gray, 500);
        assert_eq!(out.dimensions(), (500, 250));
        assert!((scale - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_downscale_disabled() {
        let gray: GrayImage = ImageBuffer::from_pixel(2000, 1000, Luma([128u8]));
        let (out, _) = downscale(gray, 0);
        assert_eq!(out.dimensions(), (2000, 1000));
    }

    #[tokio::test]
    async fn test_blank_image_has_no_codes() {
        let blank = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(64, 64, Luma([255u8])));
        let codes = QrDetector::new()
            .scan(ImageHandle::from_bitmap(blank, 0), &[BarcodeFormat::QrCode])
            .await
            .unwrap();
        assert!(codes.is_empty());
    }

    #[tokio::test]
    async fn test_empty_image_is_decode_error() {
        let empty = DynamicImage::ImageLuma8(ImageBuffer::new(0, 0));
        let result = QrDetector::new()
            .scan(ImageHandle::from_bitmap(empty, 0), &[BarcodeFormat::QrCode])
            .await;
        assert!(result.is_err());
    }
}
