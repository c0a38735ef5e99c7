// SPDX-License-Identifier: MPL-2.0

//! Decode pipeline
//!
//! Hands an acquired image to a [`BarcodeScanner`] restricted to QR codes and
//! collects whatever it recognizes. An empty result is a normal outcome.

pub mod qr_detector;
pub mod types;

pub use qr_detector::QrDetector;
pub use types::{BarcodeFormat, DecodedPayload, DetectedCode, FrameRegion};

use crate::app::acquirer::ImageHandle;
use crate::errors::{DecodeError, InvariantViolation, PipelineError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// The only code family the pipeline asks for
pub const SCANNER_FORMATS: &[BarcodeFormat] = &[BarcodeFormat::QrCode];

/// A barcode recognition capability
///
/// Implementations must not block the caller; heavy work belongs on a worker.
#[async_trait]
pub trait BarcodeScanner: Send + Sync {
    async fn scan(
        &self,
        image: ImageHandle,
        formats: &[BarcodeFormat],
    ) -> Result<Vec<DetectedCode>, DecodeError>;
}

/// Submits images to the scanner and interprets its answer
#[derive(Clone)]
pub struct DecodePipeline {
    scanner: Arc<dyn BarcodeScanner>,
}

impl DecodePipeline {
    pub fn new(scanner: Arc<dyn BarcodeScanner>) -> Self {
        Self { scanner }
    }

    /// Decode the codes in `image`
    ///
    /// An absent image is an [`InvariantViolation`] and never reaches the scanner.
    pub async fn decode(&self, image: Option<ImageHandle>) -> Result<DecodedPayload, PipelineError> {
        let Some(image) = image else {
            error!("Decode invoked without an image");
            return Err(InvariantViolation.into());
        };

        debug!(?image, "Submitting image to scanner");
        let codes = self.scanner.scan(image, SCANNER_FORMATS).await.map_err(|e| {
            debug!(error = %e, "Scanner reported a failure");
            PipelineError::Decode(e)
        })?;

        let codes: Vec<DetectedCode> = codes
            .into_iter()
            .filter(|code| SCANNER_FORMATS.contains(&code.format))
            .collect();
        debug!(count = codes.len(), "Decode complete");

        Ok(DecodedPayload::new(codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Luma};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingScanner {
        calls: AtomicUsize,
        result: Result<Vec<DetectedCode>, DecodeError>,
    }

    #[async_trait]
    impl BarcodeScanner for CountingScanner {
        async fn scan(
            &self,
            _image: ImageHandle,
            formats: &[BarcodeFormat],
        ) -> Result<Vec<DetectedCode>, DecodeError> {
            assert_eq!(formats, SCANNER_FORMATS);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn handle() -> ImageHandle {
        ImageHandle::from_bitmap(
            DynamicImage::ImageLuma8(ImageBuffer::from_pixel(4, 4, Luma([0u8]))),
            0,
        )
    }

    #[tokio::test]
    async fn test_absent_image_never_reaches_scanner() {
        let scanner = Arc::new(CountingScanner {
            calls: AtomicUsize::new(0),
            result: Ok(Vec::new()),
        });
        let pipeline = DecodePipeline::new(scanner.clone());

        let result = pipeline.decode(None).await;
        assert_eq!(result, Err(PipelineError::Invariant(InvariantViolation)));
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scanner_failure_is_decode_error() {
        let scanner = Arc::new(CountingScanner {
            calls: AtomicUsize::new(0),
            result: Err(DecodeError::new("model not loaded")),
        });
        let pipeline = DecodePipeline::new(scanner.clone());

        let result = pipeline.decode(Some(handle())).await;
        assert!(matches!(result, Err(PipelineError::Decode(_))));
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let scanner = Arc::new(CountingScanner {
            calls: AtomicUsize::new(0),
            result: Ok(Vec::new()),
        });
        let payload = DecodePipeline::new(scanner).decode(Some(handle())).await.unwrap();
        assert!(payload.is_empty());
    }
}
