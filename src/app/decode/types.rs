// SPDX-License-Identifier: MPL-2.0

//! Core types for decode results

use crate::constants::decoding::CONSUMED_RESULTS;

/// Code families the scanner can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    QrCode,
}

impl BarcodeFormat {
    /// Get display name for the format
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::QrCode => "QR Code",
        }
    }
}

/// A rectangular region within an image
///
/// Coordinates are normalized (0.0 to 1.0) relative to the image dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of image, 1.0 = right of image)
    pub x: f32,
    /// Top edge (0.0 = top of image, 1.0 = bottom of image)
    pub y: f32,
    /// Width as fraction of image width
    pub width: f32,
    /// Height as fraction of image height
    pub height: f32,
}

impl FrameRegion {
    /// Create a region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            x: x as f32 / frame_width as f32,
            y: y as f32 / frame_height as f32,
            width: width as f32 / frame_width as f32,
            height: height as f32 / frame_height as f32,
        }
    }

    /// Axis-aligned box around corner points, clamped to the image
    pub fn bounding(points: &[(f32, f32)], frame_width: u32, frame_height: u32) -> Option<Self> {
        if points.is_empty() || frame_width == 0 || frame_height == 0 {
            return None;
        }

        let (fw, fh) = (frame_width as f32, frame_height as f32);
        let min_x = points.iter().map(|p| p.0).fold(f32::MAX, f32::min).clamp(0.0, fw);
        let max_x = points.iter().map(|p| p.0).fold(f32::MIN, f32::max).clamp(0.0, fw);
        let min_y = points.iter().map(|p| p.1).fold(f32::MAX, f32::min).clamp(0.0, fh);
        let max_y = points.iter().map(|p| p.1).fold(f32::MIN, f32::max).clamp(0.0, fh);

        Some(Self::from_pixels(
            min_x as u32,
            min_y as u32,
            (max_x - min_x) as u32,
            (max_y - min_y) as u32,
            frame_width,
            frame_height,
        ))
    }
}

/// One recognized code
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedCode {
    /// Text embedded in the code, before any interpretation
    pub raw_value: String,
    pub format: BarcodeFormat,
    /// Location in normalized image coordinates, if the scanner reports it
    pub bounds: Option<FrameRegion>,
}

impl DetectedCode {
    pub fn new(raw_value: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            raw_value: raw_value.into(),
            format,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: FrameRegion) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// All codes found in one image; empty means nothing was found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPayload {
    codes: Vec<DetectedCode>,
}

impl DecodedPayload {
    pub fn new(codes: Vec<DetectedCode>) -> Self {
        Self { codes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn codes(&self) -> &[DetectedCode] {
        &self.codes
    }

    /// The codes this application acts on; only the first one is consumed
    pub fn consumed(&self) -> &[DetectedCode] {
        &self.codes[..self.codes.len().min(CONSUMED_RESULTS)]
    }

    pub fn first(&self) -> Option<&DetectedCode> {
        self.codes.first()
    }
}

impl From<Vec<DetectedCode>> for DecodedPayload {
    fn from(codes: Vec<DetectedCode>) -> Self {
        Self::new(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_region_from_pixels() {
        let region = FrameRegion::from_pixels(100, 50, 200, 100, 1000, 500);
        assert!((region.x - 0.1).abs() < 0.001);
        assert!((region.y - 0.1).abs() < 0.001);
        assert!((region.width - 0.2).abs() < 0.001);
        assert!((region.height - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_bounding_clamps_to_frame() {
        let region =
            FrameRegion::bounding(&[(-10.0, 20.0), (60.0, 20.0), (60.0, 80.0), (-10.0, 80.0)], 100, 100)
                .unwrap();
        assert_eq!(region.x, 0.0);
        assert!((region.width - 0.6).abs() < 0.001);
        assert!((region.y - 0.2).abs() < 0.001);
        assert!(FrameRegion::bounding(&[], 100, 100).is_none());
    }

    #[test]
    fn test_consumed_is_first_only() {
        let payload = DecodedPayload::new(vec![
            DetectedCode::new("first", BarcodeFormat::QrCode),
            DetectedCode::new("second", BarcodeFormat::QrCode),
        ]);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload.consumed().len(), 1);
        assert_eq!(payload.consumed()[0].raw_value, "first");
        assert!(DecodedPayload::empty().consumed().is_empty());
    }
}
