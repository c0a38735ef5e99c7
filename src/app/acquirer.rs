// SPDX-License-Identifier: GPL-3.0-only

//! Image acquisition
//!
//! Turns camera captures and gallery selections into an [`ImageHandle`].
//! Both paths hand the request to an external capability, wait for its
//! result, and then load the image on a blocking worker.

use crate::backends::{ActivityResult, CameraCapability, FilePicker};
use crate::constants::acquisition::NO_ROTATION;
use crate::errors::{AcquisitionError, AcquisitionReason};
use crate::storage;
use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Decoded pixel data plus the rotation to apply before scanning
#[derive(Clone)]
pub struct ImageHandle {
    image: Arc<DynamicImage>,
    rotation: u16,
}

impl ImageHandle {
    /// Wrap an in-memory bitmap; rotation is in degrees and snapped to quarter turns
    pub fn from_bitmap(image: DynamicImage, rotation: u16) -> Self {
        Self {
            image: Arc::new(image),
            rotation: (rotation / 90 % 4) * 90,
        }
    }

    /// Read and decode an image file; no orientation correction is applied
    pub fn from_path(path: &Path) -> Result<Self, image::ImageError> {
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Ok(Self::from_bitmap(image, NO_ROTATION))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Grayscale copy with the rotation applied
    pub fn to_luma8(&self) -> GrayImage {
        let gray = self.image.to_luma8();
        match self.rotation {
            90 => image::imageops::rotate90(&gray),
            180 => image::imageops::rotate180(&gray),
            270 => image::imageops::rotate270(&gray),
            _ => gray,
        }
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("rotation", &self.rotation)
            .finish()
    }
}

/// Which source a cycle is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionRequest {
    /// External camera writes to `destination`
    Camera { destination: PathBuf },
    /// File picker restricted to `mime_filter`
    GallerySelection { mime_filter: String },
}

impl AcquisitionRequest {
    pub fn source(&self) -> ImageSource {
        match self {
            AcquisitionRequest::Camera { .. } => ImageSource::Camera,
            AcquisitionRequest::GallerySelection { .. } => ImageSource::Gallery,
        }
    }
}

/// Source of an acquisition, without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Gallery,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Gallery => write!(f, "gallery"),
        }
    }
}

/// Obtains images from the camera and gallery capabilities
///
/// Camera captures share one staging file, so only one capture runs at a
/// time; later requests wait for the running one to finish loading.
pub struct ImageAcquirer {
    camera: Arc<dyn CameraCapability>,
    picker: Arc<dyn FilePicker>,
    staging_dir: Option<PathBuf>,
    capture_lock: Mutex<()>,
}

impl ImageAcquirer {
    pub fn new(camera: Arc<dyn CameraCapability>, picker: Arc<dyn FilePicker>) -> Self {
        Self {
            camera,
            picker,
            staging_dir: None,
            capture_lock: Mutex::new(()),
        }
    }

    /// Stage camera captures in `dir` instead of the default private storage
    pub fn with_staging_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.staging_dir = dir;
        self
    }

    /// Build the request for a camera capture, allocating the staging file
    pub async fn camera_request(&self) -> Result<AcquisitionRequest, AcquisitionError> {
        let destination = storage::staging_path(self.staging_dir.as_deref())
            .await
            .map_err(|e| {
                AcquisitionError::with_detail(
                    AcquisitionReason::UserCancelledOrNoData,
                    format!("staging file unavailable: {}", e),
                )
            })?;
        Ok(AcquisitionRequest::Camera { destination })
    }

    /// Capture with the external camera into the staging file and load it
    pub async fn request_camera_capture(&self) -> Result<ImageHandle, AcquisitionError> {
        let request = self.camera_request().await?;
        self.acquire(&request).await
    }

    /// Let the user pick a file matching `mime_filter` and load it
    pub async fn request_gallery_selection(
        &self,
        mime_filter: &str,
    ) -> Result<ImageHandle, AcquisitionError> {
        self.acquire(&AcquisitionRequest::GallerySelection {
            mime_filter: mime_filter.to_string(),
        })
        .await
    }

    /// Fulfil an acquisition request
    pub async fn acquire(&self, request: &AcquisitionRequest) -> Result<ImageHandle, AcquisitionError> {
        match request {
            AcquisitionRequest::Camera { destination } => self.capture_into(destination).await,
            AcquisitionRequest::GallerySelection { mime_filter } => self.select(mime_filter).await,
        }
    }

    async fn capture_into(&self, destination: &Path) -> Result<ImageHandle, AcquisitionError> {
        let _capture = self.capture_lock.lock().await;

        if let Err(e) = storage::clear_staging_file(destination).await {
            warn!(error = %e, path = %destination.display(), "Failed to clear staging file");
        }

        match self.camera.capture(destination).await {
            ActivityResult::Success(()) => {
                info!(path = %destination.display(), "Camera capture complete");
                load_image(destination.to_path_buf()).await
            }
            ActivityResult::Cancelled => {
                debug!("Camera capture cancelled or produced no data");
                Err(AcquisitionError::cancelled())
            }
            ActivityResult::Failed(detail) => {
                debug!(error = %detail, "Camera capture failed");
                Err(AcquisitionError::with_detail(
                    AcquisitionReason::UserCancelledOrNoData,
                    detail,
                ))
            }
        }
    }

    async fn select(&self, mime_filter: &str) -> Result<ImageHandle, AcquisitionError> {
        match self.picker.pick(mime_filter).await {
            ActivityResult::Success(path) => {
                info!(path = %path.display(), "Gallery selection complete");
                load_image(path).await
            }
            ActivityResult::Cancelled => {
                debug!("Gallery selection returned no reference");
                Err(AcquisitionError::no_selection())
            }
            ActivityResult::Failed(detail) => {
                debug!(error = %detail, "Gallery selection failed");
                Err(AcquisitionError::with_detail(
                    AcquisitionReason::UnreadableContent,
                    detail,
                ))
            }
        }
    }
}

/// Decode an image file on a blocking worker
pub async fn load_image(path: PathBuf) -> Result<ImageHandle, AcquisitionError> {
    let shown = path.display().to_string();
    let result = tokio::task::spawn_blocking(move || ImageHandle::from_path(&path))
        .await
        .map_err(|e| AcquisitionError::unreadable(format!("image load task failed: {}", e)))?;

    match result {
        Ok(handle) => {
            debug!(
                path = %shown,
                width = handle.width(),
                height = handle.height(),
                "Loaded image"
            );
            Ok(handle)
        }
        Err(e) => {
            debug!(path = %shown, error = %e, "Failed to read image");
            Err(AcquisitionError::unreadable(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::PathPicker;
    use async_trait::async_trait;
    use image::{ImageBuffer, Luma};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubCamera(ActivityResult<()>);

    #[async_trait]
    impl CameraCapability for StubCamera {
        async fn capture(&self, _destination: &Path) -> ActivityResult<()> {
            self.0.clone()
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("qrscan-acquirer-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_rotation_snaps_to_quarter_turns() {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(4, 2, Luma([0u8])));
        assert_eq!(ImageHandle::from_bitmap(img.clone(), 0).rotation(), 0);
        assert_eq!(ImageHandle::from_bitmap(img.clone(), 95).rotation(), 90);
        assert_eq!(ImageHandle::from_bitmap(img.clone(), 360).rotation(), 0);

        let rotated = ImageHandle::from_bitmap(img, 90).to_luma8();
        assert_eq!(rotated.dimensions(), (2, 4));
    }

    #[tokio::test]
    async fn test_camera_cancel_maps_to_user_cancelled() {
        let acquirer = ImageAcquirer::new(
            Arc::new(StubCamera(ActivityResult::Cancelled)),
            Arc::new(PathPicker::new(None)),
        )
        .with_staging_dir(Some(temp_dir("cancel")));

        let err = acquirer.request_camera_capture().await.unwrap_err();
        assert_eq!(err.reason, AcquisitionReason::UserCancelledOrNoData);
    }

    #[tokio::test]
    async fn test_camera_success_without_readable_file_is_unreadable() {
        let acquirer = ImageAcquirer::new(
            Arc::new(StubCamera(ActivityResult::Success(()))),
            Arc::new(PathPicker::new(None)),
        )
        .with_staging_dir(Some(temp_dir("unreadable")));

        let err = acquirer.request_camera_capture().await.unwrap_err();
        assert_eq!(err.reason, AcquisitionReason::UnreadableContent);
    }

    #[tokio::test]
    async fn test_gallery_without_selection() {
        let acquirer = ImageAcquirer::new(
            Arc::new(StubCamera(ActivityResult::Cancelled)),
            Arc::new(PathPicker::new(None)),
        );
        let err = acquirer.request_gallery_selection("image/*").await.unwrap_err();
        assert_eq!(err.reason, AcquisitionReason::NoSelection);
    }

    struct RejectingPicker;

    #[async_trait]
    impl FilePicker for RejectingPicker {
        async fn pick(&self, mime_filter: &str) -> ActivityResult<PathBuf> {
            ActivityResult::Failed(format!("unsupported filter: {}", mime_filter))
        }
    }

    #[tokio::test]
    async fn test_picker_failure_is_unreadable() {
        let acquirer = ImageAcquirer::new(
            Arc::new(StubCamera(ActivityResult::Cancelled)),
            Arc::new(RejectingPicker),
        );
        let err = acquirer.request_gallery_selection("text/plain").await.unwrap_err();
        assert_eq!(err.reason, AcquisitionReason::UnreadableContent);
    }

    /// Camera that records how many captures overlap
    struct SlowCamera {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl CameraCapability for SlowCamera {
        async fn capture(&self, destination: &Path) -> ActivityResult<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            ImageBuffer::from_pixel(8, 6, Luma([255u8]))
                .save(destination)
                .unwrap();
            self.active.fetch_sub(1, Ordering::SeqCst);
            ActivityResult::Success(())
        }
    }

    #[tokio::test]
    async fn test_camera_captures_never_overlap() {
        let camera = Arc::new(SlowCamera {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let dir = temp_dir("serial");
        let acquirer = ImageAcquirer::new(camera.clone(), Arc::new(PathPicker::new(None)))
            .with_staging_dir(Some(dir.clone()));

        let (first, second) = tokio::join!(
            acquirer.request_camera_capture(),
            acquirer.request_camera_capture()
        );
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(camera.peak.load(Ordering::SeqCst), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_gallery_loads_selected_file() {
        let dir = temp_dir("gallery");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("plain.png");
        ImageBuffer::from_pixel(8, 6, Luma([255u8])).save(&path).unwrap();

        let acquirer = ImageAcquirer::new(
            Arc::new(StubCamera(ActivityResult::Cancelled)),
            Arc::new(PathPicker::new(Some(path))),
        );
        let handle = acquirer.request_gallery_selection("image/*").await.unwrap();
        assert_eq!((handle.width(), handle.height()), (8, 6));
        assert_eq!(handle.rotation(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
