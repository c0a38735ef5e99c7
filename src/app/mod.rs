// SPDX-License-Identifier: MPL-2.0

//! Scanner application logic
//!
//! # Architecture
//!
//! - `acquirer`: camera capture and gallery selection into an [`ImageHandle`]
//! - `decode`: QR decode pipeline and the scanner capability
//! - `presenter`: dialog/notice presentation of cycle outcomes
//! - `session`: acquisition cycles tying the three together

pub mod acquirer;
pub mod decode;
pub mod presenter;
pub mod session;

pub use acquirer::{AcquisitionRequest, ImageAcquirer, ImageHandle, ImageSource};
pub use decode::{BarcodeScanner, DecodePipeline, DecodedPayload, DetectedCode, QrDetector};
pub use presenter::{
    Dialog, DialogSurface, NotificationSurface, Outcome, PlainSurface, Presentation,
    ResultPresenter,
};
pub use session::{CycleReport, CycleState, CycleToken, ScanSession};

use crate::backends::{CommandCamera, FilePicker};
use crate::config::Config;
use std::sync::Arc;

/// Build a session with the configured camera and QR detector
pub fn session_from_config(
    config: &Config,
    picker: Arc<dyn FilePicker>,
    presenter: ResultPresenter,
) -> ScanSession {
    let acquirer = ImageAcquirer::new(Arc::new(CommandCamera::from_config(config)), picker)
        .with_staging_dir(config.staging_dir.clone());
    let pipeline = DecodePipeline::new(Arc::new(QrDetector::with_max_dimension(
        config.max_dimension,
    )));

    ScanSession::new(acquirer, pipeline, presenter, config.mime_filter.clone())
        .with_discard_stale(config.discard_stale_cycles)
}
