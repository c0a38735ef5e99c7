// SPDX-License-Identifier: MPL-2.0

//! qrscan - read QR codes from camera captures and image files
//!
//! An acquisition cycle takes a still image from an external camera program
//! or a file picker, decodes the QR codes in it, and shows the first decoded
//! value in a dialog (or a short notice when there is nothing to show).
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: acquisition, decoding, presentation and the cycle driver
//! - [`backends`]: external camera and file picker capabilities
//! - [`config`]: user configuration handling
//! - [`storage`]: private staging file for camera captures
//! - [`terminal`]: terminal dialog and interactive mode
//!
//! # Example
//!
//! ```ignore
//! // Decode an image file and print the result:
//! // qrscan --plain decode code.png
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{DecodedPayload, DetectedCode, ImageHandle, Outcome, Presentation, ScanSession};
pub use config::Config;
pub use errors::{AcquisitionError, DecodeError, InvariantViolation, PipelineError};
