// SPDX-License-Identifier: MPL-2.0

//! External capabilities the scanner depends on
//!
//! Image acquisition happens in other programs: a camera tool that writes a
//! still image to a path we hand it, and a file picker that returns the path
//! of an image the user chose. Both are modelled as request/result pairs:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Image Acquirer                 │
//! └──────────┬──────────────────────┬───────────┘
//!            │                      │
//! ┌──────────┴─────────┐ ┌──────────┴──────────┐
//! │  CameraCapability  │ │     FilePicker      │
//! │  (external command)│ │ (native dialog/path)│
//! └────────────────────┘ └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`capture`]: camera capture into a staging file
//! - [`picker`]: gallery/file selection

pub mod capture;
pub mod picker;

pub use capture::{CameraCapability, CommandCamera};
pub use picker::{DialogPicker, FilePicker, PathPicker};

/// Result of a request delivered by an external activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityResult<T> {
    /// The activity completed and produced a value
    Success(T),
    /// The user backed out or the activity produced nothing
    Cancelled,
    /// The activity could not run or reported an error
    Failed(String),
}
