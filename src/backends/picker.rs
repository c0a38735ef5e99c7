// SPDX-License-Identifier: GPL-3.0-only

//! Gallery selection
//!
//! [`DialogPicker`] opens the native file dialog. [`PathPicker`] stands in for
//! it when the path is already known, e.g. passed on the command line.

use super::ActivityResult;
use crate::constants::file_formats;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// A capability that lets the user choose one file matching a MIME filter
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self, mime_filter: &str) -> ActivityResult<PathBuf>;
}

/// Native file dialog
#[derive(Debug, Clone, Default)]
pub struct DialogPicker {
    title: Option<String>,
}

impl DialogPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

#[async_trait]
impl FilePicker for DialogPicker {
    async fn pick(&self, mime_filter: &str) -> ActivityResult<PathBuf> {
        let extensions = file_formats::extensions_for_mime(mime_filter);
        if extensions.is_empty() {
            return ActivityResult::Failed(format!("unsupported filter: {}", mime_filter));
        }

        let mut dialog = rfd::AsyncFileDialog::new().add_filter(mime_filter, &extensions[..]);
        if let Some(title) = &self.title {
            dialog = dialog.set_title(title);
        }

        info!(filter = %mime_filter, "Opening file picker");
        match dialog.pick_file().await {
            Some(handle) => {
                let path = handle.path().to_path_buf();
                debug!(path = %path.display(), "File selected");
                ActivityResult::Success(path)
            }
            None => {
                debug!("File picker closed without a selection");
                ActivityResult::Cancelled
            }
        }
    }
}

/// Picker that returns a path chosen ahead of time
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FilePicker for PathPicker {
    async fn pick(&self, _mime_filter: &str) -> ActivityResult<PathBuf> {
        match &self.path {
            Some(path) => ActivityResult::Success(path.clone()),
            None => ActivityResult::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_path_picker() {
        let picker = PathPicker::new(Some(PathBuf::from("code.png")));
        assert_eq!(
            picker.pick("image/*").await,
            ActivityResult::Success(PathBuf::from("code.png"))
        );
        assert_eq!(
            PathPicker::new(None).pick("image/*").await,
            ActivityResult::Cancelled
        );
    }

    #[tokio::test]
    async fn test_dialog_picker_rejects_non_image_filter() {
        let picker = DialogPicker::new();
        assert!(matches!(
            picker.pick("text/plain").await,
            ActivityResult::Failed(_)
        ));
    }
}
