// SPDX-License-Identifier: MPL-2.0

//! Error types for the scanner
//!
//! Recoverable failures ([`AcquisitionError`], [`DecodeError`]) are turned into
//! user notices by the presenter. [`InvariantViolation`] marks a caller bug and
//! is kept as its own kind so it never blends in with the recoverable ones.

use std::fmt;

/// Why an acquisition attempt produced no image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionReason {
    /// Camera program failed, was cancelled or wrote nothing
    UserCancelledOrNoData,
    /// File picker returned no reference
    NoSelection,
    /// The referenced content could not be opened as an image
    UnreadableContent,
}

/// Acquisition failure carrying the reason and the raw detail for logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionError {
    pub reason: AcquisitionReason,
    /// Diagnostic detail, never shown to the user
    pub detail: Option<String>,
}

impl AcquisitionError {
    pub fn new(reason: AcquisitionReason) -> Self {
        Self {
            reason,
            detail: None,
        }
    }

    pub fn with_detail(reason: AcquisitionReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: Some(detail.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(AcquisitionReason::UserCancelledOrNoData)
    }

    pub fn no_selection() -> Self {
        Self::new(AcquisitionReason::NoSelection)
    }

    pub fn unreadable(detail: impl Into<String>) -> Self {
        Self::with_detail(AcquisitionReason::UnreadableContent, detail)
    }
}

/// Failure reported by the barcode scanner itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decode was invoked without an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantViolation;

/// Errors returned by the decode pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Caller bug, the scanner was never reached
    Invariant(InvariantViolation),
    /// Runtime failure inside the scanner
    Decode(DecodeError),
}

/// Configuration loading and saving errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// No configuration directory on this platform
    NoConfigDir,
    /// File exists but is not valid JSON for [`crate::Config`]
    Parse(String),
    /// Read or write failed
    Io(String),
}

impl fmt::Display for AcquisitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionReason::UserCancelledOrNoData => write!(f, "cancelled or no data"),
            AcquisitionReason::NoSelection => write!(f, "no selection"),
            AcquisitionReason::UnreadableContent => write!(f, "unreadable content"),
        }
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.reason, detail),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decode failed: {}", self.message)
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decode invoked without an image")
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Invariant(e) => write!(f, "Invariant violation: {}", e),
            PipelineError::Decode(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "No configuration directory available"),
            ConfigError::Parse(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AcquisitionError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for InvariantViolation {}
impl std::error::Error for PipelineError {}
impl std::error::Error for ConfigError {}

impl From<InvariantViolation> for PipelineError {
    fn from(err: InvariantViolation) -> Self {
        PipelineError::Invariant(err)
    }
}

impl From<DecodeError> for PipelineError {
    fn from(err: DecodeError) -> Self {
        PipelineError::Decode(err)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
