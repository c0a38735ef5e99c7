// SPDX-License-Identifier: GPL-3.0-only

//! Result presentation
//!
//! Maps the outcome of a cycle to exactly one user-visible result: a modal
//! dialog with the decoded text, or a short notice. Raw error text is logged
//! and never shown.

use super::decode::DecodedPayload;
use crate::constants::messages;
use crate::errors::{
    AcquisitionError, AcquisitionReason, DecodeError, InvariantViolation, PipelineError,
};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shows a short message without blocking
pub trait NotificationSurface: Send + Sync {
    fn notify(&self, message: &str);
}

/// Shows a modal dialog and returns once it has been dismissed
pub trait DialogSurface: Send + Sync {
    fn show_dialog(&self, dialog: &Dialog);
}

/// Modal dialog content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub body: String,
    /// Label of the single action, which dismisses the dialog
    pub dismiss_label: String,
}

impl Dialog {
    /// Result dialog for a decoded value
    pub fn result(body: impl Into<String>) -> Self {
        Self {
            title: messages::DIALOG_TITLE.to_string(),
            body: body.into(),
            dismiss_label: messages::DIALOG_DISMISS.to_string(),
        }
    }
}

/// Everything a cycle can end with
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Decoded(DecodedPayload),
    AcquisitionFailed(AcquisitionError),
    DecodeFailed(DecodeError),
    InvariantViolation(InvariantViolation),
}

impl From<Result<DecodedPayload, PipelineError>> for Outcome {
    fn from(result: Result<DecodedPayload, PipelineError>) -> Self {
        match result {
            Ok(payload) => Outcome::Decoded(payload),
            Err(PipelineError::Decode(e)) => Outcome::DecodeFailed(e),
            Err(PipelineError::Invariant(e)) => Outcome::InvariantViolation(e),
        }
    }
}

impl From<AcquisitionError> for Outcome {
    fn from(err: AcquisitionError) -> Self {
        Outcome::AcquisitionFailed(err)
    }
}

/// What the presenter put in front of the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Modal dialog with the first decoded value
    Dialog(Dialog),
    /// Transient notice
    Notice(&'static str),
    /// Caller bug; the generic notice was shown
    InvariantViolation,
    /// The cycle was replaced by a newer one and nothing was shown
    Superseded,
}

/// Notice text for outcomes that do not open a dialog
pub fn notice_for(outcome: &Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Decoded(payload) if payload.is_empty() => Some(messages::NO_CODE_FOUND),
        Outcome::Decoded(_) => None,
        Outcome::AcquisitionFailed(err) => Some(match err.reason {
            AcquisitionReason::NoSelection => messages::SELECT_IMAGE,
            AcquisitionReason::UserCancelledOrNoData => messages::CLICK_IMAGE,
            AcquisitionReason::UnreadableContent => messages::SOMETHING_WRONG,
        }),
        Outcome::DecodeFailed(_) | Outcome::InvariantViolation(_) => {
            Some(messages::SOMETHING_WRONG)
        }
    }
}

/// Routes outcomes to the notification and dialog surfaces
#[derive(Clone)]
pub struct ResultPresenter {
    notices: Arc<dyn NotificationSurface>,
    dialogs: Arc<dyn DialogSurface>,
}

impl ResultPresenter {
    pub fn new(notices: Arc<dyn NotificationSurface>, dialogs: Arc<dyn DialogSurface>) -> Self {
        Self { notices, dialogs }
    }

    pub fn present(&self, outcome: &Outcome) -> Presentation {
        match outcome {
            Outcome::Decoded(payload) => match payload.consumed().first() {
                Some(code) => {
                    if payload.len() > 1 {
                        debug!(ignored = payload.len() - 1, "Presenting first code only");
                    }
                    info!(value = %code.raw_value, "Showing QR code result");
                    let dialog = Dialog::result(code.raw_value.clone());
                    self.dialogs.show_dialog(&dialog);
                    Presentation::Dialog(dialog)
                }
                None => self.notice(outcome),
            },
            Outcome::AcquisitionFailed(err) => {
                debug!(error = %err, "Acquisition failed");
                self.notice(outcome)
            }
            Outcome::DecodeFailed(err) => {
                debug!(error = %err, "Decoding failed");
                self.notice(outcome)
            }
            Outcome::InvariantViolation(err) => {
                error!(error = %err, "Invariant violated");
                self.notice(outcome);
                Presentation::InvariantViolation
            }
        }
    }

    fn notice(&self, outcome: &Outcome) -> Presentation {
        let message = notice_for(outcome).unwrap_or(messages::SOMETHING_WRONG);
        self.notices.notify(message);
        Presentation::Notice(message)
    }
}

/// Line-oriented surface: dialogs on stdout, notices on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainSurface;

impl NotificationSurface for PlainSurface {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

impl DialogSurface for PlainSurface {
    fn show_dialog(&self, dialog: &Dialog) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", dialog.title);
        let _ = writeln!(stdout, "{}", dialog.body);
        let _ = stdout.flush();
    }
}
