// SPDX-License-Identifier: GPL-3.0-only

//! Acquisition cycles
//!
//! One cycle runs acquire → decode → present and always ends in
//! [`CycleState::Idle`]. The acquired image is passed along the chain as a
//! value; nothing about a cycle is stored on the session except the token of
//! the most recently started cycle.

use super::acquirer::{ImageAcquirer, ImageSource};
use super::decode::DecodePipeline;
use super::presenter::{Outcome, Presentation, ResultPresenter};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Identifies one cycle; later cycles have larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleToken(u64);

impl CycleToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// States a cycle moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Awaiting(ImageSource),
    Decoding,
    Presented,
    NotFound,
    DecodeFailed,
    AcquisitionFailed,
}

/// Record of a finished cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub token: CycleToken,
    pub source: ImageSource,
    pub outcome: Outcome,
    pub presentation: Presentation,
    /// Every state entered, starting and ending with `Idle`
    pub transitions: Vec<CycleState>,
}

impl CycleReport {
    /// Whether the decode pipeline was reached
    pub fn decoded(&self) -> bool {
        self.transitions.contains(&CycleState::Decoding)
    }
}

struct Cycle {
    token: CycleToken,
    transitions: Vec<CycleState>,
}

impl Cycle {
    fn advance(&mut self, state: CycleState) {
        debug!(cycle = self.token.0, ?state, "Cycle state");
        self.transitions.push(state);
    }
}

/// Runs acquisition cycles against one set of capabilities
pub struct ScanSession {
    acquirer: ImageAcquirer,
    pipeline: DecodePipeline,
    presenter: ResultPresenter,
    mime_filter: String,
    discard_stale: bool,
    latest: AtomicU64,
}

impl ScanSession {
    pub fn new(
        acquirer: ImageAcquirer,
        pipeline: DecodePipeline,
        presenter: ResultPresenter,
        mime_filter: impl Into<String>,
    ) -> Self {
        Self {
            acquirer,
            pipeline,
            presenter,
            mime_filter: mime_filter.into(),
            discard_stale: true,
            latest: AtomicU64::new(0),
        }
    }

    /// When false, a superseded cycle still presents its result
    pub fn with_discard_stale(mut self, discard: bool) -> Self {
        self.discard_stale = discard;
        self
    }

    /// Start a cycle; the returned token becomes the latest one
    fn begin(&self) -> Cycle {
        let token = CycleToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        Cycle {
            token,
            transitions: vec![CycleState::Idle],
        }
    }

    fn is_current(&self, token: CycleToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    pub async fn run_camera_cycle(&self) -> CycleReport {
        self.run_cycle(ImageSource::Camera).await
    }

    pub async fn run_gallery_cycle(&self) -> CycleReport {
        self.run_cycle(ImageSource::Gallery).await
    }

    pub async fn run_cycle(&self, source: ImageSource) -> CycleReport {
        let mut cycle = self.begin();
        info!(cycle = cycle.token.0, %source, "Starting acquisition cycle");

        cycle.advance(CycleState::Awaiting(source));
        let acquired = match source {
            ImageSource::Camera => self.acquirer.request_camera_capture().await,
            ImageSource::Gallery => {
                self.acquirer
                    .request_gallery_selection(&self.mime_filter)
                    .await
            }
        };

        let (outcome, final_state) = match acquired {
            Ok(image) => {
                cycle.advance(CycleState::Decoding);
                let outcome = Outcome::from(self.pipeline.decode(Some(image)).await);
                let state = match &outcome {
                    Outcome::Decoded(payload) if payload.is_empty() => CycleState::NotFound,
                    Outcome::Decoded(_) => CycleState::Presented,
                    _ => CycleState::DecodeFailed,
                };
                (outcome, state)
            }
            Err(err) => (Outcome::AcquisitionFailed(err), CycleState::AcquisitionFailed),
        };

        let presentation = if self.discard_stale && !self.is_current(cycle.token) {
            info!(cycle = cycle.token.0, "Discarding result of superseded cycle");
            Presentation::Superseded
        } else {
            cycle.advance(final_state);
            self.presenter.present(&outcome)
        };

        cycle.advance(CycleState::Idle);
        CycleReport {
            token: cycle.token,
            source,
            outcome,
            presentation,
            transitions: cycle.transitions,
        }
    }
}
