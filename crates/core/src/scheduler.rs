//! Cancellable per-frame scheduling.
//!
//! Hosts implement [`FrameScheduler`] over their display clock
//! (`requestAnimationFrame` in the browser, a sleep loop in the terminal).
//! [`FrameLoop`] owns the single outstanding request.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Handle to one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameToken(pub u64);

pub trait FrameScheduler {
    /// Ask for one callback on the next display frame.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a pending request. Cancelling a fired or unknown token is a
    /// no-op.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// A self-rescheduling frame loop with idempotent start/stop.
///
/// At most one request is outstanding at any time: `start` while running
/// does nothing, `stop` cancels the pending request, and a frame delivered
/// with a stale token is ignored.
#[derive(Debug, Default)]
pub struct FrameLoop {
    pending: Option<FrameToken>,
    running: bool,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Returns `true` if this call started the loop.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
        true
    }

    /// Returns `true` if this call stopped a running loop.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if let Some(token) = self.pending.take() {
            scheduler.cancel_frame(token);
        }
        std::mem::replace(&mut self.running, false)
    }

    /// Accept a delivered frame. Returns `true` when the frame belongs to this
    /// loop and work should run; the next frame is already requested.
    pub fn on_frame(&mut self, token: FrameToken, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.pending != Some(token) {
            trace!(?token, "stale frame ignored");
            return false;
        }
        self.pending = None;
        if !self.running {
            return false;
        }
        self.pending = Some(scheduler.request_frame());
        true
    }
}

/// A scheduler that only records requests. Used by tests and by hosts that
/// drive frames from their own loop.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    outstanding: Vec<FrameToken>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> &[FrameToken] {
        &self.outstanding
    }

    /// Fire the oldest outstanding request, as a display refresh would.
    pub fn fire(&mut self) -> Option<FrameToken> {
        if self.outstanding.is_empty() {
            return None;
        }
        Some(self.outstanding.remove(0))
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.outstanding.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.outstanding.retain(|t| *t != token);
    }
}
