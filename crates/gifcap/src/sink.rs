//! Producer-side capture interface
//!
//! The capture source runs on its own thread and owns a [`FrameSink`]. Each
//! tick the sink asks the shared state machine whether a frame may be
//! admitted, grabs one from the source only when it may, scales it by the
//! session's resize ratio and pushes it into the store.

use crate::config::{CaptureConfig, CaptureMode};
use crate::frame::Frame;
use crate::result::CaptureResult;
use crate::state::CaptureStateMachine;
use crate::store::{FrameStore, PushOutcome};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::trace;

/// Something that can sample the current rendered image
pub trait CaptureSource {
    /// Produce a frame of the current content
    fn grab(&mut self) -> CaptureResult<Frame>;
}

impl<F> CaptureSource for F
where
    F: FnMut() -> CaptureResult<Frame>,
{
    fn grab(&mut self) -> CaptureResult<Frame> {
        self()
    }
}

/// Capture rate limiter
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    /// Pace at one frame per `interval`
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Minimum spacing between due ticks
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a frame is due at `now`; the first check always is
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.last
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Record that a frame was taken at `now`
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

/// Result of one producer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not admitted (paused, idle, or not due yet)
    Skipped,
    /// Frame stored at this capture index
    Stored {
        /// Capture index
        index: u64,
    },
    /// Admitted but the store was full
    Full,
}

/// Producer-side handle gating frames into the store
#[derive(Debug)]
pub struct FrameSink {
    store: Arc<FrameStore>,
    machine: Arc<Mutex<CaptureStateMachine>>,
    pacer: FramePacer,
    mode: CaptureMode,
    resize_ratio: f32,
}

impl FrameSink {
    /// Create a sink over a store and its state machine
    #[must_use]
    pub fn new(
        store: Arc<FrameStore>,
        machine: Arc<Mutex<CaptureStateMachine>>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            store,
            machine,
            pacer: FramePacer::new(config.capture_interval()),
            mode: config.capture_mode,
            resize_ratio: config.resize_ratio,
        }
    }

    /// Capture interval this sink paces at
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.pacer.interval()
    }

    fn admit(&mut self, now: Instant) -> bool {
        let due = self.mode == CaptureMode::Continuous && self.pacer.is_due(now);
        let admitted = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .admit(due);
        if admitted && due {
            self.pacer.mark(now);
        }
        admitted
    }

    fn store_frame(&self, frame: Frame) -> CaptureResult<TickOutcome> {
        let frame = if self.resize_ratio < 1.0 {
            frame.resized(self.resize_ratio)?
        } else {
            frame
        };

        Ok(match self.store.push(frame) {
            PushOutcome::Stored { index } => {
                trace!(index, "frame admitted");
                TickOutcome::Stored { index }
            }
            PushOutcome::Full => TickOutcome::Full,
        })
    }

    /// Run one capture tick against a pull-style source
    ///
    /// The source is only sampled when the frame will be admitted.
    pub fn tick<S: CaptureSource + ?Sized>(
        &mut self,
        source: &mut S,
        now: Instant,
    ) -> CaptureResult<TickOutcome> {
        if !self.admit(now) {
            return Ok(TickOutcome::Skipped);
        }
        let frame = source.grab()?;
        self.store_frame(frame)
    }

    /// Offer a frame a push-style source already holds
    pub fn offer(&mut self, frame: Frame, now: Instant) -> CaptureResult<TickOutcome> {
        if !self.admit(now) {
            return Ok(TickOutcome::Skipped);
        }
        self.store_frame(frame)
    }
}
