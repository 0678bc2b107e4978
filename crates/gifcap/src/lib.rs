//! Gifcap: Frame Capture to Animated GIF
//!
//! Captures rendered RGBA frames into a bounded store while a session is
//! recording, then encodes a snapshot of the store into an animated GIF on a
//! background worker. The worker's result comes back through a dispatcher
//! drained on the thread that owns the session.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  tick   ┌─────────────┐  push   ┌────────────┐
//! │ CaptureSource │◄───────│  FrameSink  │───────►│ FrameStore │
//! │ (producer)    │        │ (gate+pace) │        │ (bounded)  │
//! └───────────────┘        └──────┬──────┘        └─────┬──────┘
//!                                 │ admit                │ snapshot
//!                          ┌──────▼──────────┐    ┌──────▼──────┐
//!                          │ CaptureState    │    │  EncodeJob  │
//!                          │ Machine         │    │  (worker)   │
//!                          └──────▲──────────┘    └──────┬──────┘
//!                                 │                      │ completion
//!                          ┌──────┴──────────────────────▼──────┐
//!                          │ SessionController + ResultDispatcher│
//!                          │ (owning thread, pump)               │
//!                          └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gifcap::{CaptureConfig, Frame, SessionController};
//! use std::time::{Duration, Instant};
//!
//! # fn main() -> gifcap::CaptureResult<()> {
//! let mut controller = SessionController::new(CaptureConfig::default());
//! let mut sink = controller.frame_sink();
//!
//! controller.start_capture()?;
//! sink.offer(Frame::solid(64, 64, [255, 0, 0, 255])?, Instant::now())?;
//! controller.stop_capture();
//!
//! controller.generate_capture(|bytes| {
//!     println!("gif: {} bytes", bytes.map(|b| b.len()).unwrap_or(0));
//! })?;
//! controller.wait_for_completion(Duration::from_secs(10))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Capture configuration
pub mod config;
/// Result dispatcher for owner-thread completions
pub mod dispatch;
/// GIF encoding and the background encode job
pub mod encode;
/// Immutable RGBA frames
pub mod frame;
mod result;
/// Session controller and session ids
pub mod session;
/// Producer-side capture interface
pub mod sink;
/// Capture state machine
pub mod state;
/// Bounded frame store
pub mod store;

pub use config::{CaptureConfig, CaptureMode, PriorityHint};
pub use dispatch::{Callback, DispatchSender, ResultDispatcher};
pub use encode::{apply_priority, encode_gif, EncodeJob, EncodeSettings};
pub use frame::{Frame, BYTES_PER_PIXEL};
pub use result::{CaptureError, CaptureResult};
pub use session::{Generation, Session, SessionController, SessionId, SessionIdGenerator};
pub use sink::{CaptureSource, FramePacer, FrameSink, TickOutcome};
pub use state::{CaptureState, CaptureStateMachine};
pub use store::{FrameSnapshot, FrameStore, PushOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::*;
    pub use super::frame::Frame;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::sink::*;
    pub use super::state::*;
    pub use super::store::*;
}
