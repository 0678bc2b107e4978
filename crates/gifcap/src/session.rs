//! Session controller
//!
//! Public face of the pipeline. The controller lives on one owning thread:
//! it drives state transitions, launches at most one encode job per session
//! and applies the job's completion when [`SessionController::pump`] drains
//! the result dispatcher. The `saving`, `saved` and result path fields are
//! only ever touched on that thread.
//!
//! ## Example
//!
//! ```ignore
//! let mut controller = SessionController::new(CaptureConfig::default());
//! let mut sink = controller.frame_sink();
//! controller.start_capture()?;
//!
//! // producer thread: sink.tick(&mut source, Instant::now())
//!
//! controller.stop_capture();
//! controller.generate_capture(|bytes| println!("{} bytes", bytes.map(|b| b.len()).unwrap_or(0)))?;
//! while controller.is_saving() {
//!     controller.pump()?;
//! }
//! ```

use crate::config::CaptureConfig;
use crate::dispatch::ResultDispatcher;
use crate::encode::{EncodeJob, EncodeSettings};
use crate::result::{CaptureError, CaptureResult};
use crate::sink::FrameSink;
use crate::state::{CaptureState, CaptureStateMachine};
use crate::store::FrameStore;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%d-%-m--%H-%M-%S";

/// Unique session identifier: `<timestamp>_<counter>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    timestamp: String,
    counter: u64,
}

impl SessionId {
    /// Build an id from its parts
    #[must_use]
    pub fn new(timestamp: impl Into<String>, counter: u64) -> Self {
        Self {
            timestamp: timestamp.into(),
            counter,
        }
    }

    /// Formatted creation time
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Monotonic counter
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.timestamp, self.counter)
    }
}

/// Issues session ids with a per-controller monotonic counter
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    next: u64,
}

impl SessionIdGenerator {
    /// Create a generator starting at 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, stamped with the local time
    pub fn next_id(&mut self) -> SessionId {
        let counter = self.next;
        self.next += 1;
        SessionId::new(Local::now().format(TIMESTAMP_FORMAT).to_string(), counter)
    }
}

/// One recording-to-artifact lifecycle
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    result_path: Option<PathBuf>,
    saving: bool,
    recorded: bool,
    saved: bool,
}

impl Session {
    fn new(id: SessionId, result_path: PathBuf) -> Self {
        Self {
            id,
            result_path: Some(result_path),
            saving: false,
            recorded: false,
            saved: false,
        }
    }

    /// Session id
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Artifact path, `None` once cleaned
    #[must_use]
    pub fn result_path(&self) -> Option<&Path> {
        self.result_path.as_deref()
    }

    /// An encode job is in flight
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Recording was stopped at least once
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// An encode job completed
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.saved
    }
}

/// What `generate_capture` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Nothing to encode; the continuation already ran with an empty result
    Empty,
    /// An encode job was launched
    Spawned {
        /// Frames handed to the job
        frames: usize,
    },
}

/// Ties store, state machine, encoder and dispatcher into the public API
pub struct SessionController {
    config: CaptureConfig,
    store: Arc<FrameStore>,
    machine: Arc<Mutex<CaptureStateMachine>>,
    dispatcher: ResultDispatcher<SessionController>,
    ids: SessionIdGenerator,
    session: Option<Session>,
    job: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("frames", &self.store.count())
            .field("session", &self.session)
            .field("job_in_flight", &self.job.is_some())
            .field("pending_callbacks", &self.dispatcher.pending())
            .finish()
    }
}

impl SessionController {
    /// Create a controller owned by the current thread
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        let config = config.normalized();
        Self {
            store: Arc::new(FrameStore::new(0)),
            machine: Arc::new(Mutex::new(CaptureStateMachine::new())),
            dispatcher: ResultDispatcher::new(),
            ids: SessionIdGenerator::new(),
            session: None,
            job: None,
            config,
        }
    }

    fn machine(&self) -> MutexGuard<'_, CaptureStateMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Shared frame store, for presentation consumers
    #[must_use]
    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    /// Current capture state
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.machine().state()
    }

    /// Frames are being admitted
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.machine().is_recording()
    }

    /// An encode job is in flight
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_saving)
    }

    /// Recording was stopped at least once this session
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_recorded)
    }

    /// The last encode of this session completed
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_saved)
    }

    /// Current session
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current session id
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(Session::id)
    }

    /// Artifact path of the current session
    #[must_use]
    pub fn result_path(&self) -> Option<&Path> {
        self.session.as_ref().and_then(Session::result_path)
    }

    /// The store holds at least one frame
    #[must_use]
    pub fn has_recorded_frames(&self) -> bool {
        !self.store.is_empty()
    }

    /// Producer-side handle for a capture thread
    ///
    /// The sink copies pacing, mode and resize ratio from the current config.
    #[must_use]
    pub fn frame_sink(&self) -> FrameSink {
        FrameSink::new(Arc::clone(&self.store), Arc::clone(&self.machine), &self.config)
    }

    fn init_session(&mut self) -> CaptureResult<()> {
        std::fs::create_dir_all(&self.config.result_dir)?;

        let id = self.ids.next_id();
        let path = self.config.artifact_path(&id.to_string());
        self.store
            .start(id.clone(), self.config.priority, self.config.max_captured_frames);

        info!(session = %id, path = %path.display(), "capture session opened");
        self.session = Some(Session::new(id, path));
        Ok(())
    }

    /// Open a fresh session and start recording
    ///
    /// # Errors
    ///
    /// `Conflict` while the previous capture is still being saved; I/O errors
    /// if the result directory cannot be created.
    pub fn start_capture(&mut self) -> CaptureResult<()> {
        if self.is_saving() {
            return Err(CaptureError::conflict(
                "still saving the last capture, cannot start a new one",
            ));
        }

        self.init_session()?;
        self.machine().start();
        Ok(())
    }

    /// Pause recording; returns whether the state changed
    pub fn stop_capture(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            warn!("no capture session to stop");
            return false;
        };

        let changed = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
        if changed {
            session.recorded = true;
            debug!(session = %session.id, frames = self.store.count(), "capture stopped");
        } else {
            debug!(session = %session.id, "capture already paused");
        }
        changed
    }

    /// Resume a paused session; false when there is none
    pub fn resume_capture(&mut self) -> bool {
        if self.session.is_none() {
            warn!("there is no previous capture session to continue");
            return false;
        }
        self.machine().resume()
    }

    /// Admit exactly one frame on the producer's next tick
    ///
    /// Opens a session first when none exists.
    pub fn capture_frame(&mut self) -> CaptureResult<()> {
        if self.session.is_none() {
            self.init_session()?;
        }
        self.machine().request_single();
        Ok(())
    }

    /// Encode the captured frames in the background
    ///
    /// Pauses capture and snapshots the store. With no frames the continuation
    /// runs right away with an empty result. Otherwise the continuation runs
    /// from a later [`SessionController::pump`] with the artifact bytes or the
    /// failure.
    ///
    /// # Errors
    ///
    /// `Conflict` when a job is already in flight; I/O errors when the worker
    /// thread cannot be spawned.
    pub fn generate_capture<F>(&mut self, continuation: F) -> CaptureResult<Generation>
    where
        F: FnOnce(CaptureResult<Vec<u8>>) + Send + 'static,
    {
        if self.is_saving() {
            return Err(CaptureError::conflict(
                "already saving: an encode job is still in flight",
            ));
        }

        self.machine().pause();
        let snapshot = self.store.snapshot();

        let Some(session) = self.session.as_mut() else {
            info!("no capture session, nothing to generate");
            continuation(Ok(Vec::new()));
            return Ok(Generation::Empty);
        };
        if snapshot.is_empty() {
            info!(session = %session.id, "no frames captured, check capture settings");
            continuation(Ok(Vec::new()));
            return Ok(Generation::Empty);
        }

        let id = session.id.clone();
        let path = match &session.result_path {
            Some(path) => path.clone(),
            None => {
                let path = self.config.artifact_path(&id.to_string());
                session.result_path = Some(path.clone());
                path
            }
        };
        let frames = snapshot.len();
        session.saving = true;

        self.dispatcher.bind_to_current_thread();
        let sender = self.dispatcher.sender();
        let job = EncodeJob::new(snapshot, EncodeSettings::from_config(&self.config), path);
        let spawned = job.spawn(move |result| {
            let delivered = sender.enqueue(move |controller: &mut SessionController| {
                controller.finish_generate(&id, result, continuation);
            });
            if !delivered {
                warn!("capture controller dropped before the encode job finished");
            }
        });

        match spawned {
            Ok(handle) => {
                debug!(frames, "encode job launched");
                self.job = Some(handle);
                Ok(Generation::Spawned { frames })
            }
            Err(e) => {
                if let Some(session) = self.session.as_mut() {
                    session.saving = false;
                }
                error!(error = %e, "could not launch encode job");
                Err(e)
            }
        }
    }

    fn finish_generate<F>(&mut self, id: &SessionId, result: CaptureResult<Vec<u8>>, continuation: F)
    where
        F: FnOnce(CaptureResult<Vec<u8>>),
    {
        if let Some(handle) = self.job.take() {
            if handle.join().is_err() {
                warn!(session = %id, "encode worker panicked after reporting");
            }
        }

        match self.session.as_mut() {
            Some(session) if &session.id == id => {
                session.saving = false;
                session.saved = true;
            }
            _ => warn!(session = %id, "encode finished for a session that is no longer active"),
        }

        match &result {
            Ok(bytes) => info!(session = %id, bytes = bytes.len(), "capture generated"),
            Err(e) => error!(session = %id, error = %e, "capture generation failed"),
        }
        continuation(result);
    }

    /// Run queued completions on this thread; returns how many ran
    ///
    /// # Errors
    ///
    /// `InvalidState` when called from a thread other than the one that
    /// launched the last encode job, or created the controller if none ran.
    pub fn pump(&mut self) -> CaptureResult<usize> {
        let dispatcher = self.dispatcher.clone();
        dispatcher.drain_once(self)
    }

    /// Pump until no job is in flight or `timeout` elapses
    ///
    /// Returns whether the job finished.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> CaptureResult<bool> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            self.pump()?;
            if !self.is_saving() {
                return Ok(true);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(false);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    /// Stop capture, release frames and reset flags
    ///
    /// With `also_delete_file`, the artifact is deleted and the result path
    /// cleared.
    ///
    /// # Errors
    ///
    /// `Conflict` while saving; I/O errors if the artifact cannot be deleted.
    pub fn clean_all(&mut self, also_delete_file: bool) -> CaptureResult<()> {
        if self.is_saving() {
            return Err(CaptureError::conflict(
                "cannot clean while a capture is being saved",
            ));
        }

        if self.session.is_some() {
            self.stop_capture();
        }
        if let Some(session) = self.session.as_mut() {
            session.recorded = false;
            session.saved = false;
        }
        self.store.clear();

        if also_delete_file {
            self.clean_up()?;
        }
        Ok(())
    }

    fn clean_up(&mut self) -> CaptureResult<()> {
        let Some(path) = self.session.as_mut().and_then(|s| s.result_path.take()) else {
            return Ok(());
        };

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "artifact deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                if let Some(session) = self.session.as_mut() {
                    session.result_path = Some(path);
                }
                Err(e.into())
            }
        }
    }

    /// Replace the configuration between recordings
    ///
    /// # Errors
    ///
    /// `Conflict` while recording or saving.
    pub fn reconfigure(&mut self, config: CaptureConfig) -> CaptureResult<()> {
        if self.is_recording() {
            return Err(CaptureError::conflict("cannot reconfigure while recording"));
        }
        if self.is_saving() {
            return Err(CaptureError::conflict("cannot reconfigure while saving"));
        }
        self.config = config.normalized();
        Ok(())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.job.is_some() {
            debug!("controller dropped with an encode job in flight");
        }
        self.store.clear();
    }
}
