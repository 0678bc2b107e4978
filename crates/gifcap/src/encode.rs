//! GIF encode job
//!
//! Serializes a frozen [`FrameSnapshot`] into an animated GIF. Every frame gets
//! the same delay derived from the playback rate (not the capture rate), and
//! the loop extension is only written for looping artifacts.
//!
//! [`EncodeJob::spawn`] runs the job on a dedicated worker thread so palette
//! quantization never blocks the capture producer or the owning thread.

use crate::config::{CaptureConfig, PriorityHint};
use crate::frame::Frame;
use crate::result::{CaptureError, CaptureResult};
use crate::store::FrameSnapshot;
use gif::{Encoder, Repeat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Timing and quality parameters of an encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSettings {
    /// Displayed frames per second
    pub playback_fps: u32,
    /// Loop forever (true) or play once
    pub loop_playback: bool,
    /// Worker thread priority
    pub priority: PriorityHint,
    /// Quality level (1-100, affects palette quantization)
    pub quality: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

impl EncodeSettings {
    /// Take the encode-related values of a capture config
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            playback_fps: config.playback_fps.max(1),
            loop_playback: config.loop_playback,
            priority: config.priority,
            quality: config.quality.clamp(1, 100),
        }
    }

    /// Per-frame delay in centiseconds
    #[must_use]
    pub fn frame_delay_cs(&self) -> u16 {
        // 30 fps -> 3cs, 10 fps -> 10cs, 1 fps -> 100cs
        let fps = u16::try_from(self.playback_fps.max(1)).unwrap_or(u16::MAX);
        (100 / fps).max(1)
    }

    /// Convert quality (1-100) to GIF encoder speed (1-30)
    #[must_use]
    pub fn quantizer_speed(&self) -> i32 {
        // quality 100 -> speed 1 (slowest, best palette)
        // quality 1 -> speed 30 (fastest, coarsest palette)
        let normalized = i32::from(100 - self.quality.clamp(1, 100));
        (normalized * 29 / 100 + 1).clamp(1, 30)
    }
}

/// Encode frames into an in-memory GIF
///
/// The canvas takes the first frame's dimensions; later frames of another
/// size are scaled to it. An empty slice yields an empty buffer.
pub fn encode_gif(frames: &[Frame], settings: &EncodeSettings) -> CaptureResult<Vec<u8>> {
    let Some(first) = frames.first() else {
        return Ok(Vec::new());
    };

    let to_u16 = |v: u32| {
        u16::try_from(v).map_err(|_| {
            CaptureError::encode(format!("frame dimension {v} exceeds the GIF limit of 65535"))
        })
    };
    let (canvas_w, canvas_h) = (first.width(), first.height());
    let width = to_u16(canvas_w)?;
    let height = to_u16(canvas_h)?;

    let mut output = Vec::new();
    {
        let mut encoder = Encoder::new(&mut output, width, height, &[])
            .map_err(|e| CaptureError::encode(format!("Failed to create GIF encoder: {e}")))?;

        if settings.loop_playback {
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| CaptureError::encode(format!("Failed to set GIF repeat: {e}")))?;
        }

        let delay = settings.frame_delay_cs();
        let speed = settings.quantizer_speed();

        for frame in frames {
            let fitted = frame.resized_exact(canvas_w, canvas_h)?;
            let mut rgba = fitted.data().to_vec();

            let mut gif_frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, speed);
            gif_frame.delay = delay;

            encoder
                .write_frame(&gif_frame)
                .map_err(|e| CaptureError::encode(format!("Failed to write GIF frame: {e}")))?;
        }
        // trailer is written on drop
    }

    Ok(output)
}

/// One encode of a frozen snapshot into an artifact file
#[derive(Debug, Clone)]
pub struct EncodeJob {
    snapshot: FrameSnapshot,
    settings: EncodeSettings,
    output: PathBuf,
}

impl EncodeJob {
    /// Create a job
    #[must_use]
    pub fn new(snapshot: FrameSnapshot, settings: EncodeSettings, output: impl Into<PathBuf>) -> Self {
        Self {
            snapshot,
            settings,
            output: output.into(),
        }
    }

    /// Number of frames to encode
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Artifact path
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Encode parameters
    #[must_use]
    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    /// Encode, write the artifact and return the file's bytes
    ///
    /// An empty snapshot completes with an empty result and writes nothing.
    pub fn run(&self) -> CaptureResult<Vec<u8>> {
        if self.snapshot.is_empty() {
            debug!(path = %self.output.display(), "nothing to encode");
            return Ok(Vec::new());
        }

        let encoded = encode_gif(self.snapshot.frames(), &self.settings)?;

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.output, &encoded)?;
        let bytes = std::fs::read(&self.output)?;

        info!(
            path = %self.output.display(),
            frames = self.snapshot.len(),
            bytes = bytes.len(),
            delay_cs = self.settings.frame_delay_cs(),
            looped = self.settings.loop_playback,
            "artifact written"
        );
        Ok(bytes)
    }

    /// Run the job on a dedicated worker thread
    ///
    /// `on_done` is called exactly once on the worker, with the artifact bytes
    /// or the failure. If the worker panics, `on_done` receives
    /// `WorkerPanicked`.
    pub fn spawn<F>(self, on_done: F) -> CaptureResult<JoinHandle<()>>
    where
        F: FnOnce(CaptureResult<Vec<u8>>) + Send + 'static,
    {
        let name = match self.snapshot.session_id() {
            Some(id) => format!("gifcap-encode-{id}"),
            None => "gifcap-encode".to_string(),
        };

        let handle = std::thread::Builder::new().name(name).spawn(move || {
            let guard = CompletionGuard::new(on_done);
            apply_priority(self.settings.priority);
            let result = self.run();
            guard.complete(result);
        })?;

        Ok(handle)
    }
}

/// Calls the completion exactly once, reporting a panic if the worker never
/// got to call it
struct CompletionGuard<F: FnOnce(CaptureResult<Vec<u8>>)> {
    on_done: Option<F>,
}

impl<F: FnOnce(CaptureResult<Vec<u8>>)> CompletionGuard<F> {
    fn new(on_done: F) -> Self {
        Self {
            on_done: Some(on_done),
        }
    }

    fn complete(mut self, result: CaptureResult<Vec<u8>>) {
        if let Some(on_done) = self.on_done.take() {
            on_done(result);
        }
    }
}

impl<F: FnOnce(CaptureResult<Vec<u8>>)> Drop for CompletionGuard<F> {
    fn drop(&mut self) {
        if let Some(on_done) = self.on_done.take() {
            on_done(Err(CaptureError::WorkerPanicked {
                message: "encode worker exited before reporting a result".to_string(),
            }));
        }
    }
}

/// Apply a priority hint to the calling thread
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub fn apply_priority(priority: PriorityHint) {
    let nice = priority.nice_value();
    // SAFETY: neither call takes pointers; on Linux PRIO_PROCESS with a tid
    // targets only that thread.
    let rc = unsafe {
        let tid = libc::syscall(libc::SYS_gettid) as libc::id_t;
        libc::setpriority(libc::PRIO_PROCESS, tid, nice)
    };
    if rc == 0 {
        debug!(?priority, nice, "encode worker priority applied");
    } else {
        warn!(
            ?priority,
            nice,
            error = %std::io::Error::last_os_error(),
            "could not apply encode worker priority"
        );
    }
}

/// Apply a priority hint to the calling thread
#[cfg(not(target_os = "linux"))]
pub fn apply_priority(priority: PriorityHint) {
    debug!(?priority, "thread priority hints are not supported on this platform");
}
