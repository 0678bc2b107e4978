//! Record command handler

use crate::config::CliConfig;
use super::config::load_config_file;
use crate::error::{CliError, CliResult};
use crate::output::{format_bytes, ProgressReporter};
use crate::source::SyntheticSource;
use crate::RecordArgs;
use gifcap::{CaptureConfig, CaptureMode, CaptureState, Generation, SessionController, TickOutcome};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL: Duration = Duration::from_millis(5);
const SINGLE_CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

/// What a recording produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    /// Frames handed to the encoder
    pub frames: usize,
    /// Artifact path, if one was written
    pub path: Option<PathBuf>,
    /// Artifact size in bytes
    pub bytes: usize,
}

/// Build the capture config from an optional file plus flag overrides
pub fn build_capture_config(args: &RecordArgs) -> CliResult<CaptureConfig> {
    if !args.duration.is_finite() || args.duration < 0.0 {
        return Err(CliError::invalid_argument(format!(
            "duration must be a non-negative number of seconds, got {}",
            args.duration
        )));
    }

    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => CaptureConfig::default(),
    };

    if let Some(fps) = args.capture_fps {
        config = config.with_capture_fps(fps);
    }
    if let Some(fps) = args.playback_fps {
        config = config.with_playback_fps(fps);
    }
    if let Some(max) = args.max_frames {
        config = config.with_max_captured_frames(max);
    }
    if args.no_loop {
        config = config.with_loop_playback(false);
    }
    if args.manual.is_some() {
        config = config.with_capture_mode(CaptureMode::Manual);
    }
    if let Some(ratio) = args.resize_ratio {
        config = config.with_resize_ratio(ratio);
    }
    if let Some(quality) = args.quality {
        config = config.with_quality(quality);
    }
    if let Some(priority) = args.priority {
        config = config.with_priority(priority.into());
    }
    if let Some(dir) = &args.output_dir {
        config = config.with_result_dir(dir);
    }

    Ok(config.normalized())
}

/// Producer thread feeding the controller's sink from a synthetic source
struct Producer {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<u32>,
}

impl Producer {
    fn spawn(controller: &SessionController, width: u32, height: u32) -> CliResult<Self> {
        let mut sink = controller.frame_sink();
        let mut source = SyntheticSource::new(width, height);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let nap = (sink.interval() / 4).clamp(Duration::from_millis(1), POLL);

        let handle = std::thread::Builder::new()
            .name("gifcap-producer".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    match sink.tick(&mut source, Instant::now()) {
                        Ok(TickOutcome::Stored { index }) => debug!(index, "frame captured"),
                        Ok(TickOutcome::Skipped | TickOutcome::Full) => {}
                        Err(e) => warn!(error = %e, "capture source failed"),
                    }
                    std::thread::sleep(nap);
                }
                source.ticks()
            })?;

        Ok(Self { stop, handle })
    }

    fn finish(self) -> CliResult<u32> {
        self.stop.store(true, Ordering::Relaxed);
        self.handle
            .join()
            .map_err(|_| CliError::recording("producer thread panicked"))
    }
}

fn record_timed(
    controller: &mut SessionController,
    reporter: &mut ProgressReporter,
    duration: Duration,
) -> CliResult<()> {
    let capacity = controller.config().max_captured_frames;
    reporter.start_progress(capacity as u64, "recording");

    controller.start_capture()?;
    let deadline = Instant::now().checked_add(duration);
    while deadline.map_or(true, |d| Instant::now() < d) {
        let count = controller.store().count();
        reporter.set_position(count as u64);
        if count >= capacity {
            info!(frames = count, "frame store full, stopping early");
            reporter.info(&format!("frame store full after {count} frames"));
            break;
        }
        std::thread::sleep(POLL);
    }
    controller.stop_capture();
    reporter.finish();
    Ok(())
}

fn record_manual(
    controller: &mut SessionController,
    reporter: &mut ProgressReporter,
    count: usize,
) -> CliResult<()> {
    reporter.start_progress(count as u64, "capturing single frames");

    for taken in 0..count {
        controller.capture_frame()?;
        let deadline = Instant::now() + SINGLE_CAPTURE_TIMEOUT;
        while controller.state() == CaptureState::CaptureOnce {
            if Instant::now() >= deadline {
                reporter.finish();
                return Err(CliError::recording("producer never picked up a single capture"));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        reporter.set_position(taken as u64 + 1);
    }

    controller.stop_capture();
    reporter.finish();
    Ok(())
}

/// Execute the record command
pub fn execute_record(config: &CliConfig, args: &RecordArgs) -> CliResult<RecordSummary> {
    let capture = build_capture_config(args)?;
    let mut reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let mut controller = SessionController::new(capture);

    let producer = Producer::spawn(&controller, args.width, args.height)?;
    let recorded = match args.manual {
        Some(count) => record_manual(&mut controller, &mut reporter, count),
        None => Duration::try_from_secs_f64(args.duration)
            .map_err(|e| CliError::invalid_argument(format!("duration: {e}")))
            .and_then(|duration| record_timed(&mut controller, &mut reporter, duration)),
    };
    let ticks = producer.finish()?;
    recorded?;
    debug!(ticks, "producer stopped");

    let (tx, rx) = mpsc::channel();
    let generation = controller.generate_capture(move |result| {
        let _ = tx.send(result);
    })?;

    let frames = match generation {
        Generation::Empty => 0,
        Generation::Spawned { frames } => {
            reporter.start_spinner(&format!("encoding {frames} frames"));
            let finished = controller.wait_for_completion(Duration::from_secs(args.timeout))?;
            reporter.finish();
            if !finished {
                return Err(CliError::recording(format!(
                    "encoder did not finish within {}s",
                    args.timeout
                )));
            }
            frames
        }
    };

    let bytes = rx
        .recv()
        .map_err(|_| CliError::recording("encoder result was never delivered"))??;

    if bytes.is_empty() {
        reporter.warning("no frames captured, nothing written");
        return Ok(RecordSummary {
            frames: 0,
            path: None,
            bytes: 0,
        });
    }

    let path = controller.result_path().map(PathBuf::from);
    if let Some(p) = &path {
        reporter.success(&format!(
            "{} ({} frames, {})",
            p.display(),
            frames,
            format_bytes(bytes.len())
        ));
    }

    Ok(RecordSummary {
        frames,
        path,
        bytes: bytes.len(),
    })
}
