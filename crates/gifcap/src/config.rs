//! Capture configuration
//!
//! Everything the pipeline reads from its host: capture and playback rates,
//! store capacity, loop flag, worker priority and where artifacts land.
//! Loaded from YAML or built with the `with_*` builder methods; every setter
//! clamps to a valid range so a config value can never stall the pipeline.

use crate::encode::EncodeSettings;
use crate::result::{CaptureError, CaptureResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scheduling preference for the encode worker thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityHint {
    /// Lowest scheduling priority
    Lowest,
    /// Below normal (default: encoding yields to capture and UI)
    #[default]
    BelowNormal,
    /// Host default priority
    Normal,
    /// Above normal
    AboveNormal,
    /// Highest scheduling priority
    Highest,
}

impl PriorityHint {
    /// Unix nice value this hint maps to (lower is more urgent)
    #[must_use]
    pub const fn nice_value(self) -> i32 {
        match self {
            Self::Lowest => 10,
            Self::BelowNormal => 5,
            Self::Normal => 0,
            Self::AboveNormal => -5,
            Self::Highest => -10,
        }
    }
}

/// How frames are admitted while recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Frames are admitted continuously at the capture frame rate
    #[default]
    Continuous,
    /// Frames are admitted only on explicit one-shot requests
    Manual,
}

/// Configuration for a capture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Captured frames per second (1-60)
    pub capture_fps: u32,
    /// Maximum number of frames held by the store
    pub max_captured_frames: usize,
    /// Displayed frames per second in the artifact (1-100)
    pub playback_fps: u32,
    /// Artifact loops forever when true, plays once otherwise
    pub loop_playback: bool,
    /// Encode worker priority
    pub priority: PriorityHint,
    /// Continuous or manual admission
    pub capture_mode: CaptureMode,
    /// Scale applied to frames before admission (0.1-1.0)
    pub resize_ratio: f32,
    /// Quality level (1-100, affects palette quantization)
    pub quality: u8,
    /// Directory receiving artifacts
    pub result_dir: PathBuf,
    /// File stem prefix for artifacts
    pub artifact_prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_fps: 15,
            max_captured_frames: 50,
            playback_fps: 30,
            loop_playback: true,
            priority: PriorityHint::BelowNormal,
            capture_mode: CaptureMode::Continuous,
            resize_ratio: 0.5,
            quality: 80,
            result_dir: PathBuf::from("gifresult"),
            artifact_prefix: "GifRecorder".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set captured frames per second (clamped to 1-60)
    #[must_use]
    pub fn with_capture_fps(mut self, fps: u32) -> Self {
        self.capture_fps = fps.clamp(1, 60);
        self
    }

    /// Set store capacity (at least 1)
    #[must_use]
    pub fn with_max_captured_frames(mut self, max: usize) -> Self {
        self.max_captured_frames = max.max(1);
        self
    }

    /// Set playback frames per second (clamped to 1-100)
    #[must_use]
    pub fn with_playback_fps(mut self, fps: u32) -> Self {
        self.playback_fps = fps.clamp(1, 100);
        self
    }

    /// Set loop behaviour
    #[must_use]
    pub fn with_loop_playback(mut self, looped: bool) -> Self {
        self.loop_playback = looped;
        self
    }

    /// Set encode worker priority
    #[must_use]
    pub fn with_priority(mut self, priority: PriorityHint) -> Self {
        self.priority = priority;
        self
    }

    /// Set capture mode
    #[must_use]
    pub fn with_capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = mode;
        self
    }

    /// Set resize ratio (clamped to 0.1-1.0)
    #[must_use]
    pub fn with_resize_ratio(mut self, ratio: f32) -> Self {
        self.resize_ratio = if ratio.is_finite() {
            ratio.clamp(0.1, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Set quality (1-100)
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Set result directory
    #[must_use]
    pub fn with_result_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.result_dir = dir.into();
        self
    }

    /// Set artifact file prefix
    #[must_use]
    pub fn with_artifact_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.artifact_prefix = prefix.into();
        self
    }

    /// Re-apply the builder clamps to values that came from a file
    #[must_use]
    pub fn normalized(self) -> Self {
        let capture_fps = self.capture_fps;
        let max = self.max_captured_frames;
        let playback_fps = self.playback_fps;
        let ratio = self.resize_ratio;
        let quality = self.quality;
        self.with_capture_fps(capture_fps)
            .with_max_captured_frames(max)
            .with_playback_fps(playback_fps)
            .with_resize_ratio(ratio)
            .with_quality(quality)
    }

    /// Frame delay in centiseconds (GIF standard)
    #[must_use]
    pub fn frame_delay_cs(&self) -> u16 {
        EncodeSettings::from_config(self).frame_delay_cs()
    }

    /// Minimum time between two continuously captured frames
    #[must_use]
    pub fn capture_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.capture_fps.max(1)))
    }

    /// Artifact location for a session: `<result_dir>/<prefix>_<id>.gif`
    #[must_use]
    pub fn artifact_path(&self, session_id: &str) -> PathBuf {
        self.result_dir
            .join(format!("{}_{}.gif", self.artifact_prefix, session_id))
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> CaptureResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| CaptureError::config(format!("Failed to parse config: {e}")))?;
        Ok(config.normalized())
    }

    /// Load a YAML config file
    pub fn from_file(path: &Path) -> CaptureResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> CaptureResult<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| CaptureError::config(format!("Failed to serialize config: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = CaptureConfig::default();
            assert_eq!(config.capture_fps, 15);
            assert_eq!(config.max_captured_frames, 50);
            assert_eq!(config.playback_fps, 30);
            assert!(config.loop_playback);
            assert_eq!(config.priority, PriorityHint::BelowNormal);
            assert_eq!(config.capture_mode, CaptureMode::Continuous);
            assert!((config.resize_ratio - 0.5).abs() < f32::EPSILON);
            assert_eq!(config.quality, 80);
        }

        #[test]
        fn test_frame_delay_calculation() {
            let config = CaptureConfig::default().with_playback_fps(10);
            assert_eq!(config.frame_delay_cs(), 10);

            let config = CaptureConfig::default().with_playback_fps(30);
            assert_eq!(config.frame_delay_cs(), 3);

            let config = CaptureConfig::default().with_playback_fps(1);
            assert_eq!(config.frame_delay_cs(), 100);

            let config = CaptureConfig::default().with_playback_fps(100);
            assert_eq!(config.frame_delay_cs(), 1);
        }

        #[test]
        fn test_capture_interval() {
            let config = CaptureConfig::default().with_capture_fps(10);
            assert_eq!(config.capture_interval(), Duration::from_millis(100));
        }

        #[test]
        fn test_artifact_path() {
            let config = CaptureConfig::default()
                .with_result_dir("/tmp/out")
                .with_artifact_prefix("Clip");
            assert_eq!(
                config.artifact_path("2026-19-10--12-00-00_3"),
                PathBuf::from("/tmp/out/Clip_2026-19-10--12-00-00_3.gif")
            );
        }

        #[test]
        fn test_priority_nice_values_ordered() {
            assert!(PriorityHint::Lowest.nice_value() > PriorityHint::BelowNormal.nice_value());
            assert!(PriorityHint::BelowNormal.nice_value() > PriorityHint::Normal.nice_value());
            assert_eq!(PriorityHint::Normal.nice_value(), 0);
            assert!(PriorityHint::Highest.nice_value() < PriorityHint::AboveNormal.nice_value());
        }
    }

    mod clamping_tests {
        use super::*;

        #[test]
        fn test_capture_fps_clamping() {
            assert_eq!(CaptureConfig::default().with_capture_fps(0).capture_fps, 1);
            assert_eq!(CaptureConfig::default().with_capture_fps(500).capture_fps, 60);
        }

        #[test]
        fn test_max_frames_minimum() {
            let config = CaptureConfig::default().with_max_captured_frames(0);
            assert_eq!(config.max_captured_frames, 1);
        }

        #[test]
        fn test_resize_ratio_clamping() {
            assert!((CaptureConfig::default().with_resize_ratio(0.0).resize_ratio - 0.1).abs() < 1e-6);
            assert!((CaptureConfig::default().with_resize_ratio(4.0).resize_ratio - 1.0).abs() < 1e-6);
            assert!((CaptureConfig::default().with_resize_ratio(f32::NAN).resize_ratio - 1.0).abs() < 1e-6);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_uses_defaults() {
            let config = CaptureConfig::from_yaml_str("playback_fps: 20\nloop_playback: false\n").unwrap();
            assert_eq!(config.playback_fps, 20);
            assert!(!config.loop_playback);
            assert_eq!(config.capture_fps, 15);
            assert_eq!(config.max_captured_frames, 50);
        }

        #[test]
        fn test_yaml_enums() {
            let yaml = "priority: above_normal\ncapture_mode: manual\n";
            let config = CaptureConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(config.priority, PriorityHint::AboveNormal);
            assert_eq!(config.capture_mode, CaptureMode::Manual);
        }

        #[test]
        fn test_yaml_values_are_clamped() {
            let config = CaptureConfig::from_yaml_str("capture_fps: 0\nquality: 0\n").unwrap();
            assert_eq!(config.capture_fps, 1);
            assert_eq!(config.quality, 1);
        }

        #[test]
        fn test_invalid_yaml() {
            let err = CaptureConfig::from_yaml_str("capture_fps: [1, 2").unwrap_err();
            assert!(matches!(err, CaptureError::Config { .. }));
        }

        #[test]
        fn test_yaml_survives_serialization() {
            let config = CaptureConfig::default()
                .with_priority(PriorityHint::Highest)
                .with_max_captured_frames(7);
            let yaml = config.to_yaml().unwrap();
            assert!(yaml.contains("priority: highest"));
            assert_eq!(CaptureConfig::from_yaml_str(&yaml).unwrap(), config);
        }

        #[test]
        fn test_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("gifcap.yaml");
            std::fs::write(&path, "max_captured_frames: 12\n").unwrap();
            let config = CaptureConfig::from_file(&path).unwrap();
            assert_eq!(config.max_captured_frames, 12);
        }

        #[test]
        fn test_from_missing_file() {
            let err = CaptureConfig::from_file(Path::new("/nonexistent/gifcap.yaml")).unwrap_err();
            assert!(matches!(err, CaptureError::Io(_)));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_playback_fps_always_valid(fps in 0u32..10_000) {
                let config = CaptureConfig::default().with_playback_fps(fps);
                prop_assert!(config.playback_fps >= 1);
                prop_assert!(config.playback_fps <= 100);
                prop_assert!(config.frame_delay_cs() >= 1);
            }

            #[test]
            fn prop_quality_always_valid(quality in 0u8..=255) {
                let config = CaptureConfig::default().with_quality(quality);
                prop_assert!(config.quality >= 1);
                prop_assert!(config.quality <= 100);
            }
        }
    }
}
