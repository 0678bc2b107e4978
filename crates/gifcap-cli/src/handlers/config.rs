//! Config command handler

use crate::error::{CliError, CliResult};
use crate::ConfigArgs;
use gifcap::CaptureConfig;
use std::path::Path;

/// Load a capture config file, naming the file on failure
pub fn load_config_file(path: &Path) -> CliResult<CaptureConfig> {
    CaptureConfig::from_file(path).map_err(|e| CliError::config(format!("{}: {e}", path.display())))
}

/// Configuration from `--config`, or the defaults
pub fn effective_config(args: &ConfigArgs) -> CliResult<CaptureConfig> {
    match &args.config {
        Some(path) => load_config_file(path),
        None => Ok(CaptureConfig::default()),
    }
}

/// Render the YAML the config command prints
///
/// `--defaults` prints the built-in defaults. Adding `--show` prints the
/// effective configuration first, then the defaults as a second document.
pub fn render_config(args: &ConfigArgs) -> CliResult<String> {
    let defaults = CaptureConfig::default().to_yaml()?;
    if !args.defaults {
        return Ok(effective_config(args)?.to_yaml()?);
    }
    if args.show {
        let effective = effective_config(args)?.to_yaml()?;
        return Ok(format!("{effective}---\n{defaults}"));
    }
    Ok(defaults)
}

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    print!("{}", render_config(args)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(show: bool, defaults: bool, config: Option<PathBuf>) -> ConfigArgs {
        ConfigArgs {
            show,
            defaults,
            config,
        }
    }

    #[test]
    fn test_render_defaults() {
        let yaml = render_config(&args(false, true, None)).unwrap();
        assert!(yaml.contains("capture_fps: 15"));
        assert!(yaml.contains("max_captured_frames: 50"));
        assert!(yaml.contains("result_dir: gifresult"));
    }

    #[test]
    fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("capture.yaml");
        std::fs::write(&file, "playback_fps: 24\nloop_playback: false\n").unwrap();

        let yaml = render_config(&args(true, false, Some(file.clone()))).unwrap();
        assert!(yaml.contains("playback_fps: 24"));
        assert!(yaml.contains("loop_playback: false"));

        let defaults = render_config(&args(false, true, Some(file))).unwrap();
        assert!(defaults.contains("playback_fps: 30"));
    }

    #[test]
    fn test_show_with_defaults_prints_both() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("capture.yaml");
        std::fs::write(&file, "playback_fps: 24\n").unwrap();

        let yaml = render_config(&args(true, true, Some(file))).unwrap();
        let (effective, defaults) = yaml.split_once("---\n").unwrap();
        assert!(effective.contains("playback_fps: 24"));
        assert!(defaults.contains("playback_fps: 30"));
    }

    #[test]
    fn test_missing_file() {
        let result = effective_config(&args(true, false, Some(PathBuf::from("/nonexistent/gifcap.yaml"))));
        assert!(matches!(result, Err(CliError::Config { .. })));
    }

    #[test]
    fn test_bad_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.yaml");
        std::fs::write(&file, "capture_fps: [not, a, number]\n").unwrap();

        let err = effective_config(&args(false, false, Some(file.clone()))).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains(&file.display().to_string()));
    }
}
