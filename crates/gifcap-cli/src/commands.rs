//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use gifcap::PriorityHint;
use std::path::PathBuf;

/// Gifcap: capture frames and encode them into animated GIFs
#[derive(Parser, Debug)]
#[command(name = "gifcap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a synthetic animation and encode it as a GIF
    Record(RecordArgs),

    /// Show capture configuration
    Config(ConfigArgs),
}

/// Arguments for the record command
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Recording length in seconds (ignored with --manual)
    #[arg(short, long, default_value = "2.0")]
    pub duration: f64,

    /// Source frame width
    #[arg(long, default_value = "160", value_parser = clap::value_parser!(u32).range(1..=4096))]
    pub width: u32,

    /// Source frame height
    #[arg(long, default_value = "120", value_parser = clap::value_parser!(u32).range(1..=4096))]
    pub height: u32,

    /// Frames captured per second
    #[arg(long)]
    pub capture_fps: Option<u32>,

    /// Frames displayed per second in the GIF
    #[arg(long)]
    pub playback_fps: Option<u32>,

    /// Maximum frames kept per session
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Play the GIF once instead of looping
    #[arg(long)]
    pub no_loop: bool,

    /// Capture N single frames on demand instead of a timed recording
    #[arg(long, value_name = "N")]
    pub manual: Option<usize>,

    /// Scale factor applied to captured frames (0.1-1.0)
    #[arg(long)]
    pub resize_ratio: Option<f32>,

    /// Encoding quality (1-100)
    #[arg(long)]
    pub quality: Option<u8>,

    /// Encode worker priority
    #[arg(long)]
    pub priority: Option<PriorityArg>,

    /// Directory the GIF is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// YAML capture configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the encoder
    #[arg(long, default_value = "120")]
    pub timeout: u64,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show the effective configuration
    #[arg(long)]
    pub show: bool,

    /// Show the built-in defaults
    #[arg(long)]
    pub defaults: bool,

    /// YAML capture configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Worker priority argument
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PriorityArg {
    /// Lowest
    Lowest,
    /// Below normal
    BelowNormal,
    /// Normal
    Normal,
    /// Above normal
    AboveNormal,
    /// Highest
    Highest,
}

impl From<PriorityArg> for PriorityHint {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Lowest => Self::Lowest,
            PriorityArg::BelowNormal => Self::BelowNormal,
            PriorityArg::Normal => Self::Normal,
            PriorityArg::AboveNormal => Self::AboveNormal,
            PriorityArg::Highest => Self::Highest,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
