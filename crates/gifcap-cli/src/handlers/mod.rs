//! Command handlers - kept out of main.rs for testability

pub mod config;
pub mod record;

pub use config::{effective_config, execute_config, load_config_file};
pub use record::{build_capture_config, execute_record, RecordSummary};
