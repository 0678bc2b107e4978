//! Gifcap CLI: record frames into animated GIFs
//!
//! ## Usage
//!
//! ```bash
//! gifcap record                         # 2s synthetic recording
//! gifcap record --manual 5 --no-loop    # five single-frame captures
//! gifcap config --defaults              # print default configuration
//! ```

use clap::Parser;
use gifcap_cli::{
    handlers, logging, Cli, CliConfig, CliResult, Commands, ProgressReporter, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init_logging(&config);

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
                .failure(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig, command: Commands) -> CliResult<()> {
    match command {
        Commands::Record(args) => {
            let summary = handlers::execute_record(config, &args)?;
            if let Some(path) = summary.path {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Config(args) => handlers::execute_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_log_format(cli.log_format.clone().into())
}
