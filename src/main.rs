//! Main application entry point.
//!
//! Parses the command line, applies global flags (configuration directory,
//! log file, debug timestamps) and dispatches to a command handler. Any error
//! a handler returns is reported on the log rail and turns into a non-zero
//! exit status.

use qibla::args::{self, CliAction, GlobalOptions, ParsedArgs};
use qibla::commands;
use qibla::common::constants::EXIT_FAILURE;
use qibla::common::logger::{Log, LoggerGuard};
use qibla::config;
use qibla::{log_debug, log_error_exit, log_pipe, log_version};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let (global, json) = match &parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            return;
        }
        CliAction::ShowHelp => {
            args::display_help();
            return;
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Locate { global, options } => (global, options.json),
        CliAction::Compass { global, options } => (global, options.json),
    };

    // Held until the end of main so fatal errors still reach the log file
    let log_guard = match setup(global, json) {
        Ok(guard) => guard,
        Err(e) => exit_with_error(e, None),
    };

    let result = match &parsed_args.action {
        CliAction::Locate { options, .. } => {
            commands::locate::handle_locate_command(options, global.debug_enabled)
        }
        CliAction::Compass { options, .. } => {
            commands::compass::handle_compass_command(options, global.debug_enabled)
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        exit_with_error(e, log_guard);
    }
}

/// Apply the global flags before a command runs.
///
/// Returns the file logging guard when `--log` is given.
fn setup(global: &GlobalOptions, json: bool) -> anyhow::Result<Option<LoggerGuard>> {
    config::set_config_dir(global.config_dir.clone())?;

    let log_guard = match &global.log_file {
        Some(path) => Some(Log::start_file_logging(path.clone())?),
        None => None,
    };

    if json {
        Log::set_enabled(false);
    }
    if global.debug_enabled {
        Log::set_timestamps(true);
    }

    log_version!();
    if global.debug_enabled {
        log_pipe!();
        log_debug!("Debug mode enabled");
    }

    Ok(log_guard)
}

fn exit_with_error(error: anyhow::Error, log_guard: Option<LoggerGuard>) -> ! {
    // JSON mode silences the rail, errors still need to be seen
    Log::set_enabled(true);
    log_error_exit!("{error:#}");
    // process::exit skips destructors; flush the log file first
    drop(log_guard);
    std::process::exit(EXIT_FAILURE);
}
