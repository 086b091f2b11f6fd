//! Binary entry point: parse arguments, set up output, dispatch a command.
//!
//! The exit status is the only machine-readable result of a run:
//! - `0` every camera was encoded or skipped
//! - `1` the run could not start (arguments, configuration, window, lock)
//! - `2` the run completed but at least one camera failed

use anyhow::Result;

use daylapse::args::{self, CliAction, ParsedArgs, RunOptions};
use daylapse::commands;
use daylapse::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use daylapse::logger::Log;
use daylapse::{log_end, log_error_exit};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let code = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            EXIT_SUCCESS
        }
        CliAction::ShowHelp => {
            args::display_help();
            EXIT_SUCCESS
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            EXIT_FAILURE
        }
        CliAction::Run(options) => {
            with_output(&options, || commands::run::handle_run_command(&options))
        }
        CliAction::ShowWindow(options) => with_output(&options, || {
            commands::window::handle_window_command(&options).map(|_| EXIT_SUCCESS)
        }),
    };

    std::process::exit(code);
}

/// Apply `--quiet` and `--log`, run `command`, and report a fatal error.
///
/// The file logger is flushed before this returns, so callers may exit.
fn with_output(options: &RunOptions, command: impl FnOnce() -> Result<i32>) -> i32 {
    if options.quiet {
        Log::set_enabled(false);
    }

    let _log_guard = match &options.log_file {
        Some(path) => match Log::start_file_logging(path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("daylapse: {e:#}");
                return EXIT_FAILURE;
            }
        },
        None => None,
    };

    match command() {
        Ok(code) => code,
        Err(e) => {
            if Log::is_enabled() {
                log_error_exit!("{e:#}");
                log_end!();
            } else {
                eprintln!("daylapse: {e:#}");
            }
            EXIT_FAILURE
        }
    }
}
