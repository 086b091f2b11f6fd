//! Command-line argument parsing.
//!
//! ```text
//! daylapse [OPTIONS] [COMMAND]
//! ```
//!
//! Parsing never fails: unknown options, stray words and missing option values
//! are reported as warnings and turn into [`CliAction::ShowHelpDueToError`].

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::time_source::parse_instant;

/// Settings shared by the `run` and `window` commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub debug_enabled: bool,
    /// Explicit configuration file (`--config`).
    pub config_path: Option<PathBuf>,
    /// Replaces "now" (`--at`).
    pub at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub log_file: Option<PathBuf>,
    pub quiet: bool,
}

/// What the binary should do.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Build today's videos for every camera
    Run(RunOptions),
    /// Print the computed window and partition keys only
    ShowWindow(RunOptions),
    ShowHelp,
    ShowVersion,
    /// Show help due to invalid arguments and exit with failure
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

#[derive(Clone, Copy, PartialEq)]
enum Command {
    Run,
    Window,
    Help,
}

impl ParsedArgs {
    /// Parse `args` (including the program name) into an action.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = RunOptions::default();
        let mut command: Option<Command> = None;
        let mut display_help = false;
        let mut display_version = false;
        let mut invalid = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = args_vec[i].as_str();

            // `--option=value` is accepted for the options taking a value
            let (flag, inline_value) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
                _ => (arg, None),
            };

            let mut take_value = |name: &str| -> Option<String> {
                if let Some(value) = inline_value.clone() {
                    return Some(value);
                }
                match args_vec.get(i + 1) {
                    Some(value) if !value.starts_with('-') || value.len() == 1 => {
                        i += 1;
                        Some(value.clone())
                    }
                    _ => {
                        log_warning!("Missing value for {name}");
                        None
                    }
                }
            };

            match flag {
                "-h" | "--help" => display_help = true,
                "-V" | "--version" => display_version = true,
                "-d" | "--debug" => options.debug_enabled = true,
                "-q" | "--quiet" => options.quiet = true,
                "--dry-run" => options.dry_run = true,
                "-c" | "--config" => match take_value("--config") {
                    Some(path) => options.config_path = Some(PathBuf::from(path)),
                    None => invalid = true,
                },
                "--log" => match take_value("--log") {
                    Some(path) => options.log_file = Some(PathBuf::from(path)),
                    None => invalid = true,
                },
                "--at" => match take_value("--at").map(|value| parse_instant(&value)) {
                    Some(Ok(at)) => options.at = Some(at),
                    Some(Err(e)) => {
                        log_warning!("{e}");
                        invalid = true;
                    }
                    None => invalid = true,
                },
                word if !word.starts_with('-') && command.is_none() => {
                    command = match word {
                        "run" => Some(Command::Run),
                        "window" | "w" => Some(Command::Window),
                        "help" => Some(Command::Help),
                        other => {
                            log_warning!("Unknown command: {other}");
                            invalid = true;
                            None
                        }
                    };
                }
                other => {
                    if other.starts_with('-') {
                        log_warning!("Unknown option: {other}");
                    } else {
                        log_warning!("Unexpected argument: {other}");
                    }
                    invalid = true;
                }
            }
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if invalid {
            CliAction::ShowHelpDueToError
        } else if display_help || command == Some(Command::Help) {
            CliAction::ShowHelp
        } else if command == Some(Command::Window) {
            CliAction::ShowWindow(options)
        } else {
            CliAction::Run(options)
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    log_decorated!(env!("CARGO_PKG_DESCRIPTION"));
    log_end!();
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("daylapse [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <file>    Use a specific configuration file");
    log_indented!("-d, --debug            Show partition keys, bounds and candidate counts");
    log_indented!("    --at <datetime>    Run as if it were this time (RFC 3339 or");
    log_indented!("                       YYYY-MM-DDTHH:MM:SS, UTC)");
    log_indented!("    --dry-run          Select frames but write and encode nothing");
    log_indented!("    --log <file>       Write output to a file instead of the terminal");
    log_indented!("-q, --quiet            Print nothing; rely on the exit status");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Build today's video for every camera (default)");
    log_indented!("window, w              Print the dawn/dusk window and exit");
    log_indented!("help                   Print this message");
    log_block_start!("Exit status:");
    log_indented!("0  every camera encoded or skipped");
    log_indented!("1  the run could not start (configuration, window, lock)");
    log_indented!("2  at least one camera failed");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run_with(f: impl FnOnce(&mut RunOptions)) -> CliAction {
        let mut options = RunOptions::default();
        f(&mut options);
        CliAction::Run(options)
    }

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["daylapse"]);
        assert_eq!(parsed.action, CliAction::Run(RunOptions::default()));
    }

    #[test]
    fn test_parse_run_command() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "run"]);
        assert_eq!(parsed.action, CliAction::Run(RunOptions::default()));
    }

    #[test]
    fn test_parse_debug_flag() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "--debug"]);
        assert_eq!(parsed.action, run_with(|o| o.debug_enabled = true));

        let parsed = ParsedArgs::parse(vec!["daylapse", "-d"]);
        assert_eq!(parsed.action, run_with(|o| o.debug_enabled = true));
    }

    #[test]
    fn test_parse_config_path() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "-c", "/etc/daylapse.toml"]);
        assert_eq!(
            parsed.action,
            run_with(|o| o.config_path = Some(PathBuf::from("/etc/daylapse.toml")))
        );

        let parsed = ParsedArgs::parse(vec!["daylapse", "--config=/etc/daylapse.toml"]);
        assert_eq!(
            parsed.action,
            run_with(|o| o.config_path = Some(PathBuf::from("/etc/daylapse.toml")))
        );
    }

    #[test]
    fn test_parse_missing_value() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "--config"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);

        let parsed = ParsedArgs::parse(vec!["daylapse", "--log", "--debug"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_at() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "--at", "2024-06-21T12:00:00"]);
        let at = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        assert_eq!(parsed.action, run_with(|o| o.at = Some(at)));

        let parsed = ParsedArgs::parse(vec!["daylapse", "--at", "noon"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_window_command_with_options() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "-d", "window", "--at=2024-12-31T12:00:00Z"]);
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(
            parsed.action,
            CliAction::ShowWindow(RunOptions {
                debug_enabled: true,
                at: Some(at),
                ..RunOptions::default()
            })
        );
    }

    #[test]
    fn test_parse_all_run_flags() {
        let parsed = ParsedArgs::parse(vec![
            "daylapse",
            "run",
            "--dry-run",
            "-q",
            "--log",
            "/tmp/daylapse.log",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Run(RunOptions {
                dry_run: true,
                quiet: true,
                log_file: Some(PathBuf::from("/tmp/daylapse.log")),
                ..RunOptions::default()
            })
        );
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(ParsedArgs::parse(vec!["daylapse", "-h"]).action, CliAction::ShowHelp);
        assert_eq!(ParsedArgs::parse(vec!["daylapse", "help"]).action, CliAction::ShowHelp);
        assert_eq!(
            ParsedArgs::parse(vec!["daylapse", "--debug", "--help"]).action,
            CliAction::ShowHelp
        );
    }

    #[test]
    fn test_version_takes_precedence() {
        let parsed = ParsedArgs::parse(vec!["daylapse", "--version", "--help", "--bogus"]);
        assert_eq!(parsed.action, CliAction::ShowVersion);
        assert_eq!(ParsedArgs::parse(vec!["daylapse", "-V"]).action, CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_unknown_input() {
        assert_eq!(
            ParsedArgs::parse(vec!["daylapse", "--unknown"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daylapse", "encode"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daylapse", "run", "window"]).action,
            CliAction::ShowHelpDueToError
        );
    }
}
