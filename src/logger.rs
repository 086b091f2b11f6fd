//! Structured logging with box-drawing output.
//!
//! Every line the application prints goes through the macros defined here so
//! that a run reads as one connected block in the terminal:
//!
//! ```text
//! ┏ daylapse v0.4.0 ━━╸
//! ┃
//! ┣ Twilight window (civil)
//! ┃   Dawn: 2024-06-21 09:13:27 UTC
//! ┣[WARNING] camB: no frames inside the window
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a new conceptual block (camera, phase, summary).
//!   It prints an empty pipe for spacing, then `┣ message`.
//! - **`log_decorated!`** continues a block with `┣ message`.
//! - **`log_indented!`** lists details under the current block: `┃   message`.
//! - **`log_pipe!`** inserts an empty `┃` before a levelled message that starts
//!   its own block. Not for use at the end of a block.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`**
//!   print a coloured `[LEVEL]` tag after the pipe.
//! - **`log_version!`** and **`log_end!`** frame the whole run.
//!
//! With `--log <file>` output is routed to a writer thread instead of stdout.
//! Colour codes are stripped there and every line is stamped with the UTC
//! time it was logged.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

use anyhow::Context;
use chrono::{DateTime, Utc};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Set once when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

pub struct Log;

impl Log {
    /// Enable or disable all output (used by `--quiet` and in tests).
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output to `file_path`.
    ///
    /// The file is created (or truncated) before this returns, so a bad path
    /// is reported to the caller rather than lost in the writer thread.
    pub fn start_file_logging(file_path: impl Into<PathBuf>) -> anyhow::Result<LoggerGuard> {
        let file_path = file_path.into();
        let mut file = std::fs::File::create(&file_path)
            .with_context(|| format!("Failed to create log file {}", file_path.display()))?;

        let (tx, rx) = channel();
        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), std::io::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }
}

/// Keeps the file writer alive; flushes and joins it on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<std::io::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` colour sequences.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Prefix every line of `text` with `[YYYY-MM-DD HH:MM:SS] `.
fn stamp_lines(text: &str, at: DateTime<Utc>) -> String {
    let stamp = at.format("[%Y-%m-%d %H:%M:%S] ").to_string();
    let mut stamped = String::with_capacity(text.len() + stamp.len());
    for line in text.split_inclusive('\n') {
        stamped.push_str(&stamp);
        stamped.push_str(line);
    }
    stamped
}

/// Send already formatted text to the active sink.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let clean = stamp_lines(&strip_ansi_codes(text), Utc::now());
        let _ = tx.send(LogMessage::Formatted(clean));
    } else {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Write `lead` followed by `message` as one line, if logging is enabled.
/// Called by the macros; not meant to be used directly.
pub fn emit(lead: &str, message: fmt::Arguments<'_>) {
    if Log::is_enabled() {
        write_output(&format!("{lead}{message}\n"));
    }
}

// # Logging Macros

/// Continue the current block with `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣ ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣ ", format_args!("{}", $expr))
    };
}

/// Detail line under the current block.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┃   ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┃   ", format_args!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", format_args!(""))
    };
}

/// Start a new block: an empty pipe, then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┃\n┣ ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┃\n┣ ", format_args!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            "┏ ",
            format_args!("daylapse v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", format_args!(""))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", format_args!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", format_args!("{}", $expr))
    };
}

/// Error that ends the run: closes the block with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┃\n┗[\x1b[31mERROR\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┃\n┗[\x1b[31mERROR\x1b[0m] ", format_args!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", format_args!("{}", $expr))
    };
}

/// Callers decide whether debug output is wanted; this macro always prints.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[36mDEBUG\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[36mDEBUG\x1b[0m] ", format_args!("{}", $expr))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", format_args!("{}", $expr))
    };
}
