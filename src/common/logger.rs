//! Structured logging system with visual formatting.
//!
//! All terminal output of qibla goes through the macros defined here. They draw
//! a continuous box-character rail so that a compass session reads as one block
//! of related events:
//!
//! ```text
//! ┏ qibla v0.3.0 ━━╸
//! ┃
//! ┣ Location fix acquired
//! ┃   21.4225°N, 39.8262°E (accuracy: Excellent)
//! ┃
//! ┣ Qibla bearing 61.1° (ENE), 98 km
//! ┣[INFO] Alignment entered (accuracy 3.2°)
//! ╹
//! ```
//!
//! The logger can be disabled at runtime (used by `--json` output and by tests),
//! can prefix every line with a wall-clock timestamp, and can be redirected to a
//! file through a background writer thread.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

// Channel for routing output to a file while a LoggerGuard is alive
static LOG_CHANNEL: Mutex<Option<Sender<LogMessage>>> = Mutex::new(None);

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: opens a new conceptual block (location fix, permission
///   outcome, fallback activation). Prints an empty rail line then `┣ message`.
/// - **`log_decorated!`**: a line belonging to the current block, `┣ message`.
/// - **`log_indented!`**: nested detail under the previous line, `┃   message`.
/// - **`log_pipe!`**: a single empty rail line, used before semantic messages
///   that start a new block.
/// - **`log_version!`** / **`log_end!`**: header and terminator of a run.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**:
///   `[LEVEL]`-prefixed semantic messages.
pub struct Log;

impl Log {
    /// Enable or disable logging.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix every line with `[HH:MM:SS.mmm]`. Used in debug mode where the
    /// cadence of heading samples matters.
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Start file logging to the specified path.
    ///
    /// Output is written by a dedicated thread; the returned guard flushes and
    /// joins it when dropped, after which output goes back to the terminal.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        {
            let mut channel = lock_channel();
            if channel.is_some() {
                anyhow::bail!("File logging is already active");
            }
            *channel = Some(tx.clone());
        }

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

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

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Whether output is currently routed to a log file.
    pub fn is_file_logging() -> bool {
        lock_channel().is_some()
    }

    /// Timestamp prefix for the current line, empty unless timestamps are on.
    pub fn get_timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S%.3f"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        lock_channel().take();
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove ANSI color sequences (`ESC [ ... m`) so log files stay plain text.
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

fn lock_channel() -> std::sync::MutexGuard<'static, Option<Sender<LogMessage>>> {
    LOG_CHANNEL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Hand `text` to the file writer. Returns `false` when the writer is gone.
fn send_to_file(tx: &Sender<LogMessage>, text: &str) -> bool {
    tx.send(LogMessage::Formatted(strip_ansi_codes(text))).is_ok()
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    if let Some(tx) = lock_channel().as_ref()
        && send_to_file(tx, text)
    {
        return;
    }
    print!("{text}");
    let _ = std::io::stdout().flush();
}

// # Logging Macros

/// Log a decorated message, typically as part of an existing block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&format!("{prefix}┣ {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(&format!("{prefix}┣ {expr}\n"));
        }
    }};
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&format!("{prefix}┃   {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(&format!("{prefix}┃   {expr}\n"));
        }
    }};
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::common::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {message}\n"));
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(&format!("{prefix}┃\n{prefix}┣ {expr}\n"));
        }
    }};
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::common::logger::write_output(&format!("{prefix}┏ qibla v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::common::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

/// Log a warning message with pipe prefix and yellow-colored text.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
            );
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {expr}\n"),
            );
        }
    }};
}

/// Log an error message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"),
            );
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {expr}\n"),
            );
        }
    }};
}

/// Log an error that terminates the current flow, closing the rail.
#[macro_export]
macro_rules! log_error_exit {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(
                &format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n"),
            );
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(
                &format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {expr}\n"),
            );
        }
    }};
}

/// Log an informational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"),
            );
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {expr}\n"),
            );
        }
    }};
}

/// Log a debug message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n"),
            );
        }
    }};
    ($expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let expr = $expr;
            $crate::common::logger::write_output(
                &format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {expr}\n"),
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "┣[\x1b[33mWARNING\x1b[0m] compass uncalibrated";
        assert_eq!(strip_ansi_codes(colored), "┣[WARNING] compass uncalibrated");
    }

    #[test]
    fn test_strip_ansi_keeps_plain_text() {
        assert_eq!(strip_ansi_codes("┃   61.1° ENE"), "┃   61.1° ENE");
    }

    #[test]
    fn test_send_to_closed_writer_reports_failure() {
        let (tx, rx) = channel();
        assert!(send_to_file(&tx, "┣ before shutdown\n"));
        drop(rx);
        assert!(!send_to_file(&tx, "┗[ERROR] fatal\n"));
    }

    #[test]
    fn test_timestamp_prefix_disabled_by_default() {
        Log::set_timestamps(false);
        assert!(Log::get_timestamp_prefix().is_empty());
    }
}
