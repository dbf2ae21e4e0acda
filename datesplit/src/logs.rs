//! Run logging.
//!
//! Pipeline progress goes through a global [`Logger`]. It is silent until
//! enabled, so a successful run prints nothing unless verbose output was
//! requested (see [`crate::config::Config::verbose`]).

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for grouped messages
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Rendered line as written to stderr.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes log entries to stderr when enabled.
pub struct Logger {
    enabled: AtomicBool,
}

impl Logger {
    pub fn new() -> Self {
        Self { enabled: AtomicBool::new(false) }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn log(&self, entry: LogEntry) {
        if self.is_enabled() {
            eprintln!("{}", entry.render());
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefixes() {
        assert_eq!(LogEntry::info("reading").render(), "    reading");
        assert!(LogEntry::success("done").render().contains("✓ done"));
        assert!(LogEntry::warning("blank").render().contains("⚠️ blank"));
    }

    #[test]
    fn test_render_indent() {
        let line = LogEntry::warning("cell").with_indent(2).render();
        assert!(line.starts_with("      "));
        assert!(line.ends_with("cell"));
    }

    #[test]
    fn test_logger_toggle() {
        let logger = Logger::new();
        assert!(!logger.is_enabled());
        logger.set_enabled(true);
        assert!(logger.is_enabled());
    }
}
