//! Session-scoped logging.
//!
//! The reference implementation gates every log line on a process-wide
//! `error_level` global set once at entry. We keep the same four levels and
//! the same "only emit if level >= threshold" semantics, but thread the
//! threshold through a value owned by the `Session` instead of a global, so
//! that log level stays call-scoped rather than ambient (see the design
//! notes on avoiding shared mutable state).

/// The four DFU log levels, ordered from least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Error,
    Info,
    Debug,
}

impl LogLevel {
    /// Map a CLI `-l` flag value onto a `LogLevel`.
    ///
    /// 1=SILENT, 2=ERROR, 3=INFO, 4=DEBUG; anything else (including the
    /// absence of the flag) falls back to ERROR, matching the original's
    /// `switch` default case.
    pub fn from_cli_flag(value: Option<i32>) -> Self {
        match value {
            Some(1) => LogLevel::Silent,
            Some(3) => LogLevel::Info,
            Some(4) => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }
}

/// A logging sink bound to one DFU session's threshold.
#[derive(Debug, Clone, Copy)]
pub struct SessionLog {
    level: LogLevel,
}

impl SessionLog {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        self.level >= level
    }

    pub fn error(&self, msg: &str) {
        if self.enabled(LogLevel::Error) {
            log::error!("{msg}");
        }
    }

    pub fn info(&self, msg: &str) {
        if self.enabled(LogLevel::Info) {
            log::info!("{msg}");
        }
    }

    pub fn debug(&self, msg: &str) {
        if self.enabled(LogLevel::Debug) {
            log::debug!("{msg}");
        }
    }

    /// Trace transmitted/received bytes in hex, 16 bytes per line, matching the
    /// original's `dfu_log` wrapping behavior.
    pub fn trace_bytes(&self, direction: &str, bytes: &[u8]) {
        if !self.enabled(LogLevel::Debug) {
            return;
        }
        for (i, chunk) in bytes.chunks(16).enumerate() {
            let hex: Vec<String> = chunk.iter().map(|b| format!("0x{b:02x}")).collect();
            log::debug!("{direction} [{}]: {}", i * 16, hex.join(" "));
        }
    }
}
