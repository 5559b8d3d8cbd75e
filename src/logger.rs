//! A small leveled logger printing tagged lines to stdout, in the style of
//! the teacher's hand-rolled `Log` helper rather than a `tracing`/`log`
//! facade — the harness parses these tags back out of a child process's
//! stdout, so the format is a small, stable contract worth owning directly.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Prints `[level] message` lines at or above a minimum level.
pub struct Logger {
    min_level: Level,
}

impl Logger {
    pub fn new(min_level: Level) -> Self {
        Self { min_level }
    }

    pub fn log(&self, level: Level, message: impl Display) {
        if level < self.min_level {
            return;
        }
        println!("[{}] {}", level.tag(), message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }
    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }
    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }
    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}
