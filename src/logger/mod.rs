//! Console logging: the request log sink plus a small leveled logger.

use std::{
    fmt::Display,
    io::Write,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

pub mod colors;
pub mod record;
pub mod sink;

use colors::{paint, Color};

/// Execution mode. Only `Development` enables debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    /// Only the exact word `development` (any case) selects `Development`;
    /// unknown values map to `Production`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" => Environment::Development,
            "test" => Environment::Test,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        Environment::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Where the leveled logger writes its lines.
pub trait LogOutput: Send + Sync {
    fn write_line(&self, stream: Stream, line: &str);
}

/// Process stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

impl LogOutput for Console {
    fn write_line(&self, stream: Stream, line: &str) {
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }
}

/// Captures lines in memory instead of printing them.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    lines: Arc<Mutex<Vec<(Stream, String)>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Stream, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl LogOutput for CapturedOutput {
    fn write_line(&self, stream: Stream, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((stream, line.to_string()));
        }
    }
}

/// Severity-tagged console logger.
///
/// Holds no state besides the mode it was built with and its output, so
/// clones are interchangeable.
#[derive(Clone)]
pub struct Logger {
    mode: Environment,
    color: bool,
    output: Arc<dyn LogOutput>,
}

impl Logger {
    pub fn new(mode: Environment, color: bool) -> Self {
        Self::with_output(mode, color, Arc::new(Console))
    }

    pub fn with_output(mode: Environment, color: bool, output: Arc<dyn LogOutput>) -> Self {
        Self {
            mode,
            color,
            output,
        }
    }

    pub fn mode(&self) -> Environment {
        self.mode
    }

    pub fn info(&self, message: impl Display) {
        self.write(Stream::Stdout, "INFO", Color::Cyan, message);
    }

    pub fn error(&self, message: impl Display) {
        self.write(Stream::Stderr, "ERROR", Color::Red, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.write(Stream::Stderr, "WARN", Color::Yellow, message);
    }

    pub fn success(&self, message: impl Display) {
        self.write(Stream::Stdout, "SUCCESS", Color::Green, message);
    }

    pub fn debug(&self, message: impl Display) {
        if self.mode.is_development() {
            self.write(Stream::Stdout, "DEBUG", Color::Magenta, message);
        }
    }

    fn write(&self, stream: Stream, tag: &str, color: Color, message: impl Display) {
        let line = format!("{} {}", paint(format_args!("[{}]", tag), color, self.color), message);
        self.output.write_line(stream, &line);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("mode", &self.mode)
            .field("color", &self.color)
            .finish()
    }
}
