//! Logging service and the sinks events are written to

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A destination for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Filters events by level before handing them to its logger
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Service built from the runtime preferences. Console output is opt-in
    /// so library callers stay silent unless asked otherwise.
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let mut sinks = MultiLogger::new();
        if config::use_console_logging() {
            sinks.add_logger(Arc::new(StderrLogger::new(min_level, LineFormat::configured())));
        }
        Self::new(Arc::new(sinks), min_level)
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

/// How an event is rendered as a single output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    Text,
    Json,
}

impl LineFormat {
    pub fn configured() -> Self {
        if config::use_structured_logging() {
            LineFormat::Json
        } else {
            LineFormat::Text
        }
    }

    pub fn render(self, event: &LogEvent) -> String {
        match self {
            LineFormat::Text => event.format(),
            LineFormat::Json => event.format_json().unwrap_or_else(|_| event.format()),
        }
    }
}

/// Writes to stderr; stdout is reserved for evaluation output
pub struct StderrLogger {
    min_level: LogLevel,
    format: LineFormat,
}

impl StderrLogger {
    pub fn new(min_level: LogLevel, format: LineFormat) -> Self {
        Self { min_level, format }
    }
}

impl Logger for StderrLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            eprintln!("{}", self.format.render(event));
        }
    }
}

/// Appends one line per event to a file opened once
pub struct FileLogger {
    file: Mutex<File>,
    min_level: LogLevel,
    format: LineFormat,
}

impl FileLogger {
    pub fn new(path: &Path, min_level: LogLevel, format: LineFormat) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            min_level,
            format,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = self.format.render(event);
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // A failed write cannot itself be logged
        let _ = writeln!(file, "{}", line);
    }
}

/// Keeps events in memory so callers can inspect what a run logged
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// A poisoned buffer still holds every event logged before the panic
    fn buffer(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.buffer().clone()
    }

    pub fn errors(&self) -> Vec<LogEvent> {
        self.buffer().iter().filter(|e| e.is_error()).cloned().collect()
    }

    /// Number of events of any level logged with `code`
    pub fn count_code(&self, code: Code) -> usize {
        self.buffer().iter().filter(|e| e.code == code).count()
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.buffer();
        let capacity = config::get_error_buffer_size().max(1);
        if events.len() >= capacity {
            let excess = events.len() + 1 - capacity;
            events.drain(..excess);
        }
        events.push(event.clone());
    }
}

/// Fans each event out to every attached logger
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Sinks chosen by the runtime preferences, plus an optional log file
pub fn create_configured_multi_logger(log_file: Option<&Path>) -> std::io::Result<MultiLogger> {
    let min_level = config::get_min_log_level();
    let format = LineFormat::configured();
    let mut sinks = MultiLogger::new();

    if config::use_console_logging() {
        sinks.add_logger(Arc::new(StderrLogger::new(min_level, format)));
    }
    if let Some(path) = log_file {
        sinks.add_logger(Arc::new(FileLogger::new(path, min_level, format)?));
    }

    Ok(sinks)
}
