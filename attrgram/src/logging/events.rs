//! Log events and the grammar locations they refer to

use super::codes::{self, Code};
use crate::utils::Span;
use std::fmt::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which grammar, production and tree node an event concerns, and the
/// pipeline stage that raised it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSite {
    pub grammar: Option<String>,
    /// Production signature, e.g. `Stmt -> DELETE Table Where`
    pub production: Option<String>,
    /// Child-index path from the root, e.g. `root/0/2`
    pub path: Option<String>,
    pub stage: Option<String>,
}

impl EventSite {
    const KEYS: [&'static str; 4] = ["grammar", "production", "path", "stage"];

    fn field_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "grammar" => Some(&mut self.grammar),
            "production" => Some(&mut self.production),
            "path" => Some(&mut self.path),
            "stage" => Some(&mut self.stage),
            _ => None,
        }
    }

    /// Set fields in display order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Self::KEYS
            .into_iter()
            .zip([&self.grammar, &self.production, &self.path, &self.stage])
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Location inside a rule's source text
    pub span: Option<Span>,
    pub site: EventSite,
    /// Context that is not part of the site, in the order it was attached
    pub details: Vec<(String, String)>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            site: EventSite::default(),
            details: Vec::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, codes::warnings::GENERIC_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info-level event carrying a success code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach one context value. The keys `grammar`, `production`, `path`
    /// and `stage` fill the event's site; any other key becomes a detail,
    /// replacing an earlier detail with the same key.
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        if let Some(field) = self.site.field_mut(key) {
            *field = Some(value.to_string());
        } else if let Some(slot) = self.details.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            self.details.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn with_grammar(mut self, grammar: &str) -> Self {
        self.site.grammar = Some(grammar.to_string());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    /// One line: level, code, message, site, details, then the rule span
    pub fn format(&self) -> String {
        let mut line = format!("[{}] {} - {}", self.level, self.code.as_str(), self.message);

        for (key, value) in self.site.fields() {
            let _ = write!(line, " {}={}", key, value);
        }
        for (key, value) in &self.details {
            let _ = write!(line, " {}={}", key, value);
        }
        if let Some(span) = &self.span {
            let _ = write!(line, " at {}:{}", span.start().line, span.start().column);
        }
        line
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let code = self.code.as_str();
        let timestamp = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": self.level.as_str(),
            "code": code,
            "message": self.message,
            "category": self.category(),
            "severity": codes::get_severity(code).as_str(),
        });

        if !self.site.is_empty() {
            json["site"] = self
                .site
                .fields()
                .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                .collect::<serde_json::Map<_, _>>()
                .into();
        }

        if !self.details.is_empty() {
            json["details"] = self
                .details
                .iter()
                .map(|(key, value)| (key.clone(), serde_json::Value::from(value.as_str())))
                .collect::<serde_json::Map<_, _>>()
                .into();
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_line": span.start().line,
                "start_column": span.start().column,
                "end_line": span.end().line,
                "end_column": span.end().column,
            });
        }

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": codes::is_recoverable(code),
                "requires_halt": codes::requires_halt(code),
                "description": codes::get_description(code),
                "recommended_action": codes::get_action(code),
            });
        }

        serde_json::to_string(&json)
    }
}
