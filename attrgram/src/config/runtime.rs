// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarPreferences {
    /// Whether a production missing a synthesized rule for its head is an error
    pub require_complete_definitions: bool,

    /// Whether to log each compiled semantic rule at debug level
    pub log_rule_compilation: bool,
}

impl Default for GrammarPreferences {
    fn default() -> Self {
        Self {
            require_complete_definitions: env::var(env_vars::GRAMMAR_REQUIRE_COMPLETE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_rule_compilation: env::var(env_vars::GRAMMAR_LOG_RULE_COMPILATION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationPreferences {
    /// Whether to log every visited node at debug level
    pub log_node_visits: bool,

    /// Whether result extraction checks the root attributes against the grammar
    pub validate_root_attributes: bool,
}

impl Default for EvaluationPreferences {
    fn default() -> Self {
        Self {
            log_node_visits: env::var(env_vars::EVALUATION_LOG_NODE_VISITS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            validate_root_attributes: env::var(env_vars::EVALUATION_VALIDATE_ROOT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include timing events in logs
    pub log_performance_events: bool,

    /// Whether to attach the active grammar name to log events
    pub include_grammar_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var(env_vars::LOGGING_LOG_PERFORMANCE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_grammar_context: env::var(env_vars::LOGGING_INCLUDE_GRAMMAR_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
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

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and the CLI)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub grammar: GrammarPreferences,
    pub evaluation: EvaluationPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Grammar
    pub const GRAMMAR_REQUIRE_COMPLETE: &str = "AG_GRAMMAR_REQUIRE_COMPLETE";
    pub const GRAMMAR_LOG_RULE_COMPILATION: &str = "AG_GRAMMAR_LOG_RULE_COMPILATION";

    // Evaluation
    pub const EVALUATION_LOG_NODE_VISITS: &str = "AG_EVALUATION_LOG_NODE_VISITS";
    pub const EVALUATION_VALIDATE_ROOT: &str = "AG_EVALUATION_VALIDATE_ROOT";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "AG_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "AG_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "AG_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "AG_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_INCLUDE_GRAMMAR_CONTEXT: &str = "AG_LOGGING_INCLUDE_GRAMMAR_CONTEXT";
}
