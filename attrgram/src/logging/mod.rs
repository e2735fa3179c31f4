//! Global logging module for the attribute grammar engine
//!
//! Provides thread-safe global logging with a per-thread grammar context and
//! a clean macro interface. Every event carries a code from [`codes`].

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{EventSite, LogEvent, LogLevel};
pub use service::{
    FileLogger, LineFormat, Logger, LoggingService, MemoryLogger, MultiLogger, StderrLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static GRAMMAR_CONTEXT: RefCell<Option<String>> = RefCell::new(None);
    static SCOPED_LOGGER: RefCell<Option<Arc<dyn Logger>>> = RefCell::new(None);
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    install(logging_service)
}

/// Initialize with custom service (CLI log files, tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    install(service)
}

fn install(logging_service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    // Validate error code system
    let test_codes = ["ERR001", "E100", "E200", "I030"];
    for &code in &test_codes {
        if codes::get_description(code) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(events::LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// GRAMMAR CONTEXT MANAGEMENT
// ============================================================================

/// Set the grammar name attached to events logged on this thread
pub fn set_grammar_context(name: &str) {
    GRAMMAR_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(name.to_string());
    });
}

/// Clear grammar context for current thread
pub fn clear_grammar_context() {
    GRAMMAR_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with grammar context, restoring the previous context after
pub fn with_grammar_context<F, R>(name: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_grammar_context();
    set_grammar_context(name);
    let result = f();
    match previous {
        Some(prev) => set_grammar_context(&prev),
        None => clear_grammar_context(),
    }
    result
}

/// Get current grammar context (used by macros)
pub fn get_current_grammar_context() -> Option<String> {
    GRAMMAR_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// SCOPED LOGGER
// ============================================================================

/// Send every event logged on this thread to `logger` instead of the global
/// service while `f` runs
pub fn with_logger<F, R>(logger: Arc<dyn Logger>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = SCOPED_LOGGER.with(|slot| slot.borrow_mut().replace(logger));
    let result = f();
    SCOPED_LOGGER.with(|slot| *slot.borrow_mut() = previous);
    result
}

fn attach_context(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if config::include_grammar_context() && event.site.grammar.is_none() {
        if let Some(grammar) = get_current_grammar_context() {
            event = event.with_grammar(&grammar);
        }
    }

    let max_len = config::get_max_log_message_length();
    if event.message.len() > max_len {
        let mut cut = max_len;
        while !event.message.is_char_boundary(cut) {
            cut -= 1;
        }
        event.message.truncate(cut);
    }

    event
}

fn dispatch(event: LogEvent) {
    let scoped = SCOPED_LOGGER.with(|slot| slot.borrow().clone());
    match scoped {
        Some(logger) => logger.log(&event),
        None => {
            if let Some(service) = try_get_global_logger() {
                service.log_event(event);
            }
        }
    }
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);

    if let Some(s) = span {
        event = event.with_span(s);
    }

    dispatch(attach_context(event, context));
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(attach_context(LogEvent::success(code, message), context));
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(attach_context(LogEvent::info(message), context));
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    dispatch(attach_context(event, context));
}

/// Log debug with context (used by log_debug! macro)
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if config::get_min_log_level() >= LogLevel::Debug {
        dispatch(attach_context(LogEvent::debug(message), context));
    }
}
