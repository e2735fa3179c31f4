//! Shared primitive types used by the rule lexer, parser and diagnostics.

pub mod span;

pub use span::{Position, Span, Spanned};

use crate::config::compile_time::semantic::MAX_ERROR_MESSAGE_LENGTH;

/// Clamp a diagnostic message to the configured maximum length
pub fn bounded_message(message: impl Into<String>) -> String {
    let mut message = message.into();
    if message.len() > MAX_ERROR_MESSAGE_LENGTH {
        let mut cut = MAX_ERROR_MESSAGE_LENGTH.saturating_sub(3);
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
        message.push_str("...");
    }
    message
}
