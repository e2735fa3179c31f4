//! Rule text errors

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while lexing or parsing one semantic rule
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid character '{character}' at {span}")]
    InvalidCharacter { character: char, span: Span },

    #[error("Unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("Invalid escape sequence '\\{character}' at {span}")]
    InvalidEscape { character: char, span: Span },

    #[error("Integer literal '{text}' out of range at {span}")]
    IntegerOutOfRange { text: String, span: Span },

    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Rule text too long: {length} bytes (max {limit})")]
    RuleTooLong { length: usize, limit: usize },
}

impl RuleError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            RuleError::RuleTooLong { .. } => codes::grammar::LIMIT_EXCEEDED,
            _ => codes::grammar::RULE_SYNTAX,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            RuleError::InvalidCharacter { span, .. }
            | RuleError::UnterminatedString { span }
            | RuleError::InvalidEscape { span, .. }
            | RuleError::IntegerOutOfRange { span, .. }
            | RuleError::UnexpectedToken { span, .. } => Some(*span),
            RuleError::RuleTooLong { .. } => None,
        }
    }
}
