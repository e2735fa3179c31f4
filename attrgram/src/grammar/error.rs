//! Grammar construction errors

use crate::logging::{codes, Code};
use crate::rules::RuleError;
use crate::utils::{bounded_message, Span};
use std::fmt;

pub type GrammarResult<T> = Result<T, GrammarError>;

/// Which structural invariant a malformed grammar violates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarIssue {
    /// Duplicate or conflicting declarations, misplaced rule targets
    Structure,
    UnknownSymbol,
    DuplicateAttribute,
    UndeclaredAttribute,
    InvalidStartSymbol,
    AmbiguousReference,
    IncompleteDefinition,
}

impl GrammarIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarIssue::Structure => "structure",
            GrammarIssue::UnknownSymbol => "unknown symbol",
            GrammarIssue::DuplicateAttribute => "duplicate attribute",
            GrammarIssue::UndeclaredAttribute => "undeclared attribute",
            GrammarIssue::InvalidStartSymbol => "invalid start symbol",
            GrammarIssue::AmbiguousReference => "ambiguous reference",
            GrammarIssue::IncompleteDefinition => "incomplete definition",
        }
    }
}

impl fmt::Display for GrammarIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    #[error("Malformed grammar ({issue}): {reason}")]
    MalformedGrammar { issue: GrammarIssue, reason: String },

    #[error("Unknown occurrence {symbol}[{index}] in production '{production}' ({available} in body)")]
    UnknownOccurrence {
        production: String,
        symbol: String,
        index: u32,
        available: usize,
    },

    #[error("Rule syntax error in '{rule}': {message}")]
    RuleSyntax {
        rule: String,
        message: String,
        span: Option<Span>,
    },

    #[error("Grammar limit exceeded: {what} is {actual} (max {limit})")]
    LimitExceeded {
        what: String,
        limit: usize,
        actual: usize,
    },
}

impl GrammarError {
    pub fn malformed(issue: GrammarIssue, reason: impl Into<String>) -> Self {
        Self::MalformedGrammar {
            issue,
            reason: bounded_message(reason),
        }
    }

    pub fn unknown_occurrence(production: &str, symbol: &str, index: u32, available: usize) -> Self {
        Self::UnknownOccurrence {
            production: production.to_string(),
            symbol: symbol.to_string(),
            index,
            available,
        }
    }

    pub fn rule_syntax(rule: &str, error: &RuleError) -> Self {
        Self::RuleSyntax {
            rule: bounded_message(rule),
            message: error.to_string(),
            span: error.span(),
        }
    }

    pub fn limit_exceeded(what: &str, limit: usize, actual: usize) -> Self {
        Self::LimitExceeded {
            what: what.to_string(),
            limit,
            actual,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            GrammarError::MalformedGrammar { issue, .. } => match issue {
                GrammarIssue::Structure => codes::grammar::MALFORMED_GRAMMAR,
                GrammarIssue::UnknownSymbol => codes::grammar::UNKNOWN_SYMBOL,
                GrammarIssue::DuplicateAttribute => codes::grammar::DUPLICATE_ATTRIBUTE,
                GrammarIssue::UndeclaredAttribute => codes::grammar::UNDECLARED_ATTRIBUTE,
                GrammarIssue::InvalidStartSymbol => codes::grammar::INVALID_START_SYMBOL,
                GrammarIssue::AmbiguousReference => codes::grammar::AMBIGUOUS_REFERENCE,
                GrammarIssue::IncompleteDefinition => codes::grammar::INCOMPLETE_DEFINITION,
            },
            GrammarError::UnknownOccurrence { .. } => codes::grammar::UNKNOWN_OCCURRENCE,
            GrammarError::RuleSyntax { .. } => codes::grammar::RULE_SYNTAX,
            GrammarError::LimitExceeded { .. } => codes::grammar::LIMIT_EXCEEDED,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            GrammarError::RuleSyntax { span, .. } => *span,
            _ => None,
        }
    }

    /// Caret diagnostic for rule syntax errors, plain message otherwise
    pub fn render(&self) -> String {
        match self {
            GrammarError::RuleSyntax {
                rule,
                message,
                span: Some(span),
            } => span.render(rule, message),
            other => format!("error: {}\n", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse_rule;

    #[test]
    fn test_error_codes() {
        let err = GrammarError::malformed(GrammarIssue::UndeclaredAttribute, "no 'size' on ColList");
        assert_eq!(err.error_code(), codes::grammar::UNDECLARED_ATTRIBUTE);
        assert!(!err.requires_halt());

        let err = GrammarError::unknown_occurrence("ColList -> ID", "ColList", 2, 0);
        assert_eq!(err.error_code(), codes::grammar::UNKNOWN_OCCURRENCE);
        assert!(err.to_string().contains("ColList[2]"));
    }

    #[test]
    fn test_rule_syntax_renders_caret() {
        let text = "A.sql := B.sql ||";
        let rule_err = parse_rule(text).unwrap_err();
        let err = GrammarError::rule_syntax(text, &rule_err);

        assert!(err.span().is_some());
        let rendered = err.render();
        assert!(rendered.contains(text));
        assert!(rendered.contains('^'));
    }
}
