//! Tree evaluation errors

use crate::config::compile_time::semantic::MAX_CYCLE_PATH_LENGTH;
use crate::logging::{codes, Code};
use crate::utils::bounded_message;

pub type EvalResult<T> = Result<T, EvaluationError>;

/// Every variant aborts the whole evaluation; no partial result is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Production mismatch at {path}: {reason}")]
    ProductionMismatch { path: String, reason: String },

    #[error("Unbound attribute {reference} in rule '{rule}'")]
    UnboundAttribute { reference: String, rule: String },

    #[error("Type mismatch in rule '{rule}': {reason}")]
    TypeMismatch { rule: String, reason: String },

    #[error("Attribute cycle in production '{production}': {}", .cycle_path.join(" -> "))]
    AttributeCycle {
        production: String,
        cycle_path: Vec<String>,
    },

    #[error("Root is missing attribute '{attribute}' of '{symbol}'")]
    MissingRootAttribute { symbol: String, attribute: String },

    #[error("Parse tree exceeds maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("Parse tree exceeds maximum of {limit} nodes")]
    NodeLimitExceeded { limit: usize },

    #[error("Integer overflow in rule '{rule}'")]
    ArithmeticOverflow { rule: String },
}

impl EvaluationError {
    pub fn production_mismatch(path: &str, reason: impl Into<String>) -> Self {
        Self::ProductionMismatch {
            path: path.to_string(),
            reason: bounded_message(reason),
        }
    }

    pub fn unbound(reference: impl Into<String>) -> Self {
        Self::UnboundAttribute {
            reference: reference.into(),
            rule: String::new(),
        }
    }

    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            rule: String::new(),
            reason: bounded_message(reason),
        }
    }

    pub fn overflow() -> Self {
        Self::ArithmeticOverflow {
            rule: String::new(),
        }
    }

    /// Cycle path is truncated to the configured length with a trailing marker
    pub fn cycle(production: &str, mut cycle_path: Vec<String>) -> Self {
        if cycle_path.len() > MAX_CYCLE_PATH_LENGTH {
            let omitted = cycle_path.len() - MAX_CYCLE_PATH_LENGTH;
            cycle_path.truncate(MAX_CYCLE_PATH_LENGTH);
            cycle_path.push(format!("... ({} more)", omitted));
        }
        Self::AttributeCycle {
            production: production.to_string(),
            cycle_path: cycle_path.into_iter().map(bounded_message).collect(),
        }
    }

    pub fn missing_root(symbol: &str, attribute: &str) -> Self {
        Self::MissingRootAttribute {
            symbol: symbol.to_string(),
            attribute: attribute.to_string(),
        }
    }

    /// Attach the text of the rule being evaluated, if not already set
    pub fn with_rule(self, text: &str) -> Self {
        let text = bounded_message(text);
        match self {
            Self::UnboundAttribute { reference, rule } if rule.is_empty() => {
                Self::UnboundAttribute { reference, rule: text }
            }
            Self::TypeMismatch { reason, rule } if rule.is_empty() => {
                Self::TypeMismatch { rule: text, reason }
            }
            Self::ArithmeticOverflow { rule } if rule.is_empty() => {
                Self::ArithmeticOverflow { rule: text }
            }
            other => other,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            EvaluationError::ProductionMismatch { .. } => codes::evaluation::PRODUCTION_MISMATCH,
            EvaluationError::UnboundAttribute { .. } => codes::evaluation::UNBOUND_ATTRIBUTE,
            EvaluationError::TypeMismatch { .. } => codes::evaluation::TYPE_MISMATCH,
            EvaluationError::AttributeCycle { .. } => codes::evaluation::ATTRIBUTE_CYCLE,
            EvaluationError::MissingRootAttribute { .. } => {
                codes::evaluation::MISSING_ROOT_ATTRIBUTE
            }
            EvaluationError::DepthLimitExceeded { .. } => codes::evaluation::DEPTH_LIMIT_EXCEEDED,
            EvaluationError::NodeLimitExceeded { .. } => codes::evaluation::TREE_TOO_LARGE,
            EvaluationError::ArithmeticOverflow { .. } => codes::evaluation::ARITHMETIC_OVERFLOW,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_rule_fills_once() {
        let error = EvaluationError::unbound("Stmt.sql")
            .with_rule("Program.sql := Stmt.sql")
            .with_rule("ignored");

        assert_eq!(
            error,
            EvaluationError::UnboundAttribute {
                reference: "Stmt.sql".to_string(),
                rule: "Program.sql := Stmt.sql".to_string(),
            }
        );
        assert_eq!(error.error_code().as_str(), "E201");
    }

    #[test]
    fn test_cycle_path_truncated() {
        let path: Vec<String> = (0..MAX_CYCLE_PATH_LENGTH + 5).map(|i| format!("r{}", i)).collect();
        let error = EvaluationError::cycle("S -> A", path);

        match &error {
            EvaluationError::AttributeCycle { cycle_path, .. } => {
                assert_eq!(cycle_path.len(), MAX_CYCLE_PATH_LENGTH + 1);
                assert_eq!(cycle_path.last().unwrap(), "... (5 more)");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(error.to_string().starts_with("Attribute cycle in production 'S -> A': r0 -> r1"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            EvaluationError::NodeLimitExceeded { limit: 1 }.error_code().as_str(),
            "E207"
        );
        assert_eq!(
            EvaluationError::missing_root("Program", "ok").error_code().as_str(),
            "E204"
        );
        assert_eq!(EvaluationError::overflow().with_rule("x").to_string(), "Integer overflow in rule 'x'");
    }
}
